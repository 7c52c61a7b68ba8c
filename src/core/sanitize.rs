// src/core/sanitize.rs

/// Entities the status page actually emits: layout padding plus the
/// Portuguese accented letters in line names and status phrases.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&aacute;", "á"),
    ("&agrave;", "à"),
    ("&atilde;", "ã"),
    ("&ccedil;", "ç"),
    ("&eacute;", "é"),
    ("&ecirc;", "ê"),
    ("&iacute;", "í"),
    ("&oacute;", "ó"),
    ("&ocirc;", "ô"),
    ("&otilde;", "õ"),
    ("&uacute;", "ú"),
];

pub fn normalize_entities(s: &str) -> String {
    let mut out = s.to_string();
    for (entity, plain) in ENTITIES {
        if out.contains(entity) {
            out = out.replace(entity, plain);
        }
    }
    out
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Status fragments keep "Linha X: status" colons and stray padding after
/// the label is removed. Drop the colons, collapse the rest.
pub fn clean_status_text(s: &str) -> String {
    normalize_ws(&s.replace(':', ""))
}

/// Cap free-text fallback statuses. Counts chars, not bytes, so accented
/// text never splits mid-character.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
