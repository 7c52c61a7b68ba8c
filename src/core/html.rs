// src/core/html.rs
//
// Raw-text HTML scanning. The status page reshuffles its markup often, so
// nothing here assumes well-formed structure; every helper is best-effort
// over the raw string.

/// Case fold whose output stays byte-aligned with its input: a char is
/// lowered only when its lowercase form is a single char of the same UTF-8
/// width. The few that aren't ('İ' grows a combining dot, 'ẞ' shrinks)
/// pass through unchanged, so an index found in the folded string always
/// lands on a char boundary of the original.
pub fn fold_ci(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                return c.to_ascii_lowercase();
            }
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
                _ => c,
            }
        })
        .collect()
}

/// Case-insensitive substring find. Returns a byte index into `s`, safe
/// to slice `s` with.
pub fn find_ci(s: &str, needle: &str) -> Option<usize> {
    fold_ci(s).find(&fold_ci(needle))
}

pub fn contains_ci(s: &str, needle: &str) -> bool {
    find_ci(s, needle).is_some()
}

/// Find the next `<open …> … <close>` block at or after `from`.
/// Returns (start, end) byte offsets spanning the whole block.
pub fn next_tag_block_ci(s: &str, open: &str, close: &str, from: usize) -> Option<(usize, usize)> {
    let lc = fold_ci(s);
    let ol = fold_ci(open);
    let cl = fold_ci(close);
    let start = lc.get(from..)?.find(&ol)? + from;
    let open_end = s[start..].find('>')? + start + 1;
    let end_rel = lc[open_end..].find(&cl)?;
    let end = open_end + end_rel + close.len();
    Some((start, end))
}

/// Inner content of a `<tag …>…</tag>` block: everything after the first '>'
/// and before the last '<'.
pub fn inner_after_open_tag(block: &str) -> String {
    if let Some(oe) = block.find('>') {
        if let Some(cs) = block.rfind('<') {
            if cs > oe {
                return block[oe + 1..cs].to_string();
            }
        }
    }
    String::new()
}

/// Drop markup, keep text, collapse whitespace.
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    super::sanitize::normalize_ws(&out)
}

/// Clean inner texts of every `<tag …>…</tag>` occurrence in `fragment`,
/// in document order.
pub fn tag_texts(fragment: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some((s, e)) = next_tag_block_ci(fragment, &open, &close, pos) {
        let inner = inner_after_open_tag(&fragment[s..e]);
        out.push(strip_tags(super::sanitize::normalize_entities(&inner)));
        pos = e;
    }
    out
}

/// Split raw HTML on markup and line boundaries into candidate text
/// fragments, skipping empty ones. Last-resort input for the fallback
/// extraction pass.
pub fn split_text_fragments(raw: &str) -> Vec<&str> {
    raw.split(['<', '>', '\n', '\r'])
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect()
}

/// The unbroken text run starting at `from`: everything up to the next '<'
/// (or the end of input), trimmed.
pub fn text_run(s: &str, from: usize) -> &str {
    let rest = &s[from..];
    match rest.find('<') {
        Some(i) => rest[..i].trim(),
        None => rest.trim(),
    }
}
