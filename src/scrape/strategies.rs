// src/scrape/strategies.rs
//
// The five extraction passes, in the order the driver runs them. Each one
// targets a markup shape the page has used at some point; all of them skip
// lines already resolved by an earlier pass.

use serde_json::Value;

use super::scrape::{could_be_status, status_after_label, RawStatusMap};
use crate::core::{html, Document};
use crate::lines::LineRegistry;

/// Pass 1: spans inside the `situacao_linhas` container, one per line.
/// This is the page's stable layout; on a good day nothing else runs.
pub fn structured_nodes(doc: &Document, registry: &LineRegistry, found: &mut RawStatusMap) {
    for node in doc.select("div", "situacao_linhas") {
        for text in html::tag_texts(node.inner_html(), "span") {
            if !could_be_status(&text, registry) {
                continue;
            }
            let Some(line) = registry.find_in_text(&text) else { continue };
            let status = status_after_label(&text, &line);
            found.entry(line.label().to_string()).or_insert(status);
        }
    }
}

/// Pass 2: selector shapes seen on page redesigns. Bails out as soon as the
/// registry is fully covered.
pub fn alternate_selectors(doc: &Document, registry: &LineRegistry, found: &mut RawStatusMap) {
    const SELECTORS: [(&str, &str); 5] = [
        ("div", "status_linha"),
        ("div", "linha-metro"),
        ("span", "status"),
        ("p", "status"),
        ("div", "linha"),
    ];
    for (tag, class) in SELECTORS {
        for node in doc.select(tag, class) {
            if found.len() >= registry.len() {
                return;
            }
            let text = node.text();
            if !could_be_status(&text, registry) {
                continue;
            }
            let Some(line) = registry.find_in_text(&text) else { continue };
            let status = status_after_label(&text, &line);
            found.entry(line.label().to_string()).or_insert(status);
        }
    }
}

/// Pass 3: per-line text patterns over the raw HTML, for when the structure
/// is gone but the text survives. First matching pattern wins per line.
pub fn text_patterns(raw: &str, registry: &LineRegistry, found: &mut RawStatusMap) {
    for line in registry.lines() {
        if found.contains_key(line.label()) {
            continue;
        }
        let status = label_colon_text(raw, line.label())
            .or_else(|| label_colon_text(raw, line.short_label()))
            .or_else(|| label_status_keyword_text(raw, line.label()))
            .or_else(|| label_tag_adjacent_text(raw, line.label()));
        if let Some(status) = status {
            found.insert(line.label().to_string(), status);
        }
    }
}

/// Pass 4: inline `linhasStatus = {...}` data blob, keyed by line number
/// with a `status` field per entry.
pub fn embedded_json(raw: &str, registry: &LineRegistry, found: &mut RawStatusMap) {
    let Some(blob) = json_blob(raw, "linhasStatus") else { return };
    let Ok(value) = serde_json::from_str::<Value>(blob) else { return };
    for line in registry.lines() {
        if found.contains_key(line.label()) {
            continue;
        }
        let status = value
            .get(line.number())
            .and_then(|entry| entry.get("status"))
            .and_then(Value::as_str);
        if let Some(status) = status {
            if !status.is_empty() {
                found.insert(line.label().to_string(), status.to_string());
            }
        }
    }
}

/// Pass 5, last resort: split the page into bare text fragments and take
/// the first fragment naming each missing line, whatever it says.
pub fn raw_text(raw: &str, registry: &LineRegistry, found: &mut RawStatusMap) {
    let fragments = html::split_text_fragments(raw);
    for line in registry.lines() {
        if found.contains_key(line.label()) {
            continue;
        }
        for fragment in &fragments {
            if html::contains_ci(fragment, line.label())
                || html::contains_ci(fragment, line.short_label())
            {
                found.insert(line.label().to_string(), status_after_label(fragment, line));
                break;
            }
        }
    }
}

/* ---------- text pattern scanners ---------- */

// "Label: status text until the next tag".
fn label_colon_text(raw: &str, label: &str) -> Option<String> {
    let mut from = 0;
    while let Some(at) = html::find_ci(&raw[from..], label).map(|i| from + i) {
        let after = at + label.len();
        from = after;
        if let Some(rest) = raw[after..].strip_prefix(':') {
            let run = html::text_run(rest, 0);
            if !run.is_empty() {
                return Some(run.to_string());
            }
        }
    }
    None
}

// Label followed by the word "status" within the same text run; the status
// is whatever follows the word.
fn label_status_keyword_text(raw: &str, label: &str) -> Option<String> {
    let mut from = 0;
    while let Some(at) = html::find_ci(&raw[from..], label).map(|i| from + i) {
        let after = at + label.len();
        from = after;
        let run = html::text_run(raw, after);
        if let Some(k) = html::find_ci(run, "status") {
            let status = run[k + "status".len()..].trim();
            if !status.is_empty() {
                return Some(status.to_string());
            }
        }
    }
    None
}

// "<tag>Label…</tag>status": the label opens its own text run and the next
// run is the status.
fn label_tag_adjacent_text(raw: &str, label: &str) -> Option<String> {
    let mut from = 0;
    while let Some(at) = html::find_ci(&raw[from..], label).map(|i| from + i) {
        from = at + label.len();
        if at == 0 || raw.as_bytes()[at - 1] != b'>' {
            continue;
        }
        let run_end = raw[at..].find('<').map_or(raw.len(), |i| at + i);
        let Some(tag_close) = raw[run_end..].find('>').map(|i| run_end + i) else {
            return None;
        };
        let status = html::text_run(raw, tag_close + 1);
        if !status.is_empty() {
            return Some(status.to_string());
        }
    }
    None
}

// Brace-balanced object literal following `name =` in page script. Brace
// and quote tracking only; the payload itself must be strict JSON.
fn json_blob<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    let at = raw.find(name)?;
    let rest = &raw[at + name.len()..];
    let eq = rest.find('=')?;
    if !rest[..eq].trim().is_empty() {
        return None;
    }
    let rest = rest[eq + 1..].trim_start();
    if !rest.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_str = false;
    let mut escape = false;
    for (i, ch) in rest.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if in_str => escape = true,
            '"' => in_str = !in_str,
            '{' if !in_str => depth += 1,
            '}' if !in_str => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
