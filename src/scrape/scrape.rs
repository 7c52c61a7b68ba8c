// src/scrape/scrape.rs

use indexmap::IndexMap;

use crate::core::{html, sanitize, Document};
use crate::lines::{Line, LineRegistry};

use super::strategies;

/// Raw per-line status text as it came off the page, keyed by full line
/// label. Values are free text; normalization happens when the snapshot is
/// built.
pub type RawStatusMap = IndexMap<String, String>;

/// Words that mark a fragment as status-bearing even when no line label is
/// present.
const STATUS_KEYWORDS: [&str; 5] = ["operação", "normal", "velocidade", "reduzida", "paralisada"];

/// Run the extraction cascade over one fetched page. Strategies run in
/// order, later ones only consider lines the earlier ones missed, and no
/// strategy overwrites an existing entry. A line absent from the result was
/// not found anywhere on the page.
pub fn collect_statuses(raw: &str, doc: &Document, registry: &LineRegistry) -> RawStatusMap {
    let mut found = RawStatusMap::new();

    strategies::structured_nodes(doc, registry, &mut found);
    if found.len() < registry.len() {
        strategies::alternate_selectors(doc, registry, &mut found);
    }
    if found.len() < registry.len() {
        strategies::text_patterns(raw, registry, &mut found);
    }
    if found.len() < registry.len() {
        strategies::embedded_json(raw, registry, &mut found);
    }
    if found.len() < registry.len() {
        strategies::raw_text(raw, registry, &mut found);
    }
    found
}

/// Cheap gate before the heavier per-fragment work: the text names a known
/// line or uses one of the status words.
pub fn could_be_status(text: &str, registry: &LineRegistry) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    registry.find_in_text(text).is_some()
        || STATUS_KEYWORDS.iter().any(|kw| html::contains_ci(text, kw))
}

/// Drop the line's own label and stray colons from a fragment, leaving just
/// the status text. Empty output means the fragment was only the label.
pub fn status_after_label(text: &str, line: &Line) -> String {
    let mut out = text.to_string();
    for label in [line.label(), line.short_label()] {
        if let Some(at) = html::find_ci(&out, label) {
            out.replace_range(at..at + label.len(), "");
            break;
        }
    }
    sanitize::clean_status_text(&out)
}
