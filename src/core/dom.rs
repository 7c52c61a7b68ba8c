// src/core/dom.rs
//
// Minimal element index over raw HTML, built in one pass. Stands in for a
// real DOM: extraction only ever needs "elements of tag T whose class
// contains S" plus their inner text, and the page is too unstable to
// reward anything stricter. Nested same-tag elements truncate at the first
// matching close tag; the redundant extraction passes absorb what this
// scanner misses.

use super::{html, sanitize};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

struct Element {
    tag: String,
    class: String,
    inner: (usize, usize),
}

/// Pre-scanned document handle. Borrows the raw page text.
pub struct Document<'a> {
    raw: &'a str,
    elements: Vec<Element>,
}

/// One selected element.
#[derive(Clone, Copy)]
pub struct Node<'d> {
    inner: &'d str,
}

impl<'d> Node<'d> {
    /// Raw inner HTML of the element.
    pub fn inner_html(&self) -> &'d str {
        self.inner
    }

    /// Inner text: entities decoded, markup stripped, whitespace collapsed.
    pub fn text(&self) -> String {
        html::strip_tags(sanitize::normalize_entities(self.inner))
    }
}

impl<'a> Document<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let lower = html::fold_ci(raw);
        let mut elements = Vec::new();
        let mut i = 0usize;

        while let Some(rel) = raw.get(i..).and_then(|r| r.find('<')) {
            let start = i + rel;
            let Some(gt_rel) = raw[start..].find('>') else { break };
            let open_end = start + gt_rel + 1;
            let tag_body = &raw[start + 1..open_end - 1];
            i = open_end;

            // Close tags, comments, doctype, processing instructions.
            if tag_body.starts_with(['/', '!', '?']) {
                continue;
            }

            let tag: String = tag_body
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();
            if tag.is_empty() {
                continue;
            }
            if tag_body.ends_with('/') || VOID_TAGS.contains(&tag.as_str()) {
                continue;
            }

            let close_pat = format!("</{tag}");
            if let Some(close_rel) = lower[open_end..].find(&close_pat) {
                elements.push(Element {
                    class: attr_value(tag_body, "class").unwrap_or_default().to_lowercase(),
                    tag,
                    inner: (open_end, open_end + close_rel),
                });
            }
        }

        Self { raw, elements }
    }

    /// Elements with the given tag whose class attribute contains
    /// `class_contains` (empty string matches every element of the tag).
    /// Document order.
    pub fn select(&self, tag: &str, class_contains: &str) -> Vec<Node<'_>> {
        let tag = tag.to_ascii_lowercase();
        let class = class_contains.to_lowercase();
        self.elements
            .iter()
            .filter(|el| el.tag == tag && (class.is_empty() || el.class.contains(&class)))
            .map(|el| Node { inner: &self.raw[el.inner.0..el.inner.1] })
            .collect()
    }
}

/// Value of `name="…"` (or single-quoted / bare) inside an open-tag body.
fn attr_value(tag_body: &str, name: &str) -> Option<String> {
    let at = html::find_ci(tag_body, name)?;
    let rest = tag_body[at + name.len()..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();

    let mut chars = rest.chars();
    match chars.next()? {
        q @ ('"' | '\'') => {
            let body = &rest[1..];
            body.find(q).map(|end| body[..end].to_string())
        }
        _ => Some(
            rest.split(|c: char| c.is_whitespace() || c == '/')
                .next()
                .unwrap_or("")
                .to_string(),
        ),
    }
}
