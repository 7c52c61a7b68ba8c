// src/scrape/update_time.rs
//
// The page stamps its own refresh time in formats that changed across
// redesigns. Every path converges on "dd/MM/yyyy HH:mm:ss"; when nothing
// matches, the local clock stands in.

use chrono::Local;

use crate::config::consts::TIMESTAMP_FMT;
use crate::core::{html, Document};

/// The page's self-reported refresh time, or the local clock when no known
/// marker is present.
pub fn extract_update_time(doc: &Document) -> String {
    if let Some(text) = first_span_containing(doc, "Atualizado:") {
        if let Some(stamp) = stamp_after(&text, "Atualizado:") {
            return stamp;
        }
    }
    if let Some(text) = first_span_containing(doc, "Atualizado às") {
        if let Some(stamp) = legacy_hour_stamp(&text) {
            return stamp;
        }
    }
    for node in doc.select("div", "hora_status") {
        if let Some(stamp) = legacy_hour_stamp(&node.text()) {
            return stamp;
        }
    }
    Local::now().format(TIMESTAMP_FMT).to_string()
}

fn first_span_containing(doc: &Document, needle: &str) -> Option<String> {
    doc.select("span", "")
        .into_iter()
        .map(|node| node.text())
        .find(|text| html::contains_ci(text, needle))
}

/// "dd/MM/yyyy HH:mm[:ss]" right after the marker; seconds padded in when
/// the page omits them.
fn stamp_after(text: &str, marker: &str) -> Option<String> {
    let at = html::find_ci(text, marker)?;
    let rest = text[at + marker.len()..].trim_start();
    let b = rest.as_bytes();

    let digit = |i: usize| i < b.len() && b[i].is_ascii_digit();
    let lit = |i: usize, c: u8| i < b.len() && b[i] == c;

    let date_ok = digit(0)
        && digit(1)
        && lit(2, b'/')
        && digit(3)
        && digit(4)
        && lit(5, b'/')
        && (6..10).all(digit);
    if !date_ok || !lit(10, b' ') {
        return None;
    }

    let t = 11;
    if !(digit(t) && digit(t + 1) && lit(t + 2, b':') && digit(t + 3) && digit(t + 4)) {
        return None;
    }
    let date = &rest[..10];
    let hm = &rest[t..t + 5];
    if lit(t + 5, b':') && digit(t + 6) && digit(t + 7) {
        return Some(format!("{date} {hm}:{}", &rest[t + 6..t + 8]));
    }
    Some(format!("{date} {hm}:00"))
}

/// Legacy "16h32" form, anywhere in the text, promoted to a full stamp on
/// today's date.
fn legacy_hour_stamp(text: &str) -> Option<String> {
    let b = text.as_bytes();
    for (i, &byte) in b.iter().enumerate() {
        if byte != b'h' {
            continue;
        }
        let mut ds = i;
        while ds > 0 && i - ds < 2 && b[ds - 1].is_ascii_digit() {
            ds -= 1;
        }
        let mut de = i + 1;
        while de < b.len() && de < i + 3 && b[de].is_ascii_digit() {
            de += 1;
        }
        let hours = &text[ds..i];
        let minutes = &text[i + 1..de];
        if hours.is_empty() || minutes.is_empty() {
            continue;
        }
        return Some(format!(
            "{} {:0>2}:{:0>2}:00",
            Local::now().format("%d/%m/%Y"),
            hours,
            minutes
        ));
    }
    None
}
