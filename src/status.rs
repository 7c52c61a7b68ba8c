// src/status.rs
//
// Closed status vocabulary and the normalizer that maps the page's
// free-text phrasing onto it. Anything the keyword table cannot place is
// carried through as short free text instead of being dropped.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{html, sanitize};

/// Longest free-text status carried verbatim; beyond this the text is
/// truncated with an ellipsis.
pub const MAX_FALLBACK_CHARS: usize = 50;

/// Per-line operating status. The four closed variants compare and render
/// through their canonical Portuguese text; `Other` carries cleaned page
/// text the table could not classify.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Status {
    Normal,
    ReducedSpeed,
    Halted,
    Partial,
    Other(String),
}

/// Priority-ordered synonym table. Order is load-bearing: page blurbs mix
/// keywords ("operação parcial ... trecho paralisado"), and the first
/// matching row wins, so Halted outranks Partial and Normal outranks both.
static KEYWORD_TABLE: &[(Status, &[&str])] = &[
    (
        Status::Normal,
        &[
            "operação normal",
            "operando normalmente",
            "em operação",
            "funcionamento normal",
            "normal",
        ],
    ),
    (
        Status::ReducedSpeed,
        &[
            "velocidade reduzida",
            "reduzida",
            "lenta",
            "redução",
            "mais lento",
            "atraso",
            "lentidão",
            "lento",
        ],
    ),
    (
        Status::Halted,
        &[
            "paralisada",
            "interrompida",
            "paralisação",
            "interrupção",
            "parada",
            "parado",
            "fechada",
            "fechado",
            "não opera",
            "suspensa",
        ],
    ),
    (
        Status::Partial,
        &[
            "operação parcial",
            "parcialmente",
            "parcial",
            "trecho",
            "parte da linha",
        ],
    ),
];

impl Status {
    /// Map a raw status fragment onto the vocabulary. Never fails: unmatched
    /// non-empty text becomes `Other`, empty text means the site had nothing
    /// to say and defaults to normal operation.
    pub fn normalize(free_text: &str) -> Status {
        let lc = free_text.to_lowercase();
        for (status, keywords) in KEYWORD_TABLE {
            if keywords.iter().any(|k| lc.contains(k)) {
                return status.clone();
            }
        }

        let cleaned = sanitize::clean_status_text(free_text);
        if cleaned.is_empty() {
            return Status::Normal;
        }
        if cleaned.chars().count() <= MAX_FALLBACK_CHARS {
            return Status::Other(cleaned);
        }
        if let Some(phrase) = operation_phrase(&cleaned) {
            return Status::Other(sanitize::truncate_with_ellipsis(&phrase, MAX_FALLBACK_CHARS));
        }
        Status::Other(sanitize::truncate_with_ellipsis(&cleaned, MAX_FALLBACK_CHARS))
    }

    /// Canonical (or carried-through) display text. Equality of statuses is
    /// equality of this text.
    pub fn as_text(&self) -> &str {
        match self {
            Status::Normal => "Operação Normal",
            Status::ReducedSpeed => "Velocidade Reduzida",
            Status::Halted => "Paralisada",
            Status::Partial => "Operação Parcial",
            Status::Other(text) => text,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

impl From<Status> for String {
    fn from(status: Status) -> String {
        match status {
            Status::Other(text) => text,
            s => s.as_text().to_string(),
        }
    }
}

/// Strict text-to-variant mapping for deserialization. Exact canonical text
/// only; everything else round-trips as `Other`. Deliberately not the
/// keyword engine: persisted history must come back byte-identical.
impl From<String> for Status {
    fn from(text: String) -> Status {
        match text.as_str() {
            "Operação Normal" => Status::Normal,
            "Velocidade Reduzida" => Status::ReducedSpeed,
            "Paralisada" => Status::Halted,
            "Operação Parcial" => Status::Partial,
            _ => Status::Other(text),
        }
    }
}

/// Pull a short "operation …" / "em …" / "com …" / "status …" clause out of
/// an overlong blurb: the starter plus one word, then at most 30 further
/// chars, cut at the first period.
fn operation_phrase(cleaned: &str) -> Option<String> {
    let lc = html::fold_ci(cleaned);
    let mut start: Option<usize> = None;
    for pat in ["opera", "em ", "com ", "status "] {
        if let Some(i) = lc.find(pat) {
            let at_word_start = i == 0 || lc.as_bytes()[i - 1] == b' ';
            if at_word_start {
                start = Some(start.map_or(i, |best| best.min(i)));
            }
        }
    }

    let rest = &cleaned[start?..];
    let mut out = String::new();
    let mut spaces = 0usize;
    let mut tail = 0usize;
    for ch in rest.chars() {
        if ch == '.' {
            break;
        }
        if spaces >= 2 {
            tail += 1;
            if tail > 30 {
                break;
            }
        }
        if ch == ' ' {
            spaces += 1;
        }
        out.push(ch);
    }
    let out = out.trim().to_string();
    if out.is_empty() { None } else { Some(out) }
}
