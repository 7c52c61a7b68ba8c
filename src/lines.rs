// src/lines.rs

use crate::core::html;

/// The six lines the site reports on, in the order every snapshot, event
/// list and status screen uses.
pub const KNOWN_LINES: [&str; 6] = [
    "Linha 1-Azul",
    "Linha 2-Verde",
    "Linha 3-Vermelha",
    "Linha 4-Amarela",
    "Linha 5-Lilás",
    "Linha 15-Prata",
];

/// One known metro line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    label: &'static str,
}

impl Line {
    /// Full label as the site prints it, e.g. "Linha 1-Azul".
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Label without the word "Linha", e.g. "1-Azul". The page drops the
    /// word in compact layouts.
    pub fn short_label(&self) -> &'static str {
        self.label.strip_prefix("Linha ").unwrap_or(self.label)
    }

    /// Numeric part of the label, e.g. "1" or "15". Embedded data blobs key
    /// lines by this.
    pub fn number(&self) -> &'static str {
        let short = self.short_label();
        let digits = short.chars().take_while(char::is_ascii_digit).count();
        &short[..digits]
    }
}

/// Immutable registry of known lines. Built once at startup and passed to
/// everything that needs it; iteration order is the canonical order.
#[derive(Clone, Debug)]
pub struct LineRegistry {
    lines: Vec<Line>,
}

impl Default for LineRegistry {
    fn default() -> Self {
        Self {
            lines: KNOWN_LINES.iter().map(|label| Line { label }).collect(),
        }
    }
}

impl LineRegistry {
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// First registry line whose full or short label occurs in `text`,
    /// case-insensitively.
    pub fn find_in_text(&self, text: &str) -> Option<Line> {
        self.lines
            .iter()
            .find(|line| {
                html::contains_ci(text, line.label()) || html::contains_ci(text, line.short_label())
            })
            .copied()
    }
}
