// src/snapshot.rs

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::consts::TIMESTAMP_FMT;
use crate::lines::LineRegistry;
use crate::scrape::RawStatusMap;
use crate::status::Status;

/// One line's observed state at a poll.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineRecord {
    pub name: String,
    pub status: Status,
    /// Wall-clock query instant. Never persisted; rebuilt from
    /// `checked_at_str` on load.
    #[serde(skip, default = "Local::now")]
    pub checked_at: DateTime<Local>,
    pub checked_at_str: String,
    /// The page's own "Atualizado" stamp at query time.
    pub source_updated: String,
}

/// The full per-line picture from one poll, keyed by line name in registry
/// order. An empty snapshot means "never polled".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: IndexMap<String, LineRecord>,
}

impl Snapshot {
    /// Assemble a snapshot from one cascade result. Every registry line gets
    /// an entry: found text is normalized, lines the page never mentioned
    /// are assumed to be operating normally.
    pub fn build(registry: &LineRegistry, raw: &RawStatusMap, source_updated: &str) -> Self {
        let now = Local::now();
        let checked_at_str = now.format(TIMESTAMP_FMT).to_string();
        let records = registry
            .lines()
            .iter()
            .map(|line| {
                let status = raw
                    .get(line.label())
                    .map_or(Status::Normal, |text| Status::normalize(text));
                let record = LineRecord {
                    name: line.label().to_string(),
                    status,
                    checked_at: now,
                    checked_at_str: checked_at_str.clone(),
                    source_updated: source_updated.to_string(),
                };
                (line.label().to_string(), record)
            })
            .collect();
        Self { records }
    }

    pub fn get(&self, name: &str) -> Option<&LineRecord> {
        self.records.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LineRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Restore the in-memory query instants after a load.
    pub fn rehydrate_checked_at(&mut self) {
        for record in self.records.values_mut() {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&record.checked_at_str, TIMESTAMP_FMT) {
                if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                    record.checked_at = local;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::KNOWN_LINES;

    #[test]
    fn build_covers_every_line_in_registry_order() {
        let reg = LineRegistry::default();
        let mut raw = RawStatusMap::new();
        raw.insert("Linha 1-Azul".into(), "paralisada por falha".into());

        let snap = Snapshot::build(&reg, &raw, "12/03/2025 14:05:00");
        assert_eq!(snap.len(), 6);
        let names: Vec<_> = snap.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, KNOWN_LINES);

        assert_eq!(snap.get("Linha 1-Azul").unwrap().status, Status::Halted);
        for name in &KNOWN_LINES[1..] {
            assert_eq!(snap.get(name).unwrap().status, Status::Normal);
        }
        let record = snap.get("Linha 4-Amarela").unwrap();
        assert_eq!(record.source_updated, "12/03/2025 14:05:00");
        assert!(NaiveDateTime::parse_from_str(&record.checked_at_str, TIMESTAMP_FMT).is_ok());
    }

    #[test]
    fn query_instant_stays_out_of_the_json() {
        let reg = LineRegistry::default();
        let snap = Snapshot::build(&reg, &RawStatusMap::new(), "");
        let json = serde_json::to_string_pretty(&snap).unwrap();
        assert!(json.contains("\"checked_at_str\""));
        assert!(!json.contains("\"checked_at\":"));
    }

    #[test]
    fn rehydrate_rebuilds_instants_from_text() {
        let reg = LineRegistry::default();
        let snap = Snapshot::build(&reg, &RawStatusMap::new(), "");
        let json = serde_json::to_string(&snap).unwrap();

        let mut back: Snapshot = serde_json::from_str(&json).unwrap();
        back.rehydrate_checked_at();
        let record = back.get("Linha 1-Azul").unwrap();
        assert_eq!(
            record.checked_at.format(TIMESTAMP_FMT).to_string(),
            record.checked_at_str
        );
    }
}
