// src/diff.rs
//
// Change detection between consecutive snapshots. Comparison is exact
// status text; anything subtler than that belongs in the normalizer.

use crate::snapshot::Snapshot;

/// Previous-status text carried by first-run announcement events.
pub const FIRST_CHECK: &str = "Primeira verificação";

/// Which lines may generate events. Unknown lines default to monitored.
pub trait MonitoringPolicy {
    fn should_monitor(&self, line_name: &str) -> bool {
        let _ = line_name;
        true
    }
}

/// Monitors everything. Default policy and test stand-in.
pub struct MonitorAll;

impl MonitoringPolicy for MonitorAll {}

/// One observed transition for one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub line: String,
    pub previous: String,
    pub current: String,
    /// Set on first-run announcements, where `previous` is a sentinel
    /// rather than an observed status.
    pub first_check: bool,
}

/// Diff a fresh snapshot against the previous one, in snapshot order.
///
/// An empty previous snapshot means this is the first poll ever: every
/// monitored line announces its current status once, so startup is never
/// silent. After that, only observed text changes on monitored lines emit
/// events; a line with no previous record stays quiet until its next
/// change.
pub fn detect(new: &Snapshot, previous: &Snapshot, policy: &dyn MonitoringPolicy) -> Vec<ChangeEvent> {
    if previous.is_empty() {
        return new
            .iter()
            .filter(|record| policy.should_monitor(&record.name))
            .map(|record| ChangeEvent {
                line: record.name.clone(),
                previous: FIRST_CHECK.to_string(),
                current: record.status.as_text().to_string(),
                first_check: true,
            })
            .collect();
    }

    let mut events = Vec::new();
    for record in new.iter() {
        if !policy.should_monitor(&record.name) {
            continue;
        }
        let Some(prev) = previous.get(&record.name) else { continue };
        if prev.status.as_text() != record.status.as_text() {
            events.push(ChangeEvent {
                line: record.name.clone(),
                previous: prev.status.as_text().to_string(),
                current: record.status.as_text().to_string(),
                first_check: false,
            });
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{KNOWN_LINES, LineRegistry};
    use crate::scrape::RawStatusMap;

    struct DenyList(&'static [&'static str]);

    impl MonitoringPolicy for DenyList {
        fn should_monitor(&self, line_name: &str) -> bool {
            !self.0.contains(&line_name)
        }
    }

    fn snapshot_with(entries: &[(&str, &str)]) -> Snapshot {
        let reg = LineRegistry::default();
        let mut raw = RawStatusMap::new();
        for (name, text) in entries {
            raw.insert((*name).to_string(), (*text).to_string());
        }
        Snapshot::build(&reg, &raw, "")
    }

    #[test]
    fn first_run_announces_every_monitored_line() {
        let new = snapshot_with(&[("Linha 15-Prata", "paralisada")]);
        let events = detect(&new, &Snapshot::default(), &MonitorAll);

        assert_eq!(events.len(), 6);
        let lines: Vec<_> = events.iter().map(|e| e.line.as_str()).collect();
        assert_eq!(lines, KNOWN_LINES);
        assert!(events.iter().all(|e| e.first_check && e.previous == FIRST_CHECK));
        assert_eq!(events[5].current, "Paralisada");
        assert_eq!(events[0].current, "Operação Normal");
    }

    #[test]
    fn first_run_respects_the_policy() {
        let new = snapshot_with(&[]);
        let events = detect(&new, &Snapshot::default(), &DenyList(&["Linha 2-Verde"]));
        assert_eq!(events.len(), 5);
        assert!(events.iter().all(|e| e.line != "Linha 2-Verde"));
    }

    #[test]
    fn steady_state_emits_only_real_changes() {
        let previous = snapshot_with(&[]);
        let new = snapshot_with(&[("Linha 3-Vermelha", "velocidade reduzida")]);
        let events = detect(&new, &previous, &MonitorAll);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.line, "Linha 3-Vermelha");
        assert_eq!(event.previous, "Operação Normal");
        assert_eq!(event.current, "Velocidade Reduzida");
        assert!(!event.first_check);
    }

    #[test]
    fn unchanged_snapshots_are_silent() {
        let previous = snapshot_with(&[("Linha 1-Azul", "paralisada")]);
        let new = snapshot_with(&[("Linha 1-Azul", "interrompida")]);
        // Different page wording, same canonical status: no event.
        assert!(detect(&new, &previous, &MonitorAll).is_empty());
    }

    #[test]
    fn unmonitored_changes_are_suppressed() {
        let previous = snapshot_with(&[]);
        let new = snapshot_with(&[("Linha 4-Amarela", "paralisada")]);
        let events = detect(&new, &previous, &DenyList(&["Linha 4-Amarela"]));
        assert!(events.is_empty());
    }

    #[test]
    fn line_missing_from_history_stays_quiet_until_next_change() {
        let previous = snapshot_with(&[]);
        let mut json = serde_json::to_value(&previous).unwrap();
        json.as_object_mut().unwrap().remove("Linha 15-Prata");
        let previous: Snapshot = serde_json::from_value(json).unwrap();

        let new = snapshot_with(&[("Linha 15-Prata", "paralisada")]);
        assert!(detect(&new, &previous, &MonitorAll).is_empty());
    }
}
