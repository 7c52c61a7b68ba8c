// src/config/settings.rs
//
// User configuration, read from config.json in the working directory.
// Anything missing or malformed falls back to defaults so the watcher
// always starts.

use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::consts::{CONFIG_FILE, DEFAULT_INTERVAL_SECS};
use crate::core::html;
use crate::diff::MonitoringPolicy;
use crate::lines::KNOWN_LINES;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds between polls.
    pub interval_secs: u64,
    /// Notify on changes only. When false, every poll reports the full
    /// status list.
    pub notify_only_changes: bool,
    pub debug: bool,
    /// Keep the latest snapshot on disk so a restart diffs against it
    /// instead of re-announcing everything.
    pub persist_history: bool,
    /// Per-line monitoring switches, keyed by full line label. Unlisted
    /// lines are monitored.
    pub monitored: IndexMap<String, bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            notify_only_changes: true,
            debug: false,
            persist_history: false,
            monitored: KNOWN_LINES.iter().map(|label| ((*label).to_string(), true)).collect(),
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                loge!("config inválida em {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(Path::new(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}

impl MonitoringPolicy for Settings {
    /// Switch lookup by short label, so "Linha 2-Verde" and a bare
    /// "2-Verde" mention resolve to the same switch. Unlisted lines are
    /// monitored; an empty name never is.
    fn should_monitor(&self, line_name: &str) -> bool {
        if line_name.trim().is_empty() {
            return false;
        }
        self.monitored
            .iter()
            .find(|(label, _)| {
                let short = label.strip_prefix("Linha ").unwrap_or(label);
                html::contains_ci(line_name, short)
            })
            .map_or(true, |(_, enabled)| *enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_monitor_all_lines_every_ten_seconds() {
        let settings = Settings::default();
        assert_eq!(settings.interval_secs, 10);
        assert!(settings.notify_only_changes);
        assert!(!settings.debug);
        assert!(!settings.persist_history);
        assert_eq!(settings.monitored.len(), 6);
        assert!(settings.monitored.values().all(|&on| on));
    }

    #[test]
    fn partial_config_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"interval_secs": 30, "monitored": {"Linha 4-Amarela": false}}"#)
            .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.interval_secs, 30);
        assert!(settings.notify_only_changes);
        assert!(!settings.should_monitor("Linha 4-Amarela"));
        assert!(settings.should_monitor("Linha 1-Azul"));
    }

    #[test]
    fn malformed_config_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.interval_secs, 10);
    }

    #[test]
    fn missing_file_degrades_to_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/config.json"));
        assert_eq!(settings.interval_secs, 10);
    }

    #[test]
    fn monitoring_matches_by_short_label() {
        let mut settings = Settings::default();
        settings.monitored.insert("Linha 2-Verde".into(), false);

        assert!(!settings.should_monitor("Linha 2-Verde"));
        assert!(!settings.should_monitor("2-Verde com avisos"));
        assert!(settings.should_monitor("Linha 7-Rubi"));
        assert!(!settings.should_monitor(""));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut settings = Settings::default();
        settings.interval_secs = 45;
        settings.persist_history = true;
        settings.save_to(&path).unwrap();

        let back = Settings::load_from(&path);
        assert_eq!(back.interval_secs, 45);
        assert!(back.persist_history);
    }
}
