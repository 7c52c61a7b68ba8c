// src/monitor.rs
//
// Poll orchestration: parse one fetched page, build a snapshot, diff it
// against the previous one and keep the history current. Transport stays
// outside; the monitor only ever sees page text.

use indexmap::IndexMap;

use crate::config::Settings;
use crate::core::Document;
use crate::diff::{self, ChangeEvent};
use crate::lines::LineRegistry;
use crate::scrape::{collect_statuses, extract_update_time};
use crate::snapshot::Snapshot;
use crate::store::HistoryStore;

/// What one poll produced.
pub struct PollOutcome {
    pub snapshot: Snapshot,
    /// The page's own "Atualizado" stamp.
    pub source_updated: String,
    /// Transitions on monitored lines, ready for notification routing.
    pub events: Vec<ChangeEvent>,
}

pub struct Monitor {
    registry: LineRegistry,
    settings: Settings,
    previous: Snapshot,
    store: HistoryStore,
}

impl Monitor {
    pub fn new(settings: Settings) -> Self {
        Self::with_store(settings, HistoryStore::new())
    }

    /// With persistence enabled the previous snapshot is seeded from the
    /// store, so a restart stays quiet about statuses it already reported.
    /// An unreadable history logs and starts empty.
    pub fn with_store(settings: Settings, store: HistoryStore) -> Self {
        let previous = if settings.persist_history {
            match store.load() {
                Ok(snapshot) => {
                    if !snapshot.is_empty() {
                        logd!("histórico carregado com {} registros", snapshot.len());
                    }
                    snapshot
                }
                Err(e) => {
                    loge!("erro ao carregar histórico: {e}");
                    Snapshot::default()
                }
            }
        } else {
            Snapshot::default()
        };

        Self {
            registry: LineRegistry::default(),
            settings,
            previous,
            store,
        }
    }

    pub fn registry(&self) -> &LineRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Status text per line from the last poll, in registry order. Empty
    /// before the first poll.
    pub fn previous_statuses(&self) -> IndexMap<String, String> {
        self.previous
            .iter()
            .map(|record| (record.name.clone(), record.status.as_text().to_string()))
            .collect()
    }

    /// Digest one fetched page. Never fails: however mangled the page is,
    /// the extraction cascade degrades and missing lines read as normal
    /// operation.
    pub fn poll(&mut self, page: &str) -> PollOutcome {
        logd!("consultando status das linhas");

        let doc = Document::parse(page);
        let raw = collect_statuses(page, &doc, &self.registry);
        logd!("status encontrados: {} de {}", raw.len(), self.registry.len());

        let source_updated = extract_update_time(&doc);
        let snapshot = Snapshot::build(&self.registry, &raw, &source_updated);

        let events = diff::detect(&snapshot, &self.previous, &self.settings);
        for event in &events {
            logd!("mudança em {}: {} -> {}", event.line, event.previous, event.current);
        }

        self.previous = snapshot.clone();
        if self.settings.persist_history {
            if let Err(e) = self.store.save(&self.previous) {
                loge!("erro ao salvar histórico: {e}");
            }
        }

        PollOutcome { snapshot, source_updated, events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::KNOWN_LINES;
    use crate::status::Status;

    /// A structured status page with one span per line.
    fn page(statuses: &[(&str, &str)]) -> String {
        let mut spans = String::new();
        for (line, status) in statuses {
            spans.push_str(&format!("<span>{line}: {status}</span>"));
        }
        format!(
            "<html><body><div class=\"situacao_linhas\">{spans}</div>\
             <span>Atualizado: 12/03/2025 14:05:00</span></body></html>"
        )
    }

    fn all_normal() -> Vec<(&'static str, &'static str)> {
        KNOWN_LINES.iter().map(|l| (*l, "Operação Normal")).collect()
    }

    #[test]
    fn first_poll_announces_every_line() {
        let mut monitor = Monitor::new(Settings::default());
        let outcome = monitor.poll(&page(&all_normal()));

        assert_eq!(outcome.snapshot.len(), 6);
        assert_eq!(outcome.source_updated, "12/03/2025 14:05:00");
        assert_eq!(outcome.events.len(), 6);
        assert!(outcome.events.iter().all(|e| e.first_check));
    }

    #[test]
    fn second_poll_reports_only_changes() {
        let mut monitor = Monitor::new(Settings::default());
        monitor.poll(&page(&all_normal()));

        let mut statuses = all_normal();
        statuses[2] = ("Linha 3-Vermelha", "Velocidade Reduzida");
        let outcome = monitor.poll(&page(&statuses));

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.events[0].line, "Linha 3-Vermelha");
        assert_eq!(outcome.events[0].previous, "Operação Normal");
        assert_eq!(outcome.events[0].current, "Velocidade Reduzida");
        assert!(!outcome.events[0].first_check);

        let back_to_normal = monitor.poll(&page(&all_normal()));
        assert_eq!(back_to_normal.events.len(), 1);
        assert_eq!(back_to_normal.events[0].current, "Operação Normal");
    }

    #[test]
    fn unmonitored_lines_never_raise_events() {
        let mut settings = Settings::default();
        settings.monitored.insert("Linha 5-Lilás".into(), false);
        let mut monitor = Monitor::new(settings);
        monitor.poll(&page(&all_normal()));

        let mut statuses = all_normal();
        statuses[4] = ("Linha 5-Lilás", "Paralisada");
        let outcome = monitor.poll(&page(&statuses));

        assert!(outcome.events.is_empty());
        // The snapshot still records the real status.
        assert_eq!(
            outcome.snapshot.get("Linha 5-Lilás").unwrap().status,
            Status::Halted
        );
    }

    #[test]
    fn restart_with_history_stays_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("historico.json");
        let mut settings = Settings::default();
        settings.persist_history = true;

        let mut first = Monitor::with_store(settings.clone(), HistoryStore::at(&path));
        first.poll(&page(&all_normal()));
        assert!(path.exists());

        let mut second = Monitor::with_store(settings, HistoryStore::at(&path));
        let outcome = second.poll(&page(&all_normal()));
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn previous_statuses_track_the_last_poll() {
        let mut monitor = Monitor::new(Settings::default());
        assert!(monitor.previous_statuses().is_empty());

        let mut statuses = all_normal();
        statuses[0] = ("Linha 1-Azul", "Paralisada");
        monitor.poll(&page(&statuses));

        let previous = monitor.previous_statuses();
        assert_eq!(previous.len(), 6);
        assert_eq!(previous["Linha 1-Azul"], "Paralisada");
        assert_eq!(previous["Linha 2-Verde"], "Operação Normal");
    }
}
