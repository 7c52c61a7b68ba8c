// src/notify.rs
//
// Notification routing. Events arrive already filtered to monitored
// lines; this module only decides how many notifications they become and
// what the text says.

use crate::config::Settings;
use crate::core::html;
use crate::diff::ChangeEvent;

/// Notification sink. Implement this in the frontend.
pub trait Notify {
    fn notify(&mut self, title: &str, message: &str);
}

/// A no-op sink you can pass when you don't care.
pub struct NullNotify;
impl Notify for NullNotify {
    fn notify(&mut self, _title: &str, _message: &str) {}
}

pub struct NotificationRouter<'a> {
    settings: &'a Settings,
}

impl<'a> NotificationRouter<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Turn one poll's events into notifications.
    ///
    /// The first poll always notifies, whatever the settings say: either
    /// the list of lines with problems or an explicit all-clear. After
    /// that, `notify_only_changes` picks between one notification per
    /// transition and a single aggregate per eventful poll.
    pub fn route(&self, events: &[ChangeEvent], sink: &mut dyn Notify) {
        if events.is_empty() {
            return;
        }

        if events[0].first_check {
            announce("Status Inicial do Metrô", events, sink);
        } else if self.settings.notify_only_changes {
            for event in events {
                let message =
                    format!("{}: {}\n(Era: {})", event.line, event.current, event.previous);
                send(sink, "Alteração no Status do Metrô", &message);
            }
        } else {
            announce("Status do Metrô", events, sink);
        }
    }
}

/// One aggregate notification: lines not operating normally, or an
/// all-clear when there are none.
fn announce(title: &str, events: &[ChangeEvent], sink: &mut dyn Notify) {
    let problems: Vec<&ChangeEvent> = events
        .iter()
        .filter(|event| !html::contains_ci(&event.current, "normal"))
        .collect();

    let message = if problems.is_empty() {
        "Todas as linhas monitoradas operando normalmente.".to_string()
    } else {
        let mut message = String::from("Status atual:");
        for event in &problems {
            message.push_str(&format!("\n{}: {}", event.line, event.current));
        }
        message
    };
    send(sink, title, &message);
}

fn send(sink: &mut dyn Notify, title: &str, message: &str) {
    logd!("notificação {title}: {message}");
    sink.notify(title, message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::FIRST_CHECK;

    #[derive(Default)]
    struct Recorder {
        sent: Vec<(String, String)>,
    }

    impl Notify for Recorder {
        fn notify(&mut self, title: &str, message: &str) {
            self.sent.push((title.to_string(), message.to_string()));
        }
    }

    fn first_check(line: &str, current: &str) -> ChangeEvent {
        ChangeEvent {
            line: line.to_string(),
            previous: FIRST_CHECK.to_string(),
            current: current.to_string(),
            first_check: true,
        }
    }

    fn change(line: &str, previous: &str, current: &str) -> ChangeEvent {
        ChangeEvent {
            line: line.to_string(),
            previous: previous.to_string(),
            current: current.to_string(),
            first_check: false,
        }
    }

    #[test]
    fn no_events_means_no_notifications() {
        let settings = Settings::default();
        let mut sink = Recorder::default();
        NotificationRouter::new(&settings).route(&[], &mut sink);
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn first_poll_all_clear_is_announced() {
        let settings = Settings::default();
        let events = vec![
            first_check("Linha 1-Azul", "Operação Normal"),
            first_check("Linha 2-Verde", "Operação Normal"),
        ];
        let mut sink = Recorder::default();
        NotificationRouter::new(&settings).route(&events, &mut sink);

        assert_eq!(sink.sent.len(), 1);
        assert_eq!(sink.sent[0].0, "Status Inicial do Metrô");
        assert_eq!(sink.sent[0].1, "Todas as linhas monitoradas operando normalmente.");
    }

    #[test]
    fn first_poll_lists_only_problem_lines() {
        let settings = Settings::default();
        let events = vec![
            first_check("Linha 1-Azul", "Operação Normal"),
            first_check("Linha 2-Verde", "Paralisada"),
            first_check("Linha 3-Vermelha", "Velocidade Reduzida"),
        ];
        let mut sink = Recorder::default();
        NotificationRouter::new(&settings).route(&events, &mut sink);

        assert_eq!(sink.sent.len(), 1);
        assert_eq!(sink.sent[0].0, "Status Inicial do Metrô");
        assert_eq!(
            sink.sent[0].1,
            "Status atual:\nLinha 2-Verde: Paralisada\nLinha 3-Vermelha: Velocidade Reduzida"
        );
    }

    #[test]
    fn changes_notify_one_per_line() {
        let settings = Settings::default();
        let events = vec![
            change("Linha 4-Amarela", "Operação Normal", "Paralisada"),
            change("Linha 5-Lilás", "Velocidade Reduzida", "Operação Normal"),
        ];
        let mut sink = Recorder::default();
        NotificationRouter::new(&settings).route(&events, &mut sink);

        assert_eq!(sink.sent.len(), 2);
        assert_eq!(sink.sent[0].0, "Alteração no Status do Metrô");
        assert_eq!(sink.sent[0].1, "Linha 4-Amarela: Paralisada\n(Era: Operação Normal)");
        assert_eq!(sink.sent[1].1, "Linha 5-Lilás: Operação Normal\n(Era: Velocidade Reduzida)");
    }

    #[test]
    fn aggregate_mode_sends_one_summary() {
        let mut settings = Settings::default();
        settings.notify_only_changes = false;
        let events = vec![
            change("Linha 1-Azul", "Operação Normal", "Paralisada"),
            change("Linha 15-Prata", "Paralisada", "Operação Normal"),
        ];
        let mut sink = Recorder::default();
        NotificationRouter::new(&settings).route(&events, &mut sink);

        assert_eq!(sink.sent.len(), 1);
        assert_eq!(sink.sent[0].0, "Status do Metrô");
        assert_eq!(sink.sent[0].1, "Status atual:\nLinha 1-Azul: Paralisada");
    }

    #[test]
    fn aggregate_mode_all_back_to_normal_is_an_all_clear() {
        let mut settings = Settings::default();
        settings.notify_only_changes = false;
        let events = vec![change("Linha 1-Azul", "Paralisada", "Operação Normal")];
        let mut sink = Recorder::default();
        NotificationRouter::new(&settings).route(&events, &mut sink);

        assert_eq!(sink.sent.len(), 1);
        assert_eq!(sink.sent[0].0, "Status do Metrô");
        assert_eq!(sink.sent[0].1, "Todas as linhas monitoradas operando normalmente.");
    }
}
