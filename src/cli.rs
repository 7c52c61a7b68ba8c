// src/cli.rs
//
// Console frontend: argument parsing, the interactive status screen and
// the polling loop. Rendering goes through crossterm so colors and the
// countdown redraw behave the same on every platform.

use std::{
    env,
    io::{self, Write},
    time::{Duration, Instant},
};

use chrono::Local;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use indexmap::IndexMap;

use crate::config::consts::{CONFIG_FILE, STATUS_PATH, TIMESTAMP_FMT};
use crate::config::Settings;
use crate::core::{html, net};
use crate::log;
use crate::monitor::Monitor;
use crate::notify::{NotificationRouter, Notify};

/* ---------------- arguments ---------------- */

#[derive(Default)]
struct Args {
    debug: bool,
    persist: bool,
    nocolor: bool,
    once: bool,
    interval: Option<u64>,
}

fn parse_cli() -> Result<Args, Box<dyn std::error::Error>> {
    let mut parsed = Args::default();
    let mut args = env::args().skip(1);
    while let Some(a) = args.next() {
        match a.as_str() {
            "--debug" | "-d" => parsed.debug = true,
            "--persist" => parsed.persist = true,
            "--nocolor" => parsed.nocolor = true,
            "--once" => parsed.once = true,
            "--interval" => {
                let v: u64 = args.next().ok_or("Missing value for --interval")?.parse()?;
                if v == 0 {
                    return Err("Interval must be at least 1 second".into());
                }
                parsed.interval = Some(v);
            }
            "-h" | "--help" => {
                eprintln!(include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown arg: {}", a).into()),
        }
    }
    Ok(parsed)
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_cli()?;

    let mut settings = Settings::load();
    if args.debug {
        settings.debug = true;
    }
    if args.persist {
        settings.persist_history = true;
    }
    if let Some(secs) = args.interval {
        settings.interval_secs = secs;
    }
    // Write the merged settings back, creating config.json on first run.
    if let Err(e) = settings.save() {
        loge!("não foi possível salvar {CONFIG_FILE}: {e}");
    }
    log::set_debug(settings.debug);
    logf!("monitor iniciado; intervalo de {}s", settings.interval_secs);

    let mut monitor = Monitor::new(settings);
    if args.once {
        poll_once(&mut monitor, !args.nocolor)
    } else {
        interactive(&mut monitor, !args.nocolor)
    }
}

/* ---------------- one-shot mode ---------------- */

fn poll_once(monitor: &mut Monitor, color: bool) -> Result<(), Box<dyn std::error::Error>> {
    let page = net::http_get(STATUS_PATH)?;
    let outcome = monitor.poll(&page);

    let mut out = io::stdout();
    execute!(
        out,
        Print(format!(
            "Horário informado pelo site do Metrô: {}\r\n",
            outcome.source_updated
        ))
    )?;
    for record in outcome.snapshot.iter() {
        let status = record.status.as_text();
        if color {
            execute!(out, SetForegroundColor(status_color(status)))?;
        }
        execute!(out, Print(format!("{}: {}\r\n", record.name, status)))?;
        if color {
            execute!(out, ResetColor)?;
        }
    }
    out.flush()?;

    let mut notifier = ConsoleNotifier::new(color);
    NotificationRouter::new(monitor.settings()).route(&outcome.events, &mut notifier);
    Ok(())
}

/* ---------------- interactive mode ---------------- */

fn interactive(monitor: &mut Monitor, color: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("Inicializando Monitor de Status do Metrô...");
    println!("Pressione 'Q' para sair, 'R' para atualizar manualmente");

    let raw = RawModeGuard::enter()?;
    let mut out = io::stdout();
    execute!(out, terminal::SetTitle("Monitor de Status do Metrô"))?;

    let mut screen = Screen::new(color);
    let mut notifier = ConsoleNotifier::new(color);
    let mut view: Option<StatusView> = None;

    'main: loop {
        refresh(monitor, &mut screen, &mut notifier, &mut view, &mut out)?;

        let deadline = Instant::now() + Duration::from_secs(monitor.settings().interval_secs);
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            screen.update_countdown(&mut out, left.as_secs())?;
            if left.is_zero() {
                break;
            }
            if event::poll(left.min(Duration::from_secs(1)))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => break 'main,
                        KeyCode::Char('r') | KeyCode::Char('R') => continue 'main,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break 'main
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    drop(raw);
    println!("\nPrograma encerrado.");
    Ok(())
}

/// One poll plus redraw. A failed fetch keeps the previous screen: the
/// monitor never sees the bad page, so no phantom "back to normal" events.
fn refresh(
    monitor: &mut Monitor,
    screen: &mut Screen,
    notifier: &mut ConsoleNotifier,
    view: &mut Option<StatusView>,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = monitor.settings().interval_secs;
    match net::http_get(STATUS_PATH) {
        Ok(page) => {
            let previous = monitor.previous_statuses();
            let outcome = monitor.poll(&page);
            let statuses = outcome
                .snapshot
                .iter()
                .map(|r| (r.name.clone(), r.status.as_text().to_string()))
                .collect();
            let new_view = StatusView {
                statuses,
                previous,
                source_updated: outcome.source_updated.clone(),
                checked_at: Local::now().format(TIMESTAMP_FMT).to_string(),
            };
            screen.draw(out, &new_view, interval)?;
            NotificationRouter::new(monitor.settings()).route(&outcome.events, notifier);
            *view = Some(new_view);
        }
        Err(e) => {
            loge!("erro ao consultar o site: {e}");
            if let Some(stale) = view.as_ref() {
                screen.draw(out, stale, interval)?;
            }
            screen.error_line(out, &format!("Erro ao verificar status: {e}"))?;
        }
    }
    Ok(())
}

/* ---------------- status screen ---------------- */

/// Everything one full redraw needs, kept around so a failed poll can
/// repaint the last good state.
struct StatusView {
    statuses: IndexMap<String, String>,
    /// Status text per line before the poll that produced `statuses`.
    previous: IndexMap<String, String>,
    source_updated: String,
    checked_at: String,
}

struct Screen {
    color: bool,
    /// Terminal row of the countdown line. None until the first full
    /// draw; countdown updates are skipped while unset.
    countdown_row: Option<u16>,
}

impl Screen {
    fn new(color: bool) -> Self {
        Self { color, countdown_row: None }
    }

    /// Full redraw: clear, header, countdown, one line per status, footer.
    fn draw(&mut self, out: &mut impl Write, view: &StatusView, interval: u64) -> io::Result<()> {
        execute!(out, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        let mut row: u16 = 0;

        write_line(out, "=== Monitor de Status do Metrô ===")?;
        row += 1;
        write_line(out, &format!("Última consulta: {}", view.checked_at))?;
        row += 1;
        write_line(
            out,
            &format!("Horário informado pelo site do Metrô: {}", view.source_updated),
        )?;
        row += 1;
        write_line(out, "")?;
        row += 1;

        self.countdown_row = Some(row);
        self.set_color(out, Color::Cyan)?;
        write_line(out, &format!("Próxima atualização em: {interval} segundos"))?;
        self.reset_color(out)?;
        write_line(out, "")?;

        for (line, status) in &view.statuses {
            self.set_color(out, status_color(status))?;
            let mut text = format!("{line}: {status}");
            match view.previous.get(line) {
                Some(old) if old != status => text.push_str(&format!(" (Era: {old})")),
                Some(_) => text.push_str(" (não alterado)"),
                None => {}
            }
            write_line(out, &text)?;
            self.reset_color(out)?;
        }

        write_line(out, "")?;
        write_line(out, "Pressione 'R' para atualizar, 'Q' para sair")?;
        out.flush()
    }

    /// Rewrite only the countdown line, leaving the rest of the screen
    /// alone.
    fn update_countdown(&self, out: &mut impl Write, secs: u64) -> io::Result<()> {
        let Some(countdown_row) = self.countdown_row else {
            return Ok(());
        };
        execute!(
            out,
            cursor::SavePosition,
            cursor::MoveTo(0, countdown_row),
            Clear(ClearType::CurrentLine)
        )?;
        self.set_color(out, Color::Cyan)?;
        if secs > 0 {
            execute!(out, Print(format!("Próxima atualização em: {secs} segundos")))?;
        } else {
            execute!(out, Print("Atualizando..."))?;
        }
        self.reset_color(out)?;
        execute!(out, cursor::RestorePosition)?;
        out.flush()
    }

    fn error_line(&self, out: &mut impl Write, text: &str) -> io::Result<()> {
        self.set_color(out, Color::Red)?;
        write_line(out, text)?;
        self.reset_color(out)?;
        out.flush()
    }

    fn set_color(&self, out: &mut impl Write, color: Color) -> io::Result<()> {
        if self.color {
            execute!(out, SetForegroundColor(color))?;
        }
        Ok(())
    }

    fn reset_color(&self, out: &mut impl Write) -> io::Result<()> {
        if self.color {
            execute!(out, ResetColor)?;
        }
        Ok(())
    }
}

/// Raw mode needs explicit carriage returns.
fn write_line(out: &mut impl Write, text: &str) -> io::Result<()> {
    execute!(out, Print(text), Print("\r\n"))
}

fn status_color(status: &str) -> Color {
    if html::contains_ci(status, "normal") {
        Color::Green
    } else if html::contains_ci(status, "paralisada") || html::contains_ci(status, "interrompida") {
        Color::Red
    } else {
        Color::Yellow
    }
}

/* ---------------- console notifications ---------------- */

/// Prints notifications below the status screen; the next full redraw
/// clears them.
pub struct ConsoleNotifier {
    color: bool,
}

impl ConsoleNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn show(&self, out: &mut impl Write, title: &str, message: &str) -> io::Result<()> {
        if self.color {
            execute!(out, SetForegroundColor(Color::Yellow))?;
        }
        write_line(out, "")?;
        write_line(out, &format!("=== {title} ==="))?;
        if self.color {
            execute!(out, SetForegroundColor(Color::Cyan))?;
        }
        for line in message.split('\n') {
            write_line(out, line)?;
        }
        if self.color {
            execute!(out, SetForegroundColor(Color::Yellow))?;
        }
        write_line(out, &"-".repeat(40))?;
        if self.color {
            execute!(out, ResetColor)?;
        }
        out.flush()
    }
}

impl Notify for ConsoleNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        let mut out = io::stdout();
        if let Err(e) = self.show(&mut out, title, message) {
            loge!("erro ao mostrar notificação: {e}");
        }
    }
}

/* ---------------- raw mode guard ---------------- */

/// Raw terminal mode for the life of the interactive loop. Restores the
/// terminal on drop, panics included.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
