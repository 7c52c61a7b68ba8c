// src/log.rs
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Local;

use crate::config::consts::LOG_FILE;

static LOG_LOCK: Mutex<()> = Mutex::new(());
static DEBUG: AtomicBool = AtomicBool::new(false);

/// Turn debug logging on for the whole process. Flipped once at startup
/// from the settings or the --debug flag.
pub fn set_debug(on: bool) {
    DEBUG.store(on, Ordering::Relaxed);
}

pub fn debug_enabled() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

/// Internal logging function. Append-only file log; echoed to stderr in
/// debug mode. Logging failures are ignored.
pub fn write_log(level: &str, msg: &str) {
    let stamp = Local::now().format("%H:%M:%S");
    let line = format!("[{stamp}][{level}] {msg}\n");

    if debug_enabled() {
        eprint!("{line}");
    }
    if let Ok(_guard) = LOG_LOCK.lock() {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(LOG_FILE)
        {
            let _ = file.write_all(line.as_bytes());
        }
    }
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        $crate::log::write_log("INFO", &format!($($arg)*))
    };
}

/// Debug-level logging, active only with the debug flag on
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        if $crate::log::debug_enabled() {
            $crate::log::write_log("DEBUG", &format!($($arg)*))
        }
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        $crate::log::write_log("ERROR", &format!($($arg)*))
    };
}
