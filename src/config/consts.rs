// src/config/consts.rs

// Net config
pub const HOST: &str = "www.metro.sp.gov.br";
pub const STATUS_PATH: &str = "/wp-content/themes/metrosp/direto-metro.php";
pub const TIMEOUT_SECS: u64 = 30;

// Polling
pub const DEFAULT_INTERVAL_SECS: u64 = 10;

// Files, all relative to the working directory
pub const CONFIG_FILE: &str = "config.json";
pub const HISTORY_FILE: &str = "historico_status.json";
pub const LOG_FILE: &str = "metro_status_log.txt";

// Timestamps ("dd/MM/yyyy HH:mm:ss", as the page itself prints them)
pub const TIMESTAMP_FMT: &str = "%d/%m/%Y %H:%M:%S";
