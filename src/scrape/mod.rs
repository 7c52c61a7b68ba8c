// src/scrape/mod.rs
mod scrape;
mod strategies;
mod update_time;

pub use scrape::{collect_statuses, RawStatusMap};
pub use update_time::extract_update_time;
