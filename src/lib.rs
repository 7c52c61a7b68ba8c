// src/lib.rs

#[macro_use]
pub mod log;

pub mod cli;
pub mod config;
pub mod core;
pub mod diff;
pub mod lines;
pub mod monitor;
pub mod notify;
pub mod scrape;
pub mod snapshot;
pub mod status;
pub mod store;
