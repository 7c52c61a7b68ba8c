// src/store.rs
//
// On-disk snapshot history. One JSON file holding the latest snapshot;
// with persistence enabled a restart diffs against it instead of
// re-announcing every line.

use std::{fs, io, path::{Path, PathBuf}};

use crate::config::consts::HISTORY_FILE;
use crate::snapshot::Snapshot;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StoreError>;

pub struct HistoryStore {
    path: PathBuf,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    /// Store at the default history file in the working directory.
    pub fn new() -> Self {
        Self::at(HISTORY_FILE)
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last persisted snapshot. A missing file is an empty
    /// history, not an error.
    pub fn load(&self) -> Result<Snapshot> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Snapshot::default()),
            Err(e) => return Err(e.into()),
        };
        let mut snapshot: Snapshot = serde_json::from_str(&json)?;
        snapshot.rehydrate_checked_at();
        Ok(snapshot)
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
