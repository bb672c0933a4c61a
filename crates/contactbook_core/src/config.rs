//! Store configuration.
//!
//! # Responsibility
//! - Describe where the store, undo snapshot, backups and error log live.
//!
//! # Invariants
//! - A `StoreConfig` is built once at process start and never mutated after
//!   it is handed to the store; every component receives its own clone.

use std::path::{Path, PathBuf};

const DEFAULT_STORE_FILE: &str = "contacts.csv";
const DEFAULT_SNAPSHOT_FILE: &str = ".temp_data.json";
const DEFAULT_BACKUP_DIR: &str = "backups";
const DEFAULT_ERROR_LOG_FILE: &str = "error_log.txt";
const DEFAULT_EXPORT_JSON_FILE: &str = "contacts.json";
const DEFAULT_BACKUP_EXTENSION: &str = "csv";

/// File layout for one contact book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Authoritative tabular store file.
    pub store_path: PathBuf,
    /// Single-slot undo snapshot (JSON).
    pub snapshot_path: PathBuf,
    /// Directory holding timestamped store copies.
    pub backup_dir: PathBuf,
    /// Append-only postmortem error log.
    pub error_log_path: PathBuf,
    /// Default target of the JSON export.
    pub export_json_path: PathBuf,
    /// Extension (without dot) used for backup file names.
    pub backup_extension: String,
}

impl StoreConfig {
    /// Builds the default layout rooted at `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            store_path: dir.join(DEFAULT_STORE_FILE),
            snapshot_path: dir.join(DEFAULT_SNAPSHOT_FILE),
            backup_dir: dir.join(DEFAULT_BACKUP_DIR),
            error_log_path: dir.join(DEFAULT_ERROR_LOG_FILE),
            export_json_path: dir.join(DEFAULT_EXPORT_JSON_FILE),
            backup_extension: DEFAULT_BACKUP_EXTENSION.to_string(),
        }
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn with_backup_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_dir = path.into();
        self
    }

    pub fn with_error_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_log_path = path.into();
        self
    }

    pub fn with_export_json_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_json_path = path.into();
        self
    }
}

impl Default for StoreConfig {
    /// Relative layout in the current working directory.
    fn default() -> Self {
        Self::in_dir(".")
    }
}
