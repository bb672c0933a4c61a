//! Durable record store, undo snapshot and backups.
//!
//! # Responsibility
//! - Define the store contract consumed by services.
//! - Keep file formats and the backup policy inside the persistence boundary.
//!
//! # Invariants
//! - No record state is cached between calls; every operation reads disk.
//! - The live store file is only ever replaced whole, never appended to.
//! - Backups are never overwritten or deleted by the store.

use crate::error_log::ErrorLog;
use crate::model::contact::Contact;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub mod csv_store;
pub mod snapshot;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error for store, snapshot and backup operations.
#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Csv(csv::Error),
    Json(serde_json::Error),
    /// The store file does not exist yet.
    MissingStoreFile(PathBuf),
    /// No backup with this name is available.
    BackupNotFound(String),
    /// Two records share a case-insensitive name.
    DuplicateName(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Csv(err) => write!(f, "malformed store table: {err}"),
            Self::Json(err) => write!(f, "malformed snapshot data: {err}"),
            Self::MissingStoreFile(path) => {
                write!(f, "store file does not exist: {}", path.display())
            }
            Self::BackupNotFound(name) => write!(f, "backup not found: {name}"),
            Self::DuplicateName(name) => write!(f, "duplicate contact name: {name}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::MissingStoreFile(_) | Self::BackupNotFound(_) | Self::DuplicateName(_) => None,
        }
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Outcome of reading the store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// The file was read and decoded.
    Loaded,
    /// No store file exists yet.
    Missing,
    /// The file exists but could not be read or decoded; contacts are empty.
    Degraded(String),
}

/// Loaded contacts together with how they were obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub contacts: Vec<Contact>,
    pub status: LoadStatus,
}

impl LoadReport {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, LoadStatus::Degraded(_))
    }
}

/// Versioning side effects of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Copy the current store file into the backup dir, once per calendar day.
    pub backup: bool,
    /// Capture the current on-disk state into the undo slot first.
    pub undo_snapshot: bool,
}

impl SaveOptions {
    /// Plain overwrite with no backup and no snapshot. Used by undo.
    pub fn without_versioning() -> Self {
        Self {
            backup: false,
            undo_snapshot: false,
        }
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            backup: true,
            undo_snapshot: true,
        }
    }
}

/// Result of an undo request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The store now holds the snapshot's `count` records.
    Restored { count: usize },
    /// The undo slot is empty or unreadable.
    NothingToUndo,
}

/// Store contract consumed by the contact service.
pub trait ContactStore {
    /// Reads all contacts; failures degrade to an empty set.
    fn load(&self) -> Vec<Contact> {
        self.load_report().contacts
    }
    fn load_report(&self) -> LoadReport;
    fn save(&self, contacts: &[Contact], options: SaveOptions) -> StoreResult<()>;
    fn undo(&self) -> StoreResult<UndoOutcome>;
    fn manual_backup(&self) -> StoreResult<PathBuf>;
    fn list_backups(&self) -> StoreResult<Vec<String>>;
    fn restore(&self, backup_name: &str) -> StoreResult<()>;
    /// Sink for failures raised above the store.
    fn error_log(&self) -> &dyn ErrorLog;
}

/// Writes `bytes` to a sibling temp file, then renames it over `path`.
pub(crate) fn replace_file(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
        }
    }
    let temp_path = temp_sibling(path);
    std::fs::write(&temp_path, bytes).map_err(|err| StoreError::io(&temp_path, err))?;
    std::fs::rename(&temp_path, path).map_err(|err| {
        let _ = std::fs::remove_file(&temp_path);
        StoreError::io(path, err)
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
