//! Bulk import/export adapters.
//!
//! # Responsibility
//! - Map external CSV tables into store records.
//! - Read and write the structured JSON export.
//! - Render per-contact vCard files.
//!
//! # Invariants
//! - Adapters never touch the store; the service decides when to persist.
//! - A failed read leaves no partial result behind.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod csv_import;
mod json;
mod vcard;

pub use csv_import::{parse_import_table, read_import_csv, ParsedImport};
pub use json::{read_json_contacts, write_json_contacts};
pub use vcard::{render_vcard, vcard_file_name, write_vcard};

pub type TransferResult<T> = Result<T, TransferError>;

/// Import/export failure.
#[derive(Debug)]
pub enum TransferError {
    /// Import source path does not exist.
    SourceNotFound(PathBuf),
    /// Import table has no `name` column.
    MissingNameColumn,
    Io { path: PathBuf, source: io::Error },
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl TransferError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::SourceNotFound(path.into());
        }
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound(path) => write!(f, "file does not exist: {}", path.display()),
            Self::MissingNameColumn => write!(f, "import table has no `name` column"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Csv(err) => write!(f, "malformed import table: {err}"),
            Self::Json(err) => write!(f, "malformed contact JSON: {err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::SourceNotFound(_) | Self::MissingNameColumn => None,
        }
    }
}

impl From<csv::Error> for TransferError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Outcome of a CSV bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Rows appended to the store.
    pub imported: usize,
    /// Rows dropped because the name column was blank.
    pub skipped_blank: usize,
    /// Rows dropped because the name already existed.
    pub skipped_duplicate: usize,
}
