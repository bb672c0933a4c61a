//! Durable append-only error log for postmortem diagnosis.
//!
//! # Invariants
//! - Recording never fails the calling operation; write errors are swallowed.
//! - Entries are appended, never rewritten.

use chrono::Local;
use log::warn;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const SEPARATOR_WIDTH: usize = 50;
const MAX_MESSAGE_CHARS: usize = 500;

/// Failure sink keyed by operation name.
pub trait ErrorLog: Send + Sync {
    fn record(&self, operation: &str, message: &str);
}

/// Appends timestamped entries to a text file.
#[derive(Debug, Clone)]
pub struct FileErrorLog {
    path: PathBuf,
}

impl FileErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, entry: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())?;
        file.flush()
    }
}

impl ErrorLog for FileErrorLog {
    fn record(&self, operation: &str, message: &str) {
        let entry = format_entry(
            &Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            operation,
            message,
        );
        if let Err(err) = self.append(&entry) {
            warn!(
                "event=error_log_write module=error_log status=error operation={} error={}",
                operation, err
            );
        }
    }
}

/// Discards every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopErrorLog;

impl ErrorLog for NoopErrorLog {
    fn record(&self, _operation: &str, _message: &str) {}
}

fn format_entry(timestamp: &str, operation: &str, message: &str) -> String {
    format!(
        "[{timestamp}] Error in {operation}: {}\n{}\n",
        single_line(message),
        "-".repeat(SEPARATOR_WIDTH)
    )
}

fn single_line(value: &str) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= MAX_MESSAGE_CHARS {
        return flattened;
    }
    let mut truncated: String = flattened.chars().take(MAX_MESSAGE_CHARS).collect();
    truncated.push_str("...");
    truncated
}
