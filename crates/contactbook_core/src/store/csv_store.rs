//! CSV-backed contact store.
//!
//! # Responsibility
//! - Decode/encode the `name,phone,email,tags,favorite` table.
//! - Run the snapshot-then-backup-then-write save sequence.
//!
//! # Invariants
//! - Rows with an empty name are dropped on load; missing columns read as "".
//! - Later rows repeating an earlier name (case-insensitive) are dropped on load.
//! - `save` refuses record sets with duplicate names before touching any file.
//! - The undo snapshot captures the on-disk state *before* this save, not the
//!   incoming records.
//! - Saves are best-effort: a failure after the snapshot or backup step does
//!   not roll those steps back.

use super::snapshot::BackupManager;
use super::{
    replace_file, ContactStore, LoadReport, LoadStatus, SaveOptions, StoreError, StoreResult,
    UndoOutcome,
};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error_log::ErrorLog;
use crate::model::contact::{parse_tags, Contact};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Column order of the store table.
pub const STORE_HEADERS: [&str; 5] = ["name", "phone", "email", "tags", "favorite"];

const FAVORITE_TRUE_TOKENS: [&str; 4] = ["1", "true", "yes", "y"];

/// Flat-file store over a single CSV table.
pub struct CsvContactStore {
    config: StoreConfig,
    backups: BackupManager,
    error_log: Arc<dyn ErrorLog>,
}

impl CsvContactStore {
    /// Creates a store that reads time from the system clock.
    pub fn new(config: StoreConfig, error_log: Arc<dyn ErrorLog>) -> Self {
        Self::with_clock(config, Arc::new(SystemClock), error_log)
    }

    pub fn with_clock(
        config: StoreConfig,
        clock: Arc<dyn Clock>,
        error_log: Arc<dyn ErrorLog>,
    ) -> Self {
        let backups = BackupManager::new(config.clone(), clock, Arc::clone(&error_log));
        Self {
            config,
            backups,
            error_log,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Creates the store file with only the header row if it is missing.
    pub fn init(&self) -> StoreResult<()> {
        if self.config.store_path.exists() {
            return Ok(());
        }
        let result =
            encode_table(&[]).and_then(|bytes| replace_file(&self.config.store_path, &bytes));
        if let Err(err) = &result {
            self.error_log.record("init_db", &err.to_string());
        }
        result
    }

    fn save_inner(&self, contacts: &[Contact], options: SaveOptions) -> StoreResult<()> {
        self.backups.ensure_backup_dir()?;

        if options.undo_snapshot {
            let previous = self.load();
            // Snapshot failures never block the write itself.
            if let Err(err) = self.backups.write_snapshot(&previous) {
                warn!("event=snapshot_write module=store status=error");
                self.error_log.record("save_temp_snapshot", &err.to_string());
            }
        }

        if options.backup {
            self.backups.backup_daily_if_due()?;
        }

        let bytes = encode_table(contacts)?;
        replace_file(&self.config.store_path, &bytes)
    }

    fn degraded(&self, err: StoreError) -> LoadReport {
        error!(
            "event=store_load module=store status=error mode=degraded error={}",
            err
        );
        self.error_log.record("load_data", &err.to_string());
        LoadReport {
            contacts: Vec::new(),
            status: LoadStatus::Degraded(err.to_string()),
        }
    }

    fn logged<T>(&self, operation: &str, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(err) = &result {
            self.error_log.record(operation, &err.to_string());
        }
        result
    }
}

impl ContactStore for CsvContactStore {
    fn load_report(&self) -> LoadReport {
        let path = &self.config.store_path;
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("event=store_load module=store status=ok mode=missing");
                return LoadReport {
                    contacts: Vec::new(),
                    status: LoadStatus::Missing,
                };
            }
            Err(err) => return self.degraded(StoreError::io(path, err)),
        };

        match decode_table(file) {
            Ok(contacts) => {
                debug!(
                    "event=store_load module=store status=ok records={}",
                    contacts.len()
                );
                LoadReport {
                    contacts,
                    status: LoadStatus::Loaded,
                }
            }
            Err(err) => self.degraded(err),
        }
    }

    fn save(&self, contacts: &[Contact], options: SaveOptions) -> StoreResult<()> {
        let started_at = Instant::now();
        let result =
            ensure_unique_names(contacts).and_then(|()| self.save_inner(contacts, options));
        match &result {
            Ok(()) => info!(
                "event=store_save module=store status=ok records={} backup={} undo_snapshot={} duration_ms={}",
                contacts.len(),
                options.backup,
                options.undo_snapshot,
                started_at.elapsed().as_millis()
            ),
            Err(err) => {
                error!(
                    "event=store_save module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                self.error_log.record("save_data", &err.to_string());
            }
        }
        result
    }

    fn undo(&self) -> StoreResult<UndoOutcome> {
        let Some(previous) = self.backups.read_snapshot() else {
            info!("event=store_undo module=store status=skip reason=nothing_to_undo");
            return Ok(UndoOutcome::NothingToUndo);
        };
        self.save(&previous, SaveOptions::without_versioning())?;
        info!(
            "event=store_undo module=store status=ok records={}",
            previous.len()
        );
        Ok(UndoOutcome::Restored {
            count: previous.len(),
        })
    }

    fn manual_backup(&self) -> StoreResult<PathBuf> {
        self.logged("manual_backup", self.backups.manual_backup())
    }

    fn list_backups(&self) -> StoreResult<Vec<String>> {
        self.logged("list_backups", self.backups.list_backups())
    }

    fn restore(&self, backup_name: &str) -> StoreResult<()> {
        self.logged("restore_backup", self.backups.restore(backup_name))
    }

    fn error_log(&self) -> &dyn ErrorLog {
        self.error_log.as_ref()
    }
}

/// Decodes a store table. Header order is free; unknown columns are ignored.
pub(crate) fn decode_table(reader: impl Read) -> StoreResult<Vec<Contact>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let column = |field: &str| headers.iter().position(|header| header.trim() == field);
    let columns: Vec<Option<usize>> = STORE_HEADERS.iter().map(|field| column(field)).collect();

    let mut contacts = Vec::new();
    let mut seen_names = HashSet::new();
    for row in csv_reader.records() {
        let row = row?;
        let field = |slot: usize| {
            columns[slot]
                .and_then(|index| row.get(index))
                .map(str::trim)
                .unwrap_or("")
        };

        let Ok(contact) = Contact::new(field(0)) else {
            continue;
        };
        if !seen_names.insert(contact.name.to_lowercase()) {
            warn!("event=store_load module=store status=skip reason=duplicate_name");
            continue;
        }
        contacts.push(Contact {
            phone: field(1).to_string(),
            email: field(2).to_string(),
            tags: parse_tags(field(3)),
            favorite: is_favorite_token(field(4)),
            ..contact
        });
    }
    Ok(contacts)
}

/// Encodes contacts into a store table with a header row.
pub(crate) fn encode_table(contacts: &[Contact]) -> StoreResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(STORE_HEADERS)?;
    for contact in contacts {
        writer.write_record([
            contact.name.as_str(),
            contact.phone.as_str(),
            contact.email.as_str(),
            contact.tags_joined().as_str(),
            if contact.favorite { "1" } else { "0" },
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| StoreError::Csv(csv::Error::from(err.into_error())))
}

fn is_favorite_token(raw: &str) -> bool {
    let lowered = raw.to_lowercase();
    FAVORITE_TRUE_TOKENS.contains(&lowered.as_str())
}

fn ensure_unique_names(contacts: &[Contact]) -> StoreResult<()> {
    let mut seen = HashSet::new();
    for contact in contacts {
        if !seen.insert(contact.name.to_lowercase()) {
            return Err(StoreError::DuplicateName(contact.name.clone()));
        }
    }
    Ok(())
}
