//! Undo snapshot slot and timestamped backups.
//!
//! # Responsibility
//! - Hold the single rolling undo snapshot (JSON).
//! - Create automatic (at most one per calendar day) and manual backups.
//! - List backups and restore one over the live store file.
//!
//! # Invariants
//! - The snapshot slot holds exactly the last written state; no history.
//! - Automatic backups are named `backup_<YYYYMMDD_HHMMSS>.<ext>`, manual ones
//!   `manual_backup_<YYYYMMDD_HHMMSS>[_<n>].<ext>`.
//! - An existing backup file is never overwritten or removed.

use super::{replace_file, StoreError, StoreResult};
use crate::clock::Clock;
use crate::config::StoreConfig;
use crate::error_log::ErrorLog;
use crate::model::contact::Contact;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const AUTO_BACKUP_PREFIX: &str = "backup_";
const MANUAL_BACKUP_PREFIX: &str = "manual_backup_";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const DATE_FORMAT: &str = "%Y%m%d";

/// Snapshot and backup manager bound to one store layout.
pub struct BackupManager {
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    error_log: Arc<dyn ErrorLog>,
}

impl BackupManager {
    pub fn new(config: StoreConfig, clock: Arc<dyn Clock>, error_log: Arc<dyn ErrorLog>) -> Self {
        Self {
            config,
            clock,
            error_log,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.config.backup_dir
    }

    pub fn ensure_backup_dir(&self) -> StoreResult<()> {
        let dir = &self.config.backup_dir;
        std::fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))
    }

    /// Overwrites the undo slot with `contacts`.
    pub fn write_snapshot(&self, contacts: &[Contact]) -> StoreResult<()> {
        let bytes = serde_json::to_vec(contacts)?;
        replace_file(&self.config.snapshot_path, &bytes)?;
        debug!(
            "event=snapshot_write module=snapshot status=ok records={}",
            contacts.len()
        );
        Ok(())
    }

    /// Returns the last written snapshot, or `None` when the slot is empty or
    /// unreadable. Read and parse failures are recorded in the error log.
    pub fn read_snapshot(&self) -> Option<Vec<Contact>> {
        let path = &self.config.snapshot_path;
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                self.error_log
                    .record("get_last_snapshot", &StoreError::io(path, err).to_string());
                return None;
            }
        };

        match serde_json::from_slice::<Vec<Contact>>(&bytes) {
            Ok(contacts) => Some(contacts),
            Err(err) => {
                warn!("event=snapshot_read module=snapshot status=error error_code=parse_failed");
                self.error_log
                    .record("get_last_snapshot", &StoreError::Json(err).to_string());
                None
            }
        }
    }

    /// Copies the store file into the backup dir unless today already has an
    /// automatic backup. Returns the new backup path when one was created.
    ///
    /// Manual backups do not count towards the daily limit.
    pub fn backup_daily_if_due(&self) -> StoreResult<Option<PathBuf>> {
        let store_path = &self.config.store_path;
        if !store_path.exists() {
            return Ok(None);
        }

        let now = self.clock.now();
        let today_prefix = format!("{AUTO_BACKUP_PREFIX}{}", now.format(DATE_FORMAT));
        if self.has_backup_with_prefix(&today_prefix) {
            debug!("event=backup_auto module=snapshot status=skip reason=already_backed_up_today");
            return Ok(None);
        }

        let file_name = format!(
            "{AUTO_BACKUP_PREFIX}{}.{}",
            now.format(TIMESTAMP_FORMAT),
            self.config.backup_extension
        );
        let target = self.config.backup_dir.join(file_name);
        self.ensure_backup_dir()?;
        self.copy_store_to(&target)?;
        info!("event=backup_auto module=snapshot status=ok");
        Ok(Some(target))
    }

    /// Always creates a new backup, independent of the daily policy.
    pub fn manual_backup(&self) -> StoreResult<PathBuf> {
        let store_path = &self.config.store_path;
        if !store_path.exists() {
            return Err(StoreError::MissingStoreFile(store_path.clone()));
        }
        self.ensure_backup_dir()?;

        let stem = format!(
            "{MANUAL_BACKUP_PREFIX}{}",
            self.clock.now().format(TIMESTAMP_FORMAT)
        );
        let target = self.unused_backup_path(&stem);
        self.copy_store_to(&target)?;
        info!("event=backup_manual module=snapshot status=ok");
        Ok(target)
    }

    /// Backup file names carrying the configured extension, sorted by name.
    pub fn list_backups(&self) -> StoreResult<Vec<String>> {
        let dir = &self.config.backup_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let suffix = format!(".{}", self.config.backup_extension);
        let entries = std::fs::read_dir(dir).map_err(|err| StoreError::io(dir, err))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| StoreError::io(dir, err))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(&suffix) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Replaces the live store file with the contents of `backup_name`.
    pub fn restore(&self, backup_name: &str) -> StoreResult<()> {
        let available = self.list_backups()?;
        if !is_plain_file_name(backup_name) || !available.iter().any(|name| name == backup_name)
        {
            return Err(StoreError::BackupNotFound(backup_name.to_string()));
        }

        let source = self.config.backup_dir.join(backup_name);
        let bytes = std::fs::read(&source).map_err(|err| StoreError::io(&source, err))?;
        replace_file(&self.config.store_path, &bytes)?;
        info!("event=backup_restore module=snapshot status=ok");
        Ok(())
    }

    fn has_backup_with_prefix(&self, prefix: &str) -> bool {
        // Unreadable backup dir counts as "no backup today".
        let Ok(entries) = std::fs::read_dir(&self.config.backup_dir) else {
            return false;
        };
        entries.flatten().any(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(prefix))
        })
    }

    fn unused_backup_path(&self, stem: &str) -> PathBuf {
        let extension = &self.config.backup_extension;
        let dir = &self.config.backup_dir;
        let mut candidate = dir.join(format!("{stem}.{extension}"));
        let mut counter = 1;
        while candidate.exists() {
            candidate = dir.join(format!("{stem}_{counter}.{extension}"));
            counter += 1;
        }
        candidate
    }

    fn copy_store_to(&self, target: &Path) -> StoreResult<()> {
        let store_path = &self.config.store_path;
        std::fs::copy(store_path, target)
            .map(|_| ())
            .map_err(|err| StoreError::io(target, err))
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}
