#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use contactbook_core::{Clock, Contact, CsvContactStore, ErrorLog, StoreConfig};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Clock pinned to a settable instant.
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            now: Mutex::new(datetime(year, month, day, hour, minute, second)),
        }
    }

    pub fn set(&self, value: NaiveDateTime) {
        *self.now.lock().unwrap() = value;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

/// Error log that keeps entries in memory.
#[derive(Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<(String, String)>>,
}

impl RecordingLog {
    pub fn operations(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(operation, _)| operation.clone())
            .collect()
    }
}

impl ErrorLog for RecordingLog {
    fn record(&self, operation: &str, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((operation.to_string(), message.to_string()));
    }
}

/// Store rooted in a fresh temp dir with an injectable clock and log.
pub struct Fixture {
    pub dir: TempDir,
    pub config: StoreConfig,
    pub clock: Arc<FixedClock>,
    pub log: Arc<RecordingLog>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::in_dir(dir.path());
        Self {
            dir,
            config,
            clock: Arc::new(FixedClock::at(2026, 3, 1, 10, 0, 0)),
            log: Arc::new(RecordingLog::default()),
        }
    }

    pub fn store(&self) -> CsvContactStore {
        self.store_with(self.config.clone())
    }

    pub fn store_with(&self, config: StoreConfig) -> CsvContactStore {
        let clock: Arc<dyn Clock> = self.clock.clone();
        let log: Arc<dyn ErrorLog> = self.log.clone();
        CsvContactStore::with_clock(config, clock, log)
    }
}

pub fn datetime(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

pub fn contact(name: &str, phone: &str, tags: &str) -> Contact {
    Contact::new(name).unwrap().with_phone(phone).with_tags(tags)
}

pub fn names(contacts: &[Contact]) -> Vec<String> {
    contacts.iter().map(|c| c.name.clone()).collect()
}
