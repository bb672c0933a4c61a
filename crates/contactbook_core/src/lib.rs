//! Core domain logic for the contact book.
//! This crate is the single source of truth for record, store and versioning invariants.

pub mod clock;
pub mod config;
pub mod dedupe;
pub mod error_log;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod service;
pub mod store;
pub mod transfer;

pub use clock::{Clock, SystemClock};
pub use config::StoreConfig;
pub use dedupe::{
    auto_merge, auto_merge_candidates, find_near_duplicate, merge_into_existing, similarity_ratio,
    AutoMergeReport, MergeCandidate, NearDuplicate,
};
pub use error_log::{ErrorLog, FileErrorLog, NoopErrorLog};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{Contact, ContactError};
pub use normalize::{
    field_warnings, is_valid_email, is_valid_phone, normalize_phone, ValidationWarning,
};
pub use service::contact_service::{
    find_by_name, AddOutcome, ContactDraft, ContactPatch, ContactService, ContactServiceError,
    MergeDecision, ServiceResult, SortKey, UpdateOutcome,
};
pub use store::csv_store::CsvContactStore;
pub use store::snapshot::BackupManager;
pub use store::{
    ContactStore, LoadReport, LoadStatus, SaveOptions, StoreError, StoreResult, UndoOutcome,
};
pub use transfer::{ImportReport, TransferError, TransferResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
