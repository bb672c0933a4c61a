//! Contact use-case service.
//!
//! # Responsibility
//! - Orchestrate load → mutate → save for every contact use-case.
//! - Route user input through the field normalizer and duplicate resolver.
//! - Report failures through the store's error log.
//!
//! # Invariants
//! - The service keeps no record state between calls; each call reloads.
//! - No two records share a case-insensitive name after any write.
//! - Validation warnings never block a write.
//! - Mutations refuse to run over a store that exists but cannot be read, so
//!   an unreadable file is never overwritten by a partial record set.
//! - Interactive decisions (merge offers, batch merge confirmation) are
//!   caller-supplied callbacks.

use crate::dedupe::{
    auto_merge, auto_merge_candidates, find_near_duplicate, merge_into_existing, AutoMergeReport,
    MergeCandidate, NearDuplicate,
};
use crate::model::contact::{parse_tags, Contact, ContactError};
use crate::normalize::{field_warnings, normalize_phone, ValidationWarning};
use crate::store::{ContactStore, LoadReport, LoadStatus, SaveOptions, StoreError, UndoOutcome};
use crate::transfer::{
    read_import_csv, read_json_contacts, write_json_contacts, write_vcard, ImportReport,
    TransferError,
};
use log::{info, warn};
use regex::RegexBuilder;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Service error for contact use-cases.
#[derive(Debug)]
pub enum ContactServiceError {
    /// Contact name is blank.
    InvalidName(ContactError),
    /// No contact matches the requested name.
    ContactNotFound(String),
    /// A contact with this name already exists.
    DuplicateName(String),
    /// The store file exists but could not be read; writing would lose it.
    StoreUnreadable(String),
    /// `/regex/` search pattern does not compile.
    InvalidPattern { pattern: String, message: String },
    /// Import or export adapter failure.
    Transfer(TransferError),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(err) => write!(f, "{err}"),
            Self::ContactNotFound(name) => write!(f, "contact not found: {name}"),
            Self::DuplicateName(name) => write!(f, "contact already exists: {name}"),
            Self::StoreUnreadable(reason) => {
                write!(f, "store could not be read, refusing to overwrite it: {reason}")
            }
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid search pattern `{pattern}`: {message}")
            }
            Self::Transfer(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidName(err) => Some(err),
            Self::Transfer(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ContactServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateName(name) => Self::DuplicateName(name),
            other => Self::Store(other),
        }
    }
}

impl From<TransferError> for ContactServiceError {
    fn from(value: TransferError) -> Self {
        Self::Transfer(value)
    }
}

impl From<ContactError> for ContactServiceError {
    fn from(value: ContactError) -> Self {
        Self::InvalidName(value)
    }
}

pub type ServiceResult<T> = Result<T, ContactServiceError>;

/// Raw user input for a new contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Comma-separated tags.
    pub tags: String,
    pub favorite: bool,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` or blank values keep the current field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Comma-separated tags replacing the current set.
    pub tags: Option<String>,
    pub favorite: Option<bool>,
}

/// Caller answer to a near-duplicate offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    Merge,
    AddNew,
}

/// Result of adding a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added {
        name: String,
        warnings: Vec<ValidationWarning>,
    },
    Merged {
        into: String,
        warnings: Vec<ValidationWarning>,
    },
}

impl AddOutcome {
    pub fn warnings(&self) -> &[ValidationWarning] {
        match self {
            Self::Added { warnings, .. } | Self::Merged { warnings, .. } => warnings,
        }
    }
}

/// Result of updating a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub contact: Contact,
    pub warnings: Vec<ValidationWarning>,
}

/// Transient display ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Case-insensitive by name.
    #[default]
    Name,
    /// Favorites first, otherwise in store order.
    Favorite,
}

/// Case-insensitive exact lookup by name.
pub fn find_by_name<'a>(name: &str, contacts: &'a [Contact]) -> Option<&'a Contact> {
    contacts.iter().find(|contact| contact.has_name(name))
}

/// Contact service facade over a store implementation.
pub struct ContactService<S: ContactStore> {
    store: S,
}

impl<S: ContactStore> ContactService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All contacts in store order.
    pub fn load(&self) -> Vec<Contact> {
        self.store.load()
    }

    /// All contacts plus whether the store read was degraded.
    pub fn load_report(&self) -> LoadReport {
        self.store.load_report()
    }

    /// Gets one contact by case-insensitive name.
    pub fn get_contact(&self, name: &str) -> Option<Contact> {
        find_by_name(name, &self.store.load()).cloned()
    }

    /// Closest existing contact for `name`, if any scores high enough.
    pub fn check_near_duplicate(&self, name: &str) -> Option<NearDuplicate> {
        find_near_duplicate(name.trim(), &self.store.load())
    }

    /// Adds a contact, offering a merge when a near-duplicate exists.
    ///
    /// `decide` is called at most once, with the normalized candidate and the
    /// closest match. On `Merge`, phone/email fill empty fields of the match
    /// and tags are unioned.
    pub fn add_contact<F>(&self, draft: ContactDraft, decide: F) -> ServiceResult<AddOutcome>
    where
        F: FnOnce(&Contact, &NearDuplicate) -> MergeDecision,
    {
        let warnings = field_warnings(&draft.phone, &draft.email);
        let candidate = Contact::new(draft.name)?
            .with_phone(normalize_phone(&draft.phone))
            .with_email(draft.email.trim())
            .with_tags(&draft.tags)
            .with_favorite(draft.favorite);
        if !warnings.is_empty() {
            warn!(
                "event=contact_add module=service status=warn warnings={}",
                warnings.len()
            );
        }

        let mut contacts = self.load_for_write()?;
        if let Some(near) = find_near_duplicate(&candidate.name, &contacts) {
            if decide(&candidate, &near) == MergeDecision::Merge {
                merge_into_existing(&mut contacts[near.index], &candidate);
                self.store.save(&contacts, SaveOptions::default())?;
                info!("event=contact_add module=service status=ok mode=merged");
                return Ok(AddOutcome::Merged {
                    into: near.name,
                    warnings,
                });
            }
        }

        if find_by_name(&candidate.name, &contacts).is_some() {
            return Err(ContactServiceError::DuplicateName(candidate.name));
        }
        let name = candidate.name.clone();
        contacts.push(candidate);
        self.store.save(&contacts, SaveOptions::default())?;
        info!("event=contact_add module=service status=ok mode=added");
        Ok(AddOutcome::Added { name, warnings })
    }

    /// Applies non-blank patch fields to the named contact.
    pub fn update_contact(&self, name: &str, patch: ContactPatch) -> ServiceResult<UpdateOutcome> {
        let mut contacts = self.load_for_write()?;
        let target = contacts
            .iter_mut()
            .find(|contact| contact.has_name(name))
            .ok_or_else(|| ContactServiceError::ContactNotFound(name.trim().to_string()))?;

        let phone = non_blank(patch.phone);
        let email = non_blank(patch.email);
        let warnings = field_warnings(
            phone.as_deref().unwrap_or_default(),
            email.as_deref().unwrap_or_default(),
        );
        if let Some(phone) = phone {
            target.phone = normalize_phone(&phone);
        }
        if let Some(email) = email {
            target.email = email;
        }
        if let Some(tags) = non_blank(patch.tags) {
            target.tags = parse_tags(&tags);
        }
        if let Some(favorite) = patch.favorite {
            target.favorite = favorite;
        }
        let updated = target.clone();

        self.store.save(&contacts, SaveOptions::default())?;
        info!("event=contact_update module=service status=ok");
        Ok(UpdateOutcome {
            contact: updated,
            warnings,
        })
    }

    /// Deletes the named contact. Returns `false` when nothing matched.
    pub fn delete_contact(&self, name: &str) -> ServiceResult<bool> {
        let mut contacts = self.load_for_write()?;
        let before = contacts.len();
        contacts.retain(|contact| !contact.has_name(name));
        if contacts.len() == before {
            return Ok(false);
        }
        self.store.save(&contacts, SaveOptions::default())?;
        info!("event=contact_delete module=service status=ok");
        Ok(true)
    }

    /// Searches `name phone email tags`.
    ///
    /// `/pattern/` is a case-insensitive regex; anything else is a
    /// case-insensitive substring. Blank queries match nothing.
    pub fn search(&self, query: &str) -> ServiceResult<Vec<Contact>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let contacts = self.store.load();

        if query.len() >= 2 && query.starts_with('/') && query.ends_with('/') {
            let pattern = &query[1..query.len() - 1];
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|err| ContactServiceError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: err.to_string(),
                })?;
            return Ok(contacts
                .into_iter()
                .filter(|contact| regex.is_match(&contact.search_blob()))
                .collect());
        }

        let needle = query.to_lowercase();
        Ok(contacts
            .into_iter()
            .filter(|contact| contact.search_blob().to_lowercase().contains(&needle))
            .collect())
    }

    /// Contacts ordered for display. The stored order is unchanged.
    pub fn list_sorted(&self, key: SortKey) -> Vec<Contact> {
        let mut contacts = self.store.load();
        match key {
            SortKey::Name => contacts.sort_by_key(|contact| contact.name.to_lowercase()),
            SortKey::Favorite => contacts.sort_by_key(|contact| !contact.favorite),
        }
        contacts
    }

    /// Pairs the batch merge would propose, without changing anything.
    pub fn merge_candidates(&self) -> Vec<(Contact, Contact, f64)> {
        let contacts = self.store.load();
        auto_merge_candidates(&contacts)
            .into_iter()
            .map(|MergeCandidate { first, second, score }| {
                (contacts[first].clone(), contacts[second].clone(), score)
            })
            .collect()
    }

    /// Batch-merges confirmed near-identical pairs and persists when any
    /// record was removed.
    pub fn auto_merge<F>(&self, confirm: F) -> ServiceResult<AutoMergeReport>
    where
        F: FnMut(&Contact, &Contact) -> bool,
    {
        let mut contacts = self.load_for_write()?;
        let report = auto_merge(&mut contacts, confirm);
        if report.removed_count() > 0 {
            self.store.save(&contacts, SaveOptions::default())?;
        }
        info!(
            "event=contact_auto_merge module=service status=ok removed={}",
            report.removed_count()
        );
        Ok(report)
    }

    /// Appends rows from an external CSV file.
    ///
    /// The store is untouched when the file cannot be read or parsed. Rows
    /// whose name already exists (in the store or earlier in the file) are
    /// skipped.
    pub fn import_csv(&self, path: &Path) -> ServiceResult<ImportReport> {
        let parsed =
            read_import_csv(path).map_err(|err| self.transfer_failed("import_csv", err))?;

        let mut contacts = self.load_for_write()?;
        let mut known: HashSet<String> = contacts.iter().map(|c| c.name.to_lowercase()).collect();
        let mut report = ImportReport {
            skipped_blank: parsed.skipped_blank,
            ..ImportReport::default()
        };
        for contact in parsed.contacts {
            if known.insert(contact.name.to_lowercase()) {
                contacts.push(contact);
                report.imported += 1;
            } else {
                report.skipped_duplicate += 1;
            }
        }

        if report.imported > 0 {
            self.store.save(&contacts, SaveOptions::default())?;
        }
        info!(
            "event=contact_import_csv module=service status=ok imported={} skipped_blank={} skipped_duplicate={}",
            report.imported, report.skipped_blank, report.skipped_duplicate
        );
        Ok(report)
    }

    /// Writes every contact to `path` as pretty-printed JSON.
    pub fn export_json(&self, path: &Path) -> ServiceResult<usize> {
        let contacts = self.store.load();
        write_json_contacts(path, &contacts)
            .map_err(|err| self.transfer_failed("export_json", err))?;
        info!(
            "event=contact_export_json module=service status=ok records={}",
            contacts.len()
        );
        Ok(contacts.len())
    }

    /// Replaces the whole store with a JSON export via a normal save.
    pub fn import_json_snapshot(&self, path: &Path) -> ServiceResult<usize> {
        let contacts =
            read_json_contacts(path).map_err(|err| self.transfer_failed("import_json", err))?;
        self.store.save(&contacts, SaveOptions::default())?;
        info!(
            "event=contact_import_json module=service status=ok records={}",
            contacts.len()
        );
        Ok(contacts.len())
    }

    /// Writes the named contact's vCard into `dir`.
    pub fn export_vcard(&self, name: &str, dir: &Path) -> ServiceResult<PathBuf> {
        let contacts = self.store.load();
        let contact = find_by_name(name, &contacts)
            .ok_or_else(|| ContactServiceError::ContactNotFound(name.trim().to_string()))?;
        write_vcard(dir, contact).map_err(|err| self.transfer_failed("export_vcard", err))
    }

    /// Restores the previous store state from the undo slot.
    pub fn undo(&self) -> ServiceResult<UndoOutcome> {
        Ok(self.store.undo()?)
    }

    pub fn manual_backup(&self) -> ServiceResult<PathBuf> {
        Ok(self.store.manual_backup()?)
    }

    pub fn list_backups(&self) -> ServiceResult<Vec<String>> {
        Ok(self.store.list_backups()?)
    }

    pub fn restore(&self, backup_name: &str) -> ServiceResult<()> {
        Ok(self.store.restore(backup_name)?)
    }

    fn load_for_write(&self) -> ServiceResult<Vec<Contact>> {
        let report = self.store.load_report();
        match report.status {
            LoadStatus::Degraded(reason) => {
                warn!("event=contact_write module=service status=error error_code=store_unreadable");
                Err(ContactServiceError::StoreUnreadable(reason))
            }
            LoadStatus::Loaded | LoadStatus::Missing => Ok(report.contacts),
        }
    }

    fn transfer_failed(&self, operation: &str, err: TransferError) -> ContactServiceError {
        warn!("event={operation} module=service status=error error={err}");
        self.store.error_log().record(operation, &err.to_string());
        ContactServiceError::Transfer(err)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{find_by_name, non_blank};
    use crate::model::contact::Contact;

    #[test]
    fn find_by_name_is_case_insensitive_exact() {
        let contacts = vec![
            Contact::new("Ada Lovelace").unwrap(),
            Contact::new("Alan Turing").unwrap(),
        ];
        assert_eq!(
            find_by_name("alan turing", &contacts).map(|c| c.name.as_str()),
            Some("Alan Turing")
        );
        assert!(find_by_name("alan", &contacts).is_none());
    }

    #[test]
    fn non_blank_treats_whitespace_as_absent() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
