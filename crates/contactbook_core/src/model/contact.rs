//! Contact record.
//!
//! # Invariants
//! - `name` is trimmed and non-empty.
//! - `phone` is expected in normalized form (see `normalize::normalize_phone`);
//!   the model does not re-normalize on its own.
//! - On the wire (`serde`), `tags` is a comma-joined string and `favorite` a
//!   boolean. Deserialization also accepts `tags` as a string array and
//!   rejects empty names.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation error for contact construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    EmptyName,
}

impl Display for ContactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "contact name cannot be empty"),
        }
    }
}

impl Error for ContactError {}

/// One address-book entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContactWire", into = "ContactWire")]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub tags: Vec<String>,
    pub favorite: bool,
}

impl Contact {
    /// Creates a contact with only a name set.
    pub fn new(name: impl Into<String>) -> Result<Self, ContactError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ContactError::EmptyName);
        }
        Ok(Self {
            name,
            phone: String::new(),
            email: String::new(),
            tags: Vec::new(),
            favorite: false,
        })
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = parse_tags(tags);
        self
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    /// Case-insensitive name comparison used for key lookups.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Tags in their on-disk comma-joined form.
    pub fn tags_joined(&self) -> String {
        join_tags(&self.tags)
    }

    /// `name phone email tags` blob used by free-text search.
    pub fn search_blob(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name,
            self.phone,
            self.email,
            self.tags_joined()
        )
    }
}

/// Splits a comma-joined tag string, trimming entries and dropping empties.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins tags back into their on-disk form.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContactWire {
    name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    tags: TagsWire,
    #[serde(default)]
    favorite: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum TagsWire {
    Joined(String),
    List(Vec<String>),
}

impl Default for TagsWire {
    fn default() -> Self {
        Self::Joined(String::new())
    }
}

impl TryFrom<ContactWire> for Contact {
    type Error = ContactError;

    fn try_from(wire: ContactWire) -> Result<Self, Self::Error> {
        let tags = match wire.tags {
            TagsWire::Joined(raw) => parse_tags(&raw),
            TagsWire::List(items) => items
                .iter()
                .flat_map(|item| parse_tags(item))
                .collect(),
        };
        let mut contact = Contact::new(wire.name)?;
        contact.phone = wire.phone.trim().to_string();
        contact.email = wire.email.trim().to_string();
        contact.tags = tags;
        contact.favorite = wire.favorite;
        Ok(contact)
    }
}

impl From<Contact> for ContactWire {
    fn from(contact: Contact) -> Self {
        Self {
            tags: TagsWire::Joined(join_tags(&contact.tags)),
            name: contact.name,
            phone: contact.phone,
            email: contact.email,
            favorite: contact.favorite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{join_tags, parse_tags, Contact, ContactError};

    #[test]
    fn new_trims_and_rejects_blank_names() {
        assert_eq!(Contact::new("  Ada  ").unwrap().name, "Ada");
        assert_eq!(Contact::new("   ").unwrap_err(), ContactError::EmptyName);
    }

    #[test]
    fn parse_tags_drops_blank_entries() {
        assert_eq!(parse_tags(" work, ,friend,"), vec!["work", "friend"]);
        assert!(parse_tags("").is_empty());
        assert_eq!(join_tags(&parse_tags("a, b")), "a,b");
    }

    #[test]
    fn has_name_ignores_case() {
        let contact = Contact::new("Jon Smith").unwrap();
        assert!(contact.has_name("jon smith"));
        assert!(!contact.has_name("john smith"));
    }
}
