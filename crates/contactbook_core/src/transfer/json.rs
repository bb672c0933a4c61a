use super::{TransferError, TransferResult};
use crate::model::contact::Contact;
use std::path::Path;

/// Writes contacts as a pretty-printed JSON array.
pub fn write_json_contacts(path: &Path, contacts: &[Contact]) -> TransferResult<()> {
    let mut text = serde_json::to_string_pretty(contacts)?;
    text.push('\n');
    std::fs::write(path, text).map_err(|err| TransferError::io(path, err))
}

/// Reads a JSON array previously written by [`write_json_contacts`].
pub fn read_json_contacts(path: &Path) -> TransferResult<Vec<Contact>> {
    let bytes = std::fs::read(path).map_err(|err| TransferError::io(path, err))?;
    Ok(serde_json::from_slice(&bytes)?)
}
