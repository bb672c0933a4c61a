use super::{TransferError, TransferResult};
use crate::model::contact::Contact;
use std::path::{Path, PathBuf};

/// Renders the fixed vCard 3.0 layout; `TEL`/`EMAIL` only when set.
pub fn render_vcard(contact: &Contact) -> String {
    let mut card = String::from("BEGIN:VCARD\nVERSION:3.0\n");
    card.push_str(&format!("N:{}\n", contact.name));
    if !contact.phone.is_empty() {
        card.push_str(&format!("TEL:{}\n", contact.phone));
    }
    if !contact.email.is_empty() {
        card.push_str(&format!("EMAIL:{}\n", contact.email));
    }
    card.push_str("END:VCARD\n");
    card
}

/// `<name>.vcf` with spaces and path separators replaced by `_`.
pub fn vcard_file_name(name: &str) -> String {
    format!("{}.vcf", name.replace([' ', '/', '\\'], "_"))
}

/// Writes one contact card into `dir` and returns its path.
pub fn write_vcard(dir: &Path, contact: &Contact) -> TransferResult<PathBuf> {
    let path = dir.join(vcard_file_name(&contact.name));
    std::fs::write(&path, render_vcard(contact)).map_err(|err| TransferError::Io {
        path: path.clone(),
        source: err,
    })?;
    Ok(path)
}
