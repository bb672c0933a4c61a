use super::{TransferError, TransferResult};
use crate::model::contact::{parse_tags, Contact};
use crate::normalize::normalize_phone;
use std::io::Read;
use std::path::Path;

const FAVORITE_IMPORT_TOKENS: [&str; 3] = ["1", "true", "y"];

/// Rows mapped from an external table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImport {
    /// Rows with a non-empty name, in file order.
    pub contacts: Vec<Contact>,
    /// Rows whose name column was blank.
    pub skipped_blank: usize,
}

/// Reads an external CSV file. See [`parse_import_table`].
pub fn read_import_csv(path: &Path) -> TransferResult<ParsedImport> {
    let file = std::fs::File::open(path).map_err(|err| TransferError::io(path, err))?;
    parse_import_table(file)
}

/// Maps an external table with at least a `name` column into contacts.
///
/// Phones are normalized; `favorite` accepts `1|true|y` (case-insensitive);
/// absent columns read as empty. Any decoding error fails the whole table.
pub fn parse_import_table(reader: impl Read) -> TransferResult<ParsedImport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let column = |field: &str| headers.iter().position(|header| header.trim() == field);
    let name_column = column("name").ok_or(TransferError::MissingNameColumn)?;
    let phone_column = column("phone");
    let email_column = column("email");
    let tags_column = column("tags");
    let favorite_column = column("favorite");

    let mut parsed = ParsedImport::default();
    for row in csv_reader.records() {
        let row = row?;
        let field = |index: Option<usize>| index.and_then(|i| row.get(i)).unwrap_or("");

        let Ok(contact) = Contact::new(field(Some(name_column))) else {
            parsed.skipped_blank += 1;
            continue;
        };
        let favorite = field(favorite_column).trim().to_lowercase();
        parsed.contacts.push(Contact {
            phone: normalize_phone(field(phone_column)),
            email: field(email_column).trim().to_string(),
            tags: parse_tags(field(tags_column)),
            favorite: FAVORITE_IMPORT_TOKENS.contains(&favorite.as_str()),
            ..contact
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::parse_import_table;
    use crate::transfer::TransferError;

    #[test]
    fn maps_columns_and_normalizes_phone() {
        let table = "favorite,name,phone,tags,extra\nY,Ada Lovelace,+44 (20) 7946-0000,\"math, poetry\",x\n";
        let parsed = parse_import_table(table.as_bytes()).unwrap();

        assert_eq!(parsed.contacts.len(), 1);
        let ada = &parsed.contacts[0];
        assert_eq!(ada.name, "Ada Lovelace");
        assert_eq!(ada.phone, "+442079460000");
        assert_eq!(ada.email, "");
        assert_eq!(ada.tags, vec!["math", "poetry"]);
        assert!(ada.favorite);
    }

    #[test]
    fn yes_is_not_a_favorite_token_on_import() {
        let table = "name,favorite\nA,yes\nB,true\nC,1\nD,0\n";
        let parsed = parse_import_table(table.as_bytes()).unwrap();
        let favorites: Vec<bool> = parsed.contacts.iter().map(|c| c.favorite).collect();
        assert_eq!(favorites, vec![false, true, true, false]);
    }

    #[test]
    fn blank_names_are_counted_and_skipped() {
        let table = "name,phone\n,5551234567\n  ,1\nBob,\n";
        let parsed = parse_import_table(table.as_bytes()).unwrap();
        assert_eq!(parsed.contacts.len(), 1);
        assert_eq!(parsed.skipped_blank, 2);
    }

    #[test]
    fn missing_name_column_fails() {
        let err = parse_import_table("phone,email\n1,a@b.co\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TransferError::MissingNameColumn));
    }
}
