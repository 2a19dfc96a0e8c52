mod book;
mod case;
mod errors;
mod party;
mod transaction;

use std::collections::HashMap;

use crate::models::{AssetRecord, BookRecord, ImportType, PartyRecord, TransactionRecord};
use crate::types::AssetManagerId;

pub use case::to_snake_case;
pub use errors::MappingError;

/// A CSV data row zipped with its header, exactly as read from the file.
pub type RawRow = HashMap<String, String>;

/// The structured outcome of mapping one raw row.
#[derive(Debug, Clone)]
pub enum MappedRecord {
    Party(PartyRecord),
    Book(BookRecord),
    /// FX rows carry a companion asset that must exist before the
    /// transaction can reference it.
    Transaction {
        transaction: TransactionRecord,
        asset: Option<AssetRecord>
    }
}

/// Maps a raw row into the record shape of the given import type.
///
/// `Ok(None)` means the row carries nothing importable (missing identifier,
/// unknown party variant, missing asset type) and is skipped without a
/// remote write. Malformed values in columns the target shape requires are
/// errors, fatal for the invocation.
pub fn map_row(
    import_type: ImportType,
    asset_manager_id: AssetManagerId,
    row: &RawRow
) -> Result<Option<MappedRecord>, MappingError> {
    match import_type {
        ImportType::Parties => Ok(party::map_party(asset_manager_id, row).map(MappedRecord::Party)),
        ImportType::Books => Ok(book::map_book(asset_manager_id, row).map(MappedRecord::Book)),
        ImportType::Transactions => transaction::map_transaction(asset_manager_id, row)
    }
}

/// Normalizes every key of a raw row from external casing to snake form.
fn snake_keys(row: &RawRow) -> HashMap<String, String> {
    row.iter()
        .map(|(key, value)| (to_snake_case(key), value.clone()))
        .collect()
}

fn non_empty<'a>(fields: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    fields.get(key).map(String::as_str).filter(|value| !value.is_empty())
}

fn optional(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    non_empty(fields, key).map(str::to_string)
}

fn require(fields: &HashMap<String, String>, field: &str) -> Result<String, MappingError> {
    non_empty(fields, field)
        .map(str::to_string)
        .ok_or_else(|| MappingError::MissingField { field: field.to_string() })
}
