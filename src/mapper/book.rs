use crate::models::BookRecord;
use crate::types::AssetManagerId;

use super::{RawRow, non_empty, optional, snake_keys};

// Legacy column names still present in upstream extracts.
const LEGACY_FIELD_MAPPINGS: [(&str, &str); 2] =
    [("owning_party", "party_id"), ("trading_owner", "owner_id")];

/// Builds a book record from a raw row, or nothing when the row has no
/// identifier. Legacy ownership columns are renamed to their canonical
/// targets before construction.
pub(super) fn map_book(asset_manager_id: AssetManagerId, row: &RawRow) -> Option<BookRecord> {
    let mut fields = snake_keys(row);
    let book_id = non_empty(&fields, "book_id")?.to_string();

    for (legacy, canonical) in LEGACY_FIELD_MAPPINGS {
        if let Some(value) = fields.remove(legacy) {
            fields.insert(canonical.to_string(), value);
        }
    }

    Some(BookRecord {
        asset_manager_id,
        book_id,
        party_id: optional(&fields, "party_id"),
        owner_id: optional(&fields, "owner_id"),
        book_type: optional(&fields, "book_type"),
        base_currency: optional(&fields, "base_currency"),
        description: optional(&fields, "description")
    })
}
