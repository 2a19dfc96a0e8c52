use std::collections::HashMap;

use crate::models::{Company, Individual, PartyRecord};
use crate::types::AssetManagerId;

use super::{RawRow, non_empty, optional, snake_keys};

/// Builds a party record from a raw row, or nothing when the row has no
/// identifier or an unrecognized `party_type` tag. The tag match is exact
/// and case-sensitive.
pub(super) fn map_party(asset_manager_id: AssetManagerId, row: &RawRow) -> Option<PartyRecord> {
    let fields = snake_keys(row);
    let party_id = non_empty(&fields, "party_id")?.to_string();

    match fields.get("party_type").map(String::as_str) {
        Some("Individual") => Some(PartyRecord::Individual(Individual {
            asset_manager_id,
            party_id,
            surname: optional(&fields, "surname"),
            given_names: optional(&fields, "given_names")
        })),
        Some("Fund") => Some(PartyRecord::Fund(company(asset_manager_id, party_id, &fields))),
        Some("Broker") => Some(PartyRecord::Broker(company(asset_manager_id, party_id, &fields))),
        _ => None
    }
}

fn company(
    asset_manager_id: AssetManagerId,
    party_id: String,
    fields: &HashMap<String, String>
) -> Company {
    Company {
        asset_manager_id,
        party_id,
        display_name: optional(fields, "display_name"),
        legal_name: optional(fields, "legal_name"),
        description: optional(fields, "description"),
        base_currency: optional(fields, "base_currency")
    }
}
