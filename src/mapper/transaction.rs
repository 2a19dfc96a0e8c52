use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    AssetRecord, Charge, CounterpartyRef, FxAssetKind, Rate, Reference, TransactionRecord
};
use crate::types::AssetManagerId;

use super::errors::MappingError;
use super::{MappedRecord, RawRow, non_empty, optional, require, snake_keys};

const PARTIES_PREFIX: &str = "Parties.";
const CHARGES_PREFIX: &str = "Charges.";
const RATES_PREFIX: &str = "Rates.";
const CCY_PAIR_REFERENCE: &str = "CCY Pair";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Builds a transaction record, and for FX instruments its companion
/// asset, from a raw row. Rows without an `asset_type` are skipped.
///
/// Prefixed column groups are pulled out of the row before key
/// normalization, since their suffixes (charge type, rate type, role name)
/// keep their external casing as sub-collection keys.
pub(super) fn map_transaction(
    asset_manager_id: AssetManagerId,
    row: &RawRow
) -> Result<Option<MappedRecord>, MappingError> {
    let mut raw = row.clone();
    let party_roles = take_group(&mut raw, PARTIES_PREFIX);
    let charge_values = take_group(&mut raw, CHARGES_PREFIX);
    let rate_values = take_group(&mut raw, RATES_PREFIX);
    let fields = snake_keys(&raw);

    let Some(asset_type) = non_empty(&fields, "asset_type") else {
        return Ok(None);
    };

    let transaction_id = require(&fields, "transaction_id")?;
    let asset_id = require(&fields, "asset_id")?;
    let transaction_currency = require(&fields, "transaction_currency")?;
    let settlement_date = parse_date("settlement_date", &require(&fields, "settlement_date")?)?;

    let asset = FxAssetKind::from_asset_type(asset_type)
        .map(|kind| {
            derive_fx_asset(
                kind,
                asset_manager_id,
                &asset_id,
                settlement_date,
                &transaction_currency,
                &fields
            )
        })
        .transpose()?;

    let charges = charge_values
        .into_iter()
        .map(|(charge_type, value)| {
            let charge_value = parse_decimal(&format!("{CHARGES_PREFIX}{charge_type}"), &value)?;
            let charge = Charge {
                charge_value,
                currency: transaction_currency.clone()
            };
            Ok((charge_type, charge))
        })
        .collect::<Result<HashMap<_, _>, MappingError>>()?;

    let rates = rate_values
        .into_iter()
        .map(|(rate_type, value)| {
            let rate_value = parse_decimal(&format!("{RATES_PREFIX}{rate_type}"), &value)?;
            Ok((rate_type, Rate { rate_value }))
        })
        .collect::<Result<HashMap<_, _>, MappingError>>()?;

    let parties = party_roles
        .into_iter()
        .map(|(role, party_id)| (role, CounterpartyRef { party_id }))
        .collect();

    let transaction = TransactionRecord {
        asset_manager_id,
        transaction_id,
        asset_id,
        book_id: optional(&fields, "book_id"),
        counterparty_book_id: optional(&fields, "counterparty_book_id"),
        transaction_action: optional(&fields, "transaction_action"),
        transaction_date: parse_optional_date(&fields, "transaction_date")?,
        settlement_date,
        transaction_currency,
        quantity: parse_optional_decimal(&fields, "quantity")?,
        price: parse_optional_decimal(&fields, "price")?,
        charges,
        rates,
        parties
    };

    Ok(Some(MappedRecord::Transaction { transaction, asset }))
}

/// Removes every column carrying the given literal prefix from the row and
/// returns the suffix-keyed values. Columns with empty values are dropped,
/// not grouped.
fn take_group(raw: &mut RawRow, prefix: &str) -> HashMap<String, String> {
    let keys: Vec<String> = raw.keys().filter(|key| key.starts_with(prefix)).cloned().collect();
    let mut group = HashMap::new();

    for key in keys {
        if let Some(value) = raw.remove(&key) {
            if !value.is_empty() {
                group.insert(key[prefix.len()..].to_string(), value);
            }
        }
    }

    group
}

fn derive_fx_asset(
    kind: FxAssetKind,
    asset_manager_id: AssetManagerId,
    underlying: &str,
    settlement_date: NaiveDate,
    currency: &str,
    fields: &HashMap<String, String>
) -> Result<AssetRecord, MappingError> {
    let asset_id = format!(
        "{}{}{}",
        kind.id_prefix(),
        underlying,
        settlement_date.format("%Y%m%d")
    );

    let (fixing_date, forward_rate) = match kind {
        FxAssetKind::Forward => {
            let rate = parse_decimal("price", &require(fields, "price")?)?;
            (parse_optional_date(fields, "fixing_date")?, Some(rate))
        }
        FxAssetKind::Spot => (None, None)
    };

    let mut references = HashMap::new();
    references.insert(
        CCY_PAIR_REFERENCE.to_string(),
        Reference {
            reference_value: underlying.to_string(),
            reference_primary: true
        }
    );

    Ok(AssetRecord {
        asset_manager_id,
        asset_id,
        kind,
        underlying: underlying.to_string(),
        settlement_date,
        currency: currency.to_string(),
        fixing_date,
        forward_rate,
        references
    })
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, MappingError> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| MappingError::InvalidDate {
            field: field.to_string(),
            value: value.to_string()
        })
}

fn parse_optional_date(
    fields: &HashMap<String, String>,
    field: &str
) -> Result<Option<NaiveDate>, MappingError> {
    non_empty(fields, field).map(|value| parse_date(field, value)).transpose()
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, MappingError> {
    Decimal::from_str(value).map_err(|_| MappingError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string()
    })
}

fn parse_optional_decimal(
    fields: &HashMap<String, String>,
    field: &str
) -> Result<Option<Decimal>, MappingError> {
    non_empty(fields, field).map(|value| parse_decimal(field, value)).transpose()
}
