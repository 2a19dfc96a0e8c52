use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::types::AssetManagerId;

/// The FX instrument families that require a synthesized asset record
/// before their transaction can be stored.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum FxAssetKind {
    Spot,
    Forward
}

impl FxAssetKind {
    /// Resolves the `asset_type` column value; anything outside the FX
    /// families needs no derived asset.
    pub fn from_asset_type(asset_type: &str) -> Option<Self> {
        match asset_type {
            "ForeignExchangeSpot" => Some(FxAssetKind::Spot),
            "ForeignExchangeForward" => Some(FxAssetKind::Forward),
            _ => None
        }
    }

    /// Three-letter prefix of the derived asset identifier.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            FxAssetKind::Spot => "SPT",
            FxAssetKind::Forward => "FWD"
        }
    }
}

/// A named cross-reference carried by an asset record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub reference_value: String,
    pub reference_primary: bool
}

/// An FX asset synthesized from a transaction row.
///
/// Its identifier is `{SPT|FWD}{underlying}{settlement date as YYYYMMDD}`,
/// so repeated imports of the same trade resolve to the same asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub asset_manager_id: AssetManagerId,
    pub asset_id: String,
    pub kind: FxAssetKind,
    pub underlying: String,
    pub settlement_date: NaiveDate,
    pub currency: String,
    /// Forwards only.
    pub fixing_date: Option<NaiveDate>,
    /// Forwards only, taken from the row's price.
    pub forward_rate: Option<Decimal>,
    pub references: HashMap<String, Reference>
}

impl Record for AssetRecord {
    fn asset_manager_id(&self) -> AssetManagerId {
        self.asset_manager_id
    }

    fn natural_key(&self) -> &str {
        &self.asset_id
    }
}
