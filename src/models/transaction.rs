use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::types::AssetManagerId;

/// A fee attached to a transaction, keyed by charge type on the owning
/// record. The currency is always the transaction currency of the row the
/// charge was read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub charge_value: Decimal,
    pub currency: String
}

/// A rate attached to a transaction, keyed by rate type on the owning record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rate {
    pub rate_value: Decimal
}

/// A counterparty attached to a transaction, keyed by role name on the
/// owning record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyRef {
    pub party_id: String
}

/// A trade row destined for the remote transaction store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub asset_manager_id: AssetManagerId,
    pub transaction_id: String,
    /// The instrument traded. For FX instruments the upserter replaces this
    /// with the derived asset identifier once the companion asset exists.
    pub asset_id: String,
    pub book_id: Option<String>,
    pub counterparty_book_id: Option<String>,
    pub transaction_action: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub settlement_date: NaiveDate,
    pub transaction_currency: String,
    pub quantity: Option<Decimal>,
    pub price: Option<Decimal>,
    pub charges: HashMap<String, Charge>,
    pub rates: HashMap<String, Rate>,
    pub parties: HashMap<String, CounterpartyRef>
}

impl Record for TransactionRecord {
    fn asset_manager_id(&self) -> AssetManagerId {
        self.asset_manager_id
    }

    fn natural_key(&self) -> &str {
        &self.transaction_id
    }
}
