use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::types::AssetManagerId;

/// An accounting grouping entity for transactions.
///
/// `party_id` and `owner_id` arrive in source files under the legacy
/// column names `owning_party` and `trading_owner`; the mapper renames
/// them before construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookRecord {
    pub asset_manager_id: AssetManagerId,
    pub book_id: String,
    pub party_id: Option<String>,
    pub owner_id: Option<String>,
    pub book_type: Option<String>,
    pub base_currency: Option<String>,
    pub description: Option<String>
}

impl Record for BookRecord {
    fn asset_manager_id(&self) -> AssetManagerId {
        self.asset_manager_id
    }

    fn natural_key(&self) -> &str {
        &self.book_id
    }
}
