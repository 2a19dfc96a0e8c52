use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::AssetManagerId;

/// An aggregated holding reported by the remote transaction store, one per
/// (book, asset) pair. This is the export row shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub asset_manager_id: AssetManagerId,
    pub book_id: String,
    pub asset_id: String,
    pub quantity: Decimal
}
