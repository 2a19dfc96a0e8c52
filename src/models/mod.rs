mod asset;
mod book;
mod job;
mod party;
mod position;
mod transaction;

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::types::AssetManagerId;

pub use asset::{AssetRecord, FxAssetKind, Reference};
pub use book::BookRecord;
pub use job::ImportJob;
pub use party::{Company, Individual, PartyRecord};
pub use position::Position;
pub use transaction::{Charge, CounterpartyRef, Rate, TransactionRecord};

/// Identity a record presents to the remote store for existence lookups.
pub trait Record {
    fn asset_manager_id(&self) -> AssetManagerId;
    /// The externally meaningful identifier, as opposed to any surrogate key
    /// the remote store may assign.
    fn natural_key(&self) -> &str;
}

/// The entity family an import job targets.
///
/// The wire name doubles as the filename prefix an input file must carry
/// to be picked up by extraction.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    Parties,
    Books,
    Transactions
}

impl ImportType {
    pub fn prefix(&self) -> &'static str {
        match self {
            ImportType::Parties => "parties",
            ImportType::Books => "books",
            ImportType::Transactions => "transactions"
        }
    }
}

impl Display for ImportType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.prefix())
    }
}
