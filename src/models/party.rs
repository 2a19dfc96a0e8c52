use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::types::AssetManagerId;

/// A natural-person counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    pub asset_manager_id: AssetManagerId,
    pub party_id: String,
    pub surname: Option<String>,
    pub given_names: Option<String>
}

/// Shared shape of the organisational party variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub asset_manager_id: AssetManagerId,
    pub party_id: String,
    pub display_name: Option<String>,
    pub legal_name: Option<String>,
    pub description: Option<String>,
    pub base_currency: Option<String>
}

/// A counterparty record, tagged by the `party_type` column of the source
/// row. Rows carrying a tag outside this set are skipped by the mapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "party_type")]
pub enum PartyRecord {
    Individual(Individual),
    Fund(Company),
    Broker(Company)
}

impl Record for PartyRecord {
    fn asset_manager_id(&self) -> AssetManagerId {
        match self {
            PartyRecord::Individual(individual) => individual.asset_manager_id,
            PartyRecord::Fund(company) | PartyRecord::Broker(company) => company.asset_manager_id
        }
    }

    fn natural_key(&self) -> &str {
        match self {
            PartyRecord::Individual(individual) => &individual.party_id,
            PartyRecord::Fund(company) | PartyRecord::Broker(company) => &company.party_id
        }
    }
}
