use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::models::{Position, Record, TransactionRecord};
use crate::storage::{PositionSource, RecordInterface, StoreError};
use crate::types::AssetManagerId;

/// In-process record store keyed by (asset manager, natural key).
///
/// This is the binary's default wiring and the base for test doubles; the
/// call counters let callers observe the create-vs-update split without
/// intercepting the interface.
pub struct MemoryStore<R> {
    records: DashMap<(AssetManagerId, String), R>,
    created: AtomicUsize,
    updated: AtomicUsize
}

impl<R> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            created: AtomicUsize::new(0),
            updated: AtomicUsize::new(0)
        }
    }

    /// Number of create calls accepted since construction.
    pub fn create_calls(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Number of update calls accepted since construction.
    pub fn update_calls(&self) -> usize {
        self.updated.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl<R> RecordInterface<R> for MemoryStore<R>
where
    R: Record + Clone + Send + Sync + 'static
{
    async fn search(
        &self,
        asset_manager_id: AssetManagerId,
        ids: &[String]
    ) -> Result<Vec<R>, StoreError> {
        let matches = ids
            .iter()
            .filter_map(|id| {
                self.records
                    .get(&(asset_manager_id, id.clone()))
                    .map(|entry| entry.value().clone())
            })
            .collect();

        Ok(matches)
    }

    async fn create(&self, record: R) -> Result<R, StoreError> {
        self.created.fetch_add(1, Ordering::Relaxed);
        self.records.insert(
            (record.asset_manager_id(), record.natural_key().to_string()),
            record.clone()
        );

        Ok(record)
    }

    async fn update(&self, record: R) -> Result<R, StoreError> {
        self.updated.fetch_add(1, Ordering::Relaxed);
        self.records.insert(
            (record.asset_manager_id(), record.natural_key().to_string()),
            record.clone()
        );

        Ok(record)
    }
}

#[async_trait]
impl PositionSource for MemoryStore<TransactionRecord> {
    async fn positions_by_asset_manager(
        &self,
        asset_manager_id: AssetManagerId
    ) -> Result<Vec<Position>, StoreError> {
        let mut totals: HashMap<(String, String), Decimal> = HashMap::new();

        for entry in self.records.iter() {
            let transaction = entry.value();

            if transaction.asset_manager_id != asset_manager_id {
                continue;
            }

            let Some(book_id) = &transaction.book_id else {
                continue;
            };

            let quantity = transaction.quantity.unwrap_or_default();
            *totals.entry((book_id.clone(), transaction.asset_id.clone())).or_default() += quantity;
        }

        let positions = totals
            .into_iter()
            .map(|((book_id, asset_id), quantity)| Position {
                asset_manager_id,
                book_id,
                asset_id,
                quantity
            })
            .collect();

        Ok(positions)
    }
}
