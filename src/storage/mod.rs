mod errors;
mod local_object_store;
mod memory_store;

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{Position, Record};
use crate::types::AssetManagerId;

pub use errors::StoreError;
pub use local_object_store::LocalObjectStore;
pub use memory_store::MemoryStore;

/// Remote persistence for one entity family, idempotent by natural key.
///
/// `search` drives the create-vs-update decision; `update` replaces the
/// stored record wholesale, there is no field-level merge.
#[async_trait]
pub trait RecordInterface<R>: Send + Sync
where
    R: Record + Send + Sync + 'static
{
    async fn search(
        &self,
        asset_manager_id: AssetManagerId,
        ids: &[String]
    ) -> Result<Vec<R>, StoreError>;

    async fn create(&self, record: R) -> Result<R, StoreError>;

    async fn update(&self, record: R) -> Result<R, StoreError>;
}

/// Bucket-addressed file transfer in and out of the invocation's scratch
/// directory.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn download(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path
    ) -> Result<(), StoreError>;

    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), StoreError>;
}

/// Aggregated holdings reported by the remote transaction store.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn positions_by_asset_manager(
        &self,
        asset_manager_id: AssetManagerId
    ) -> Result<Vec<Position>, StoreError>;
}

/// Starts a downstream workflow execution and returns its handle.
#[async_trait]
pub trait WorkflowTrigger: Send + Sync {
    async fn start(&self, workflow_id: &str, input: Value) -> Result<String, StoreError>;
}
