
use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;
use thiserror::Error;
use tracing::info;

use crate::storage::{ObjectStore, PositionSource, StoreError};
use crate::types::AssetManagerId;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Remote store call failed: {0}")]
    Store(#[from] StoreError),
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error)
}

/// Writes an asset manager's positions to a CSV file in the output bucket.
pub struct PositionExporter {
    positions: Arc<dyn PositionSource>,
    object_store: Arc<dyn ObjectStore>,
    output_bucket: String
}

impl PositionExporter {
    pub fn new(
        positions: Arc<dyn PositionSource>,
        object_store: Arc<dyn ObjectStore>,
        output_bucket: impl Into<String>
    ) -> Self {
        Self {
            positions,
            object_store,
            output_bucket: output_bucket.into()
        }
    }

    /// Fetches, sorts and uploads the positions, returning the object key
    /// written to the output bucket. The scratch directory holding the
    /// intermediate file is removed on every exit path.
    pub async fn run(&self, asset_manager_id: AssetManagerId) -> Result<String, ExportError> {
        let mut positions = self.positions.positions_by_asset_manager(asset_manager_id).await?;
        positions.sort_by(|a, b| (&a.book_id, &a.asset_id).cmp(&(&b.book_id, &b.asset_id)));

        let scratch = tempdir()?;
        let filename = format!("positions_{}.csv", Utc::now().timestamp());
        let filepath = scratch.path().join(&filename);

        let mut writer = csv::Writer::from_path(&filepath)?;
        for position in &positions {
            writer.serialize(position)?;
        }
        writer.flush()?;

        info!(
            "Uploading {} positions for asset manager [{asset_manager_id}] as {filename}",
            positions.len()
        );
        self.object_store.upload(&filepath, &self.output_bucket, &filename).await?;

        Ok(filename)
    }
}
