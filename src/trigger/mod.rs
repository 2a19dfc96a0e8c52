
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::storage::{StoreError, WorkflowTrigger};
use crate::types::AssetManagerId;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Upload notification carries no records")]
    EmptyEvent,
    #[error("Workflow start failed: {0}")]
    Store(#[from] StoreError)
}

/// File-arrival notification, as delivered by the object store.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadEvent {
    #[serde(rename = "Records")]
    pub records: Vec<UploadRecord>
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadRecord {
    pub s3: S3Entity
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketEntity {
    pub name: String
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectEntity {
    pub key: String
}

/// Turns a file-arrival notification into a running import workflow.
pub struct UploadTrigger {
    workflow: Arc<dyn WorkflowTrigger>,
    workflow_id: String,
    default_asset_manager_id: Option<AssetManagerId>
}

impl UploadTrigger {
    pub fn new(
        workflow: Arc<dyn WorkflowTrigger>,
        workflow_id: impl Into<String>,
        default_asset_manager_id: Option<AssetManagerId>
    ) -> Self {
        Self {
            workflow,
            workflow_id: workflow_id.into(),
            default_asset_manager_id
        }
    }

    /// Assembles the import job payload from the event's first record and
    /// starts the configured workflow, returning its execution handle.
    pub async fn handle(&self, event: &UploadEvent) -> Result<String, TriggerError> {
        let record = event.records.first().ok_or(TriggerError::EmptyEvent)?;

        let mut payload = json!({
            "s3_bucket": record.s3.bucket.name,
            "s3_key": record.s3.object.key
        });

        if let Some(asset_manager_id) = self.default_asset_manager_id {
            payload["asset_manager_id"] = json!(asset_manager_id);
        }

        info!(
            "Starting workflow [{}] for upload {}/{}",
            self.workflow_id, record.s3.bucket.name, record.s3.object.key
        );

        let handle = self.workflow.start(&self.workflow_id, payload).await?;

        Ok(handle)
    }
}
