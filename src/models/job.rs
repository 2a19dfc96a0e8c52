use serde::{Deserialize, Serialize};

use crate::models::ImportType;
use crate::types::{AssetManagerId, RowIndex};

/// One invocation's view of an import job, round-tripped through the
/// invocation payload.
///
/// The `resume_index`, `aborted` and `processed_files` fields are the sole
/// checkpoint state: when an invocation runs out of execution budget it
/// returns the job with `aborted` set, and the scheduler feeds the same
/// payload back in so the next invocation picks up exactly where this one
/// stopped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub asset_manager_id: AssetManagerId,
    pub s3_bucket: String,
    pub s3_key: String,
    pub import_type: ImportType,
    /// Rows with an index at or below this value were completed by a prior
    /// partial run of the current file and are never reprocessed.
    #[serde(default)]
    pub resume_index: RowIndex,
    #[serde(default)]
    pub aborted: bool,
    /// Files whose entire row set completed without abort, in import order.
    #[serde(default)]
    pub processed_files: Vec<String>
}
