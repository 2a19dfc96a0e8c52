use std::sync::Arc;

use tempfile::tempdir;
use tracing::info;

use crate::engine::extract::extract;
use crate::engine::runner::ImportRunner;
use crate::engine::ImportError;
use crate::models::ImportJob;
use crate::storage::ObjectStore;

/// One invocation of the import pipeline: download, extract, run, return
/// the updated checkpoint state for possible re-invocation.
pub struct ImportPipeline {
    object_store: Arc<dyn ObjectStore>,
    runner: ImportRunner
}

impl ImportPipeline {
    pub fn new(object_store: Arc<dyn ObjectStore>, runner: ImportRunner) -> Self {
        Self {
            object_store,
            runner
        }
    }

    /// Runs the job and returns its updated state. When `aborted` is set on
    /// the result, the caller is expected to feed the same payload back
    /// into a subsequent invocation.
    pub async fn run(&self, job: &ImportJob) -> Result<ImportJob, ImportError> {
        // The guard removes the scratch directory on every exit path,
        // including row failures and aborts.
        let scratch = tempdir()?;
        let download_path = scratch.path().join(&job.s3_key);

        info!(
            "Downloading file {} from {} to {}",
            job.s3_key,
            job.s3_bucket,
            download_path.display()
        );
        self.object_store.download(&job.s3_bucket, &job.s3_key, &download_path).await?;

        let import_files = extract(&download_path, job.import_type)?;

        self.runner.run(job, &import_files).await
    }
}
