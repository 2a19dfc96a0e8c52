use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::storage::{ObjectStore, StoreError};

/// Filesystem-rooted object store where a bucket is a subdirectory of the
/// data root.
pub struct LocalObjectStore {
    root: PathBuf
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn download(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path
    ) -> Result<(), StoreError> {
        let source = self.object_path(bucket, key);

        if !source.is_file() {
            return Err(StoreError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string()
            });
        }

        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::copy(&source, local_path).await?;

        Ok(())
    }

    async fn upload(&self, local_path: &Path, bucket: &str, key: &str) -> Result<(), StoreError> {
        let target = self.object_path(bucket, key);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::copy(local_path, &target).await?;

        Ok(())
    }
}
