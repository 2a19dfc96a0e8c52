use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object [{key}] not found in bucket [{bucket}]")]
    ObjectNotFound {
        bucket: String,
        key: String
    },
    #[error("Remote call failed: {reason}")]
    CallFailed {
        reason: String
    },
    #[error("Store I/O failure: {0}")]
    Io(#[from] std::io::Error)
}
