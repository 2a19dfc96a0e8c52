use thiserror::Error;

use crate::mapper::MappingError;
use crate::storage::StoreError;
use crate::types::RowIndex;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file type [{extension}] for import file [{path}]")]
    UnsupportedFileType {
        path: String,
        extension: String
    },
    #[error("Failed to map row [{row_index}] of [{file}]: {source}")]
    Mapping {
        file: String,
        row_index: RowIndex,
        #[source]
        source: MappingError
    },
    #[error("Remote store call failed: {0}")]
    Store(#[from] StoreError),
    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Archive extraction failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error)
}
