use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, Trim};
use tracing::{error, info};

use crate::engine::budget::{ABORT_THRESHOLD_MILLIS, ExecutionBudget};
use crate::engine::upsert::upsert;
use crate::engine::ImportError;
use crate::mapper::{MappedRecord, RawRow, map_row};
use crate::models::{
    AssetRecord, BookRecord, ImportJob, ImportType, PartyRecord, Record, TransactionRecord
};
use crate::storage::{RecordInterface, StoreError};
use crate::types::{AssetManagerId, RowIndex};

/// Terminal state of one file's row loop within the current invocation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FileOutcome {
    pub aborted: bool,
    /// Rows completed so far. On abort this is the exact resume point: the
    /// pending row was not processed and will be retried.
    pub count: RowIndex
}

/// Streams import files row by row into the remote record interfaces,
/// enforcing the resume/abort checkpoint protocol.
pub struct ImportRunner {
    parties: Arc<dyn RecordInterface<PartyRecord>>,
    books: Arc<dyn RecordInterface<BookRecord>>,
    transactions: Arc<dyn RecordInterface<TransactionRecord>>,
    assets: Arc<dyn RecordInterface<AssetRecord>>,
    budget: Arc<dyn ExecutionBudget>
}

impl ImportRunner {
    pub fn new(
        parties: Arc<dyn RecordInterface<PartyRecord>>,
        books: Arc<dyn RecordInterface<BookRecord>>,
        transactions: Arc<dyn RecordInterface<TransactionRecord>>,
        assets: Arc<dyn RecordInterface<AssetRecord>>,
        budget: Arc<dyn ExecutionBudget>
    ) -> Self {
        Self {
            parties,
            books,
            transactions,
            assets,
            budget
        }
    }

    /// Drives the extracted files in order, threading the checkpoint
    /// through as a fresh job value.
    ///
    /// Files already named in `processed_files` are skipped. A budget abort
    /// stops the loop immediately, leaving remaining files untouched for
    /// the next invocation; a cleanly completed file is appended to
    /// `processed_files` and resets `resume_index` to zero.
    pub async fn run(&self, job: &ImportJob, files: &[impl AsRef<Path>]) -> Result<ImportJob, ImportError> {
        let mut updated = job.clone();
        updated.aborted = false;

        for file in files {
            let file = file.as_ref();
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            if updated.processed_files.iter().any(|processed| *processed == filename) {
                continue;
            }

            info!("Importing data from {filename}");
            let outcome = self
                .run_file(job.asset_manager_id, job.import_type, file, updated.resume_index)
                .await?;

            if outcome.aborted {
                updated.aborted = true;
                updated.resume_index = outcome.count;
                return Ok(updated);
            }

            updated.processed_files.push(filename);
            updated.resume_index = 0;
        }

        Ok(updated)
    }

    /// Runs the row loop of a single file from the given resume point.
    ///
    /// Rows are 1-indexed below the header; rows at or below `resume_index`
    /// were completed by a prior partial run and are never reprocessed. The
    /// execution budget is checked before each remaining row, so a single
    /// row's processing time is never interrupted.
    pub async fn run_file(
        &self,
        asset_manager_id: AssetManagerId,
        import_type: ImportType,
        path: &Path,
        resume_index: RowIndex
    ) -> Result<FileOutcome, ImportError> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let headers = reader.headers()?.clone();
        let filename = path.display().to_string();
        let mut count: RowIndex = 0;

        for result in reader.records() {
            let record = result?;
            count += 1;

            if count <= resume_index {
                continue;
            }

            if self.budget.remaining_millis() <= ABORT_THRESHOLD_MILLIS {
                info!("Execution budget exhausted, aborting [{filename}] at row [{count}]");
                return Ok(FileOutcome {
                    aborted: true,
                    count: count - 1
                });
            }

            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();

            match map_row(import_type, asset_manager_id, &row) {
                Ok(Some(mapped)) => match self.upsert_row(mapped).await {
                    Ok(identity) => info!("Updated record [{identity}]"),
                    Err(source) => {
                        error!("Failed to import row [{count}] of [{filename}] {row:?}: {source}");
                        return Err(source.into());
                    }
                },
                Ok(None) => {}
                Err(source) => {
                    error!("Failed to import row [{count}] of [{filename}] {row:?}: {source}");
                    return Err(ImportError::Mapping {
                        file: filename,
                        row_index: count,
                        source
                    });
                }
            }
        }

        Ok(FileOutcome {
            aborted: false,
            count
        })
    }

    /// Writes one mapped record to its record interface and returns the
    /// identity to log.
    ///
    /// A derived FX asset is upserted before its transaction; the
    /// transaction's asset reference switches to the derived identifier
    /// only once the asset upsert has succeeded.
    async fn upsert_row(&self, mapped: MappedRecord) -> Result<String, StoreError> {
        match mapped {
            MappedRecord::Party(party) => {
                let stored = upsert(self.parties.as_ref(), party).await?;
                Ok(format!("party {}", stored.natural_key()))
            }
            MappedRecord::Book(book) => {
                let stored = upsert(self.books.as_ref(), book).await?;
                Ok(format!("book {}", stored.natural_key()))
            }
            MappedRecord::Transaction { mut transaction, asset } => {
                if let Some(asset) = asset {
                    let stored_asset = upsert(self.assets.as_ref(), asset).await?;
                    transaction.asset_id = stored_asset.asset_id;
                }

                let stored = upsert(self.transactions.as_ref(), transaction).await?;
                Ok(format!("transaction {}", stored.natural_key()))
            }
        }
    }
}
