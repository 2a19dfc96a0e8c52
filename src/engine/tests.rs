use super::{ExecutionBudget, ImportError, ImportPipeline, ImportRunner, extract, upsert};

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::{
    AssetRecord, BookRecord, ImportJob, ImportType, Individual, PartyRecord, TransactionRecord
};
use crate::storage::{LocalObjectStore, MemoryStore, RecordInterface};

struct Stores {
    parties: Arc<MemoryStore<PartyRecord>>,
    books: Arc<MemoryStore<BookRecord>>,
    transactions: Arc<MemoryStore<TransactionRecord>>,
    assets: Arc<MemoryStore<AssetRecord>>
}

impl Stores {
    fn new() -> Self {
        Self {
            parties: Arc::new(MemoryStore::new()),
            books: Arc::new(MemoryStore::new()),
            transactions: Arc::new(MemoryStore::new()),
            assets: Arc::new(MemoryStore::new())
        }
    }

    fn runner(&self, budget: Arc<dyn ExecutionBudget>) -> ImportRunner {
        ImportRunner::new(
            self.parties.clone(),
            self.books.clone(),
            self.transactions.clone(),
            self.assets.clone(),
            budget
        )
    }
}

/// Budget with ample headroom: the abort path never triggers.
struct GenerousBudget;

impl ExecutionBudget for GenerousBudget {
    fn remaining_millis(&self) -> u64 {
        900_000
    }
}

/// Budget replaying a fixed sequence of remaining-time readings, one per
/// pre-row check.
struct SequenceBudget {
    readings: Mutex<VecDeque<u64>>
}

impl SequenceBudget {
    fn of(readings: &[u64]) -> Arc<Self> {
        Arc::new(Self {
            readings: Mutex::new(readings.iter().copied().collect())
        })
    }
}

impl ExecutionBudget for SequenceBudget {
    fn remaining_millis(&self) -> u64 {
        self.readings.lock().unwrap().pop_front().unwrap_or(60_000)
    }
}

fn parties_csv(ids: &[&str]) -> String {
    let mut content = String::from("PartyId,PartyType,Surname,GivenNames\n");

    for id in ids {
        content.push_str(&format!("{id},Individual,Keene,Laura\n"));
    }

    content
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

fn build_archive(path: &Path, entries: &[(&str, &str)]) -> Result<()> {
    let mut writer = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, content) in entries {
        writer.start_file(*name, options)?;
        writer.write_all(content.as_bytes())?;
    }

    writer.finish()?;
    Ok(())
}

fn parties_job(s3_bucket: &str, s3_key: &str) -> ImportJob {
    ImportJob {
        asset_manager_id: 10,
        s3_bucket: s3_bucket.to_string(),
        s3_key: s3_key.to_string(),
        import_type: ImportType::Parties,
        resume_index: 0,
        aborted: false,
        processed_files: Vec::new()
    }
}

async fn party_ids(store: &MemoryStore<PartyRecord>, ids: &[&str]) -> Result<usize> {
    let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    Ok(store.search(10, &ids).await?.len())
}

#[test]
fn test_extract_zip_filters_entries_by_import_type() -> Result<()> {
    let scratch = tempdir()?;
    let archive_path = scratch.path().join("import.zip");
    build_archive(
        &archive_path,
        &[
            ("transactions_1.csv", "TransactionId\nTX1\n"),
            ("parties_1.csv", "PartyId\nPARTY1\n")
        ]
    )?;

    let files = extract(&archive_path, ImportType::Transactions)?;

    assert_eq!(files.len(), 1);
    let name = files[0]
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Extracted path has no filename"))?;
    assert_eq!(name, "transactions_1.csv");

    Ok(())
}

#[test]
fn test_extract_plain_csv_requires_matching_prefix() -> Result<()> {
    let scratch = tempdir()?;
    let path = write_file(scratch.path(), "parties_1.csv", &parties_csv(&["PARTY1"]))?;

    assert_eq!(extract(&path, ImportType::Parties)?, vec![path.clone()]);
    assert!(extract(&path, ImportType::Transactions)?.is_empty());

    Ok(())
}

#[test]
fn test_extract_rejects_unsupported_extension() -> Result<()> {
    let scratch = tempdir()?;
    let path = write_file(scratch.path(), "parties_1.txt", "PartyId\nPARTY1\n")?;

    let result = extract(&path, ImportType::Parties);

    assert!(matches!(result, Err(ImportError::UnsupportedFileType { .. })));

    Ok(())
}

#[tokio::test]
async fn test_upsert_creates_then_updates_by_natural_key() -> Result<()> {
    let store: MemoryStore<PartyRecord> = MemoryStore::new();
    let party = PartyRecord::Individual(Individual {
        asset_manager_id: 10,
        party_id: "PARTY1".to_string(),
        surname: Some("Keene".to_string()),
        given_names: None
    });

    upsert(&store, party.clone()).await?;
    upsert(&store, party).await?;

    assert_eq!(store.create_calls(), 1);
    assert_eq!(store.update_calls(), 1);

    Ok(())
}

#[tokio::test]
async fn test_runner_imports_every_row_of_a_file() -> Result<()> {
    let scratch = tempdir()?;
    let path = write_file(
        scratch.path(),
        "parties_1.csv",
        &parties_csv(&["PARTY1", "PARTY2", "PARTY3"])
    )?;

    let stores = Stores::new();
    let runner = stores.runner(Arc::new(GenerousBudget));
    let outcome = runner.run_file(10, ImportType::Parties, &path, 0).await?;

    assert!(!outcome.aborted);
    assert_eq!(outcome.count, 3);
    assert_eq!(party_ids(&stores.parties, &["PARTY1", "PARTY2", "PARTY3"]).await?, 3);
    assert_eq!(stores.parties.create_calls(), 3);

    Ok(())
}

#[tokio::test]
async fn test_budget_abort_reports_exact_resume_point() -> Result<()> {
    let scratch = tempdir()?;
    let path = write_file(
        scratch.path(),
        "parties_1.csv",
        &parties_csv(&["PARTY1", "PARTY2", "PARTY3", "PARTY4"])
    )?;

    // Two generous readings, then the third pre-row check lands under the
    // abort threshold: rows 1 and 2 complete, row 3 is left for the next
    // invocation.
    let stores = Stores::new();
    let runner = stores.runner(SequenceBudget::of(&[60_000, 60_000, 10_000]));
    let outcome = runner.run_file(10, ImportType::Parties, &path, 0).await?;

    assert!(outcome.aborted);
    assert_eq!(outcome.count, 2);
    assert_eq!(party_ids(&stores.parties, &["PARTY1", "PARTY2"]).await?, 2);
    assert_eq!(party_ids(&stores.parties, &["PARTY3", "PARTY4"]).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_resume_after_abort_matches_uninterrupted_run() -> Result<()> {
    let scratch = tempdir()?;
    let ids = ["PARTY1", "PARTY2", "PARTY3", "PARTY4"];
    let path = write_file(scratch.path(), "parties_1.csv", &parties_csv(&ids))?;

    let interrupted = Stores::new();
    let aborting_runner = interrupted.runner(SequenceBudget::of(&[60_000, 60_000, 10_000]));
    let outcome = aborting_runner.run_file(10, ImportType::Parties, &path, 0).await?;
    assert!(outcome.aborted);

    let resuming_runner = interrupted.runner(Arc::new(GenerousBudget));
    let resumed = resuming_runner.run_file(10, ImportType::Parties, &path, outcome.count).await?;
    assert!(!resumed.aborted);
    assert_eq!(resumed.count, 4);

    let uninterrupted = Stores::new();
    let single_runner = uninterrupted.runner(Arc::new(GenerousBudget));
    single_runner.run_file(10, ImportType::Parties, &path, 0).await?;

    assert_eq!(party_ids(&interrupted.parties, &ids).await?, 4);
    assert_eq!(party_ids(&uninterrupted.parties, &ids).await?, 4);

    // Every row was delivered exactly once across the two partial runs.
    assert_eq!(interrupted.parties.create_calls(), 4);
    assert_eq!(interrupted.parties.update_calls(), 0);

    Ok(())
}

#[tokio::test]
async fn test_driver_appends_processed_files_and_resets_resume() -> Result<()> {
    let scratch = tempdir()?;
    let first = write_file(scratch.path(), "parties_1.csv", &parties_csv(&["PARTY1", "PARTY2"]))?;
    let second = write_file(scratch.path(), "parties_2.csv", &parties_csv(&["PARTY3"]))?;

    let mut job = parties_job("landing", "import.zip");
    job.resume_index = 1;

    let stores = Stores::new();
    let runner = stores.runner(Arc::new(GenerousBudget));
    let updated = runner.run(&job, &[first, second]).await?;

    assert!(!updated.aborted);
    assert_eq!(updated.resume_index, 0);
    assert_eq!(updated.processed_files, vec!["parties_1.csv", "parties_2.csv"]);

    // The resume index applied only to the first unprocessed file: its
    // first row was skipped as already delivered.
    assert_eq!(party_ids(&stores.parties, &["PARTY1"]).await?, 0);
    assert_eq!(party_ids(&stores.parties, &["PARTY2", "PARTY3"]).await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_driver_abort_leaves_remaining_files_untouched() -> Result<()> {
    let scratch = tempdir()?;
    let first = write_file(scratch.path(), "parties_1.csv", &parties_csv(&["PARTY1", "PARTY2"]))?;
    let second = write_file(scratch.path(), "parties_2.csv", &parties_csv(&["PARTY3"]))?;

    let stores = Stores::new();
    let runner = stores.runner(SequenceBudget::of(&[60_000, 10_000]));
    let updated = runner.run(&parties_job("landing", "import.zip"), &[first, second]).await?;

    assert!(updated.aborted);
    assert_eq!(updated.resume_index, 1);
    assert!(updated.processed_files.is_empty());
    assert_eq!(party_ids(&stores.parties, &["PARTY1"]).await?, 1);
    assert_eq!(party_ids(&stores.parties, &["PARTY2", "PARTY3"]).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_driver_skips_already_processed_files() -> Result<()> {
    let scratch = tempdir()?;
    let first = write_file(scratch.path(), "parties_1.csv", &parties_csv(&["PARTY1"]))?;
    let second = write_file(scratch.path(), "parties_2.csv", &parties_csv(&["PARTY2"]))?;

    let mut job = parties_job("landing", "import.zip");
    job.processed_files.push("parties_1.csv".to_string());

    let stores = Stores::new();
    let runner = stores.runner(Arc::new(GenerousBudget));
    let updated = runner.run(&job, &[first, second]).await?;

    assert_eq!(updated.processed_files, vec!["parties_1.csv", "parties_2.csv"]);
    assert_eq!(party_ids(&stores.parties, &["PARTY1"]).await?, 0);
    assert_eq!(party_ids(&stores.parties, &["PARTY2"]).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_fx_transaction_upserts_derived_asset_first() -> Result<()> {
    let scratch = tempdir()?;
    let path = write_file(
        scratch.path(),
        "transactions_1.csv",
        "TransactionId,AssetId,AssetType,BookId,SettlementDate,FixingDate,TransactionCurrency,Quantity,Price\n\
         TX1,EURUSD,ForeignExchangeForward,BOOK1,2024-03-15,2024-03-13,USD,1000000,1.0842\n"
    )?;

    let stores = Stores::new();
    let runner = stores.runner(Arc::new(GenerousBudget));
    let outcome = runner.run_file(10, ImportType::Transactions, &path, 0).await?;

    assert!(!outcome.aborted);

    let asset_ids = vec!["FWDEURUSD20240315".to_string()];
    let assets = stores.assets.search(10, &asset_ids).await?;
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].underlying, "EURUSD");

    let transaction_ids = vec!["TX1".to_string()];
    let transactions = stores.transactions.search(10, &transaction_ids).await?;
    assert_eq!(transactions[0].asset_id, "FWDEURUSD20240315");

    Ok(())
}

#[tokio::test]
async fn test_row_mapping_failure_is_fatal_and_keeps_prior_rows() -> Result<()> {
    let scratch = tempdir()?;
    let path = write_file(
        scratch.path(),
        "transactions_1.csv",
        "TransactionId,AssetId,AssetType,SettlementDate,TransactionCurrency\n\
         TX1,EQUITY1,Equity,2024-03-15,USD\n\
         TX2,EQUITY1,Equity,not-a-date,USD\n"
    )?;

    let stores = Stores::new();
    let runner = stores.runner(Arc::new(GenerousBudget));
    let result = runner.run_file(10, ImportType::Transactions, &path, 0).await;

    assert!(matches!(result, Err(ImportError::Mapping { row_index: 2, .. })));

    // The checkpoint from the last successful row remains valid for the
    // next attempt.
    let ids = vec!["TX1".to_string()];
    assert_eq!(stores.transactions.search(10, &ids).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_pipeline_round_trips_checkpoint_over_archive() -> Result<()> {
    let root = tempdir()?;
    fs::create_dir_all(root.path().join("landing"))?;
    build_archive(
        &root.path().join("landing").join("import.zip"),
        &[
            ("parties_1.csv", &parties_csv(&["PARTY1", "PARTY2"])),
            ("parties_2.csv", &parties_csv(&["PARTY3", "PARTY4"])),
            ("notes.txt", "ignored\n")
        ]
    )?;

    let stores = Stores::new();
    let job = parties_job("landing", "import.zip");

    let aborting = ImportPipeline::new(
        Arc::new(LocalObjectStore::new(root.path())),
        stores.runner(SequenceBudget::of(&[60_000, 10_000]))
    );
    let checkpoint = aborting.run(&job).await?;

    assert!(checkpoint.aborted);
    assert_eq!(checkpoint.resume_index, 1);
    assert!(checkpoint.processed_files.is_empty());

    let resuming = ImportPipeline::new(
        Arc::new(LocalObjectStore::new(root.path())),
        stores.runner(Arc::new(GenerousBudget))
    );
    let finished = resuming.run(&checkpoint).await?;

    assert!(!finished.aborted);
    assert_eq!(finished.resume_index, 0);
    assert_eq!(finished.processed_files, vec!["parties_1.csv", "parties_2.csv"]);

    assert_eq!(party_ids(&stores.parties, &["PARTY1", "PARTY2", "PARTY3", "PARTY4"]).await?, 4);
    assert_eq!(stores.parties.create_calls(), 4);
    assert_eq!(stores.parties.update_calls(), 0);

    Ok(())
}
