use std::fs;
use std::io::stderr;
use std::process::exit;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use backoffice_pipeline::engine::{DeadlineBudget, ImportPipeline, ImportRunner};
use backoffice_pipeline::export::PositionExporter;
use backoffice_pipeline::models::{
    AssetRecord, BookRecord, ImportJob, PartyRecord, TransactionRecord
};
use backoffice_pipeline::storage::{LocalObjectStore, MemoryStore};

/// Stand-in for the hosting runtime's execution ceiling.
const EXECUTION_BUDGET: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: A much more sophisticated CLI surface would justify the clap crate;
    //      two positional arguments and a flag do not.
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: backoffice-pipeline [data-root] [job.json] [--export-bucket bucket] [log_level]");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let data_root = &args[1];
    let job_path = &args[2];

    let mut export_bucket: Option<String> = None;
    let mut log_level = LevelFilter::ERROR;
    let mut index = 3;

    while index < args.len() {
        match args[index].as_str() {
            "--export-bucket" => {
                index += 1;
                match args.get(index) {
                    Some(bucket) => export_bucket = Some(bucket.clone()),
                    None => {
                        eprintln!("--export-bucket requires a bucket name");
                        exit(1);
                    }
                }
            }
            level => log_level = parse_log_level(level)
        }
        index += 1;
    }

    setup_logging(log_level);

    let job: ImportJob = serde_json::from_str(&fs::read_to_string(job_path)?)?;

    let object_store = Arc::new(LocalObjectStore::new(data_root));
    let parties: Arc<MemoryStore<PartyRecord>> = Arc::new(MemoryStore::new());
    let books: Arc<MemoryStore<BookRecord>> = Arc::new(MemoryStore::new());
    let transactions: Arc<MemoryStore<TransactionRecord>> = Arc::new(MemoryStore::new());
    let assets: Arc<MemoryStore<AssetRecord>> = Arc::new(MemoryStore::new());
    let budget = Arc::new(DeadlineBudget::starting_now(EXECUTION_BUDGET));

    let runner = ImportRunner::new(parties, books, transactions.clone(), assets, budget);
    let pipeline = ImportPipeline::new(object_store.clone(), runner);

    let timer = Instant::now();
    let updated = pipeline.run(&job).await?;
    info!("Import finished in {:?}", timer.elapsed());

    if let Some(bucket) = export_bucket {
        if updated.aborted {
            info!("Skipping position export, import aborted for resume");
        } else {
            let exporter = PositionExporter::new(transactions, object_store, bucket);
            let filename = exporter.run(updated.asset_manager_id).await?;
            info!("Exported positions to {filename}");
        }
    }

    println!("{}", serde_json::to_string(&updated)?);

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the updated job payload, so logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}
