//! FDC Ingest - survey food merge tool

use anyhow::{Context, Result};
use clap::Parser;
use fdc_common::logging::{init_logging, LogConfig, LogLevel};
use fdc_common::store::{DocumentStore, FileStore, MemoryStore};
use fdc_ingest::config::IngestConfig;
use fdc_ingest::fndds::FnddsIngest;
use indicatif::MultiProgress;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "fdc-ingest")]
#[command(author, version, about = "Survey food (FNDDS) ingest tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Merge the four FNDDS extracts into food documents
    Fndds {
        /// Directory holding food.csv and its dependent extracts
        #[arg(short, long, env = "FDC_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Root directory of the document store
        #[arg(short, long, env = "FDC_STORE_DIR")]
        store_dir: Option<PathBuf>,

        /// Bucket that receives the food documents
        #[arg(short, long)]
        bucket: Option<String>,

        /// Source label stamped on every food
        #[arg(long)]
        source: Option<String>,

        /// Extracts have no header row
        #[arg(long)]
        no_headers: bool,

        /// Merge into a throwaway in-memory store
        #[arg(long)]
        memory: bool,

        /// Show row spinners
        #[arg(long)]
        progress: bool,
    },

    /// Print one merged food document
    Show {
        /// Root directory of the document store
        #[arg(short, long, env = "FDC_STORE_DIR")]
        store_dir: Option<PathBuf>,

        /// Bucket holding the food documents
        #[arg(short, long)]
        bucket: Option<String>,

        /// Food id
        fdc_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("fdc-ingest")
        .build();

    // Environment variables take precedence
    let log_config = log_config.merge_env()?;
    let _guard = init_logging(&log_config)?;

    let config = IngestConfig::from_env()?;

    match cli.command {
        Command::Fndds {
            data_dir,
            store_dir,
            bucket,
            source,
            no_headers,
            memory,
            progress,
        } => {
            let mut config = config;
            if let Some(dir) = data_dir {
                config = config.with_data_dir(dir);
            }
            if let Some(dir) = store_dir {
                config = config.with_store_dir(dir);
            }
            if let Some(bucket) = bucket {
                config = config.with_bucket(bucket);
            }
            if let Some(source) = source {
                config = config.with_source(source);
            }
            if no_headers {
                config = config.with_headers(false);
            }
            config.validate()?;

            run_fndds(config, memory, progress).await?;
        },
        Command::Show {
            store_dir,
            bucket,
            fdc_id,
        } => {
            let store_dir = store_dir.unwrap_or(config.store_dir);
            let bucket = bucket.unwrap_or(config.bucket);
            show(store_dir, bucket, &fdc_id).await?;
        },
    }

    Ok(())
}

async fn run_fndds(config: IngestConfig, memory: bool, progress: bool) -> Result<()> {
    let store: Arc<dyn DocumentStore> = if memory {
        warn!("Using an in-memory store, nothing will be persisted");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            FileStore::open(&config.store_dir, &config.bucket)
                .await
                .with_context(|| format!("Failed to open store at {}", config.store_dir.display()))?,
        )
    };

    let mut ingest = FnddsIngest::new(config, store);
    if progress {
        ingest = ingest.with_progress(MultiProgress::new());
    }

    let report = ingest.run().await?;
    println!("{}", report.counters);

    for failure in &report.failures {
        eprintln!("{} failed: {}", failure.worker, failure.error);
    }
    report.into_result()?;

    info!("Ingestion complete");
    Ok(())
}

async fn show(store_dir: PathBuf, bucket: String, fdc_id: &str) -> Result<()> {
    let store = FileStore::open(&store_dir, bucket).await?;
    let food = store
        .get(fdc_id)
        .await?
        .with_context(|| format!("No food stored under {fdc_id}"))?;

    println!("{}", serde_json::to_string_pretty(&food)?);
    Ok(())
}
