//! FNDDS survey food ingest
//!
//! Merges four extracts into one document per food:
//!
//! 1. `food.csv` seeds a base document per food (sequential, must succeed)
//! 2. `food_portion.csv`, `food_nutrient.csv` and `input_food.csv` are then
//!    joined in concurrently, each worker owning one collection of the food
//!
//! Workers share documents, so every join write goes through a
//! [`SerializedStore`] read-modify-write. A worker that fails does not stop the
//! others; the run reports every failure once all three have finished.

pub mod input_foods;
pub mod nutrients;
pub mod seed;
pub mod servings;

use fdc_common::store::{DocumentStore, SerializedStore};
use futures::stream::{self, StreamExt};
use indicatif::MultiProgress;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::IngestConfig;
use crate::dictionary::NutrientDictionary;
use crate::error::{IngestError, Result};
use crate::join::{JoinStats, JoinWorker};
use crate::progress::row_spinner;

pub use input_foods::{InputFoodColumns, InputFoodDecoder};
pub use nutrients::{NutrientColumns, NutrientDecoder};
pub use seed::{FoodColumns, SeedLoader, SeedStats};
pub use servings::{ServingColumns, ServingDecoder};

/// The three dependent loaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerKind {
    Servings,
    Nutrients,
    InputFoods,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 3] = [Self::Servings, Self::Nutrients, Self::InputFoods];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Servings => "servings",
            Self::Nutrients => "nutrients",
            Self::InputFoods => "input foods",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows processed per extract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub foods: u64,
    pub servings: u64,
    pub nutrients: u64,
    /// Rows of `input_food.csv`
    pub other: u64,
}

impl RunCounters {
    fn record(&mut self, worker: WorkerKind, stats: &JoinStats) {
        match worker {
            WorkerKind::Servings => self.servings = stats.rows,
            WorkerKind::Nutrients => self.nutrients = stats.rows,
            WorkerKind::InputFoods => self.other = stats.rows,
        }
    }
}

impl fmt::Display for RunCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Counts: {} Foods {} Servings {} Nutrients {} Other",
            self.foods, self.servings, self.nutrients, self.other
        )
    }
}

/// A dependent loader that ended with an error
#[derive(Debug)]
pub struct WorkerFailure {
    pub worker: WorkerKind,
    pub error: IngestError,
}

/// Outcome of a run whose seed phase succeeded
#[derive(Debug, Default)]
pub struct RunReport {
    pub counters: RunCounters,
    pub seed: SeedStats,
    /// Stats of each worker that finished, in completion order
    pub workers: Vec<(WorkerKind, JoinStats)>,
    /// Failed workers, in completion order
    pub failures: Vec<WorkerFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn stats(&self, worker: WorkerKind) -> Option<&JoinStats> {
        self.workers
            .iter()
            .find(|(kind, _)| *kind == worker)
            .map(|(_, stats)| stats)
    }

    /// Counters, or the first failure observed
    pub fn into_result(self) -> Result<RunCounters> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.counters),
        }
    }

    fn record(&mut self, worker: WorkerKind, outcome: Result<JoinStats>) {
        match outcome {
            Ok(stats) => {
                info!(
                    worker = %worker,
                    rows = stats.rows,
                    orphaned = stats.orphaned_rows,
                    repaired = stats.repaired_rows,
                    "{} ingest complete",
                    worker
                );
                self.counters.record(worker, &stats);
                self.workers.push((worker, stats));
            },
            Err(error) => {
                error!(worker = %worker, error = %error, "{} ingest failed", worker);
                self.failures.push(WorkerFailure { worker, error });
            },
        }
    }
}

/// Runs the seed loader and the three joins against one store
pub struct FnddsIngest {
    config: IngestConfig,
    store: Arc<SerializedStore>,
    progress: Option<MultiProgress>,
}

impl FnddsIngest {
    pub fn new(config: IngestConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_serialized_store(config, Arc::new(SerializedStore::new(store)))
    }

    pub fn with_serialized_store(config: IngestConfig, store: Arc<SerializedStore>) -> Self {
        Self {
            config,
            store,
            progress: None,
        }
    }

    /// Draw a row spinner per loader
    pub fn with_progress(mut self, multi: MultiProgress) -> Self {
        self.progress = Some(multi);
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Seed, then join the three dependent extracts concurrently
    ///
    /// Returns `Err` only for invalid configuration or a failed seed, in which
    /// case no worker was started. Worker failures are collected in the report.
    pub async fn run(&self) -> Result<RunReport> {
        self.config.validate()?;
        info!(data_dir = %self.config.data_dir().display(), "Starting FNDDS ingest");

        let seed = SeedLoader::new(
            self.config.food_file(),
            self.config.source.clone(),
            self.store.clone(),
        )
        .with_columns(self.config.columns.foods)
        .with_headers(self.config.has_headers)
        .with_progress_interval(self.config.progress.foods)
        .with_progress_bar(row_spinner(self.progress.as_ref(), "foods"))
        .run()
        .await?;

        let mut report = RunReport {
            counters: RunCounters {
                foods: seed.rows,
                ..Default::default()
            },
            seed,
            ..Default::default()
        };

        let mut finished = stream::iter(WorkerKind::ALL)
            .map(|worker| {
                let handle = tokio::spawn(self.worker(worker));
                async move { (worker, handle.await) }
            })
            .buffer_unordered(WorkerKind::ALL.len());

        while let Some((worker, joined)) = finished.next().await {
            let outcome = joined.unwrap_or_else(|e| {
                Err(IngestError::Worker {
                    worker: worker.to_string(),
                    message: e.to_string(),
                })
            });
            report.record(worker, outcome);
        }

        info!("{}", report.counters);
        Ok(report)
    }

    /// Build the future for one worker; it owns everything it touches
    fn worker(
        &self,
        worker: WorkerKind,
    ) -> impl std::future::Future<Output = Result<JoinStats>> + Send + 'static {
        let config = self.config.clone();
        let store = self.store.clone();
        let progress = row_spinner(self.progress.as_ref(), worker.as_str());
        let columns = config.columns;

        async move {
            match worker {
                WorkerKind::Servings => {
                    let decoder = ServingDecoder::new().with_columns(columns.servings);
                    JoinWorker::new(config.serving_file(), decoder, store)
                        .with_headers(config.has_headers)
                        .with_progress_interval(config.progress.servings)
                        .with_progress_bar(progress)
                        .run()
                        .await
                },
                WorkerKind::Nutrients => {
                    let dictionary = NutrientDictionary::load(
                        store.inner().as_ref(),
                        &config.dictionary_namespace,
                        config.dictionary_page_size,
                    )
                    .await?;

                    let decoder = NutrientDecoder::new(dictionary).with_columns(columns.nutrients);
                    JoinWorker::new(config.nutrient_file(), decoder, store)
                        .with_headers(config.has_headers)
                        .with_progress_interval(config.progress.nutrients)
                        .with_progress_bar(progress)
                        .run()
                        .await
                },
                WorkerKind::InputFoods => {
                    let decoder = InputFoodDecoder::new().with_columns(columns.input_foods);
                    JoinWorker::new(config.input_food_file(), decoder, store)
                        .with_headers(config.has_headers)
                        .with_progress_interval(config.progress.input_foods)
                        .with_progress_bar(progress)
                        .run()
                        .await
                },
            }
        }
    }
}
