//! Seed loader for `food.csv`
//!
//! Writes one base document per food row. Every join depends on these
//! documents, so any failure here stops the run before a worker starts.

use chrono::NaiveDate;
use csv_async::StringRecord;
use fdc_common::store::SerializedStore;
use fdc_common::Food;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::DEFAULT_FOOD_PROGRESS_INTERVAL;
use crate::error::Result;
use crate::fields::{optional_text, text};
use crate::tabular::{column, TabularReader};

/// Date layout of the publication date column
pub const PUBLICATION_DATE_FORMAT: &str = "%Y-%m-%d";

/// Column positions in `food.csv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodColumns {
    pub fdc_id: usize,
    pub description: usize,
    pub category: usize,
    pub publication_date: usize,
}

impl Default for FoodColumns {
    fn default() -> Self {
        Self {
            fdc_id: 0,
            description: 2,
            category: 3,
            publication_date: 4,
        }
    }
}

/// Outcome of a seed pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    /// Data rows read
    pub rows: u64,
    /// Documents written
    pub written: u64,
    /// Rows without a food id
    pub skipped_rows: u64,
    /// Rows read with invalid UTF-8 replaced
    pub repaired_rows: u64,
}

/// Streams `food.csv` into base food documents
pub struct SeedLoader {
    path: PathBuf,
    source: String,
    store: Arc<SerializedStore>,
    columns: FoodColumns,
    has_headers: bool,
    progress_interval: u64,
    progress: ProgressBar,
}

impl SeedLoader {
    pub fn new(
        path: impl Into<PathBuf>,
        source: impl Into<String>,
        store: Arc<SerializedStore>,
    ) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            store,
            columns: FoodColumns::default(),
            has_headers: true,
            progress_interval: DEFAULT_FOOD_PROGRESS_INTERVAL,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_columns(mut self, columns: FoodColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn with_progress_bar(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Write a base document for every row, returning the pass counters
    pub async fn run(self) -> Result<SeedStats> {
        info!(path = %self.path.display(), source = %self.source, "Seeding foods");

        let mut reader = TabularReader::open(&self.path, self.has_headers).await?;
        let mut row = StringRecord::new();
        let mut stats = SeedStats::default();

        while reader.read_row(&mut row).await? {
            stats.rows += 1;
            self.progress.inc(1);
            if stats.rows % self.progress_interval == 0 {
                info!(rows = stats.rows, "Foods processed");
            }

            let Some(food) = self.food_from_row(&row) else {
                warn!(row = reader.rows_read(), "Food row has no id, skipping");
                stats.skipped_rows += 1;
                continue;
            };

            self.store.put(&food.fdc_id, &food).await?;
            stats.written += 1;
        }
        stats.repaired_rows = reader.rows_repaired();

        self.progress.finish_and_clear();
        info!(
            rows = stats.rows,
            written = stats.written,
            skipped = stats.skipped_rows,
            repaired = stats.repaired_rows,
            "Finished seeding foods"
        );
        Ok(stats)
    }

    fn food_from_row(&self, row: &StringRecord) -> Option<Food> {
        let fdc_id = column(row, self.columns.fdc_id);
        if fdc_id.is_empty() {
            return None;
        }

        let mut food = Food::seed(fdc_id, text(row, self.columns.description), &self.source);
        food.category = optional_text(row, self.columns.category);
        food.publication_date = parse_publication_date(row, self.columns.publication_date, fdc_id);
        Some(food)
    }
}

/// Publication date of a row, `None` (with a warning) when it does not parse
fn parse_publication_date(row: &StringRecord, index: usize, fdc_id: &str) -> Option<NaiveDate> {
    let raw = column(row, index);
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, PUBLICATION_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(fdc_id, value = raw, error = %e, "Unparsable publication date");
            None
        },
    }
}
