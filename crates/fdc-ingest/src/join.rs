//! Grouped join of a dependent extract into seeded food documents
//!
//! A dependent extract carries many rows per food, keyed by a foreign-key
//! column. [`JoinWorker`] streams the file once, treats every maximal run of
//! consecutive rows with the same key as one group, and writes each group's
//! decoded items into the food document in a single read-modify-write.
//!
//! Grouping is by adjacency only. If a key shows up again after another key,
//! the second run replaces what the first one wrote.
//!
//! Before a group accumulates anything the worker checks that the food was
//! seeded. Rows of unknown keys are counted as orphaned and never written.

use csv_async::StringRecord;
use fdc_common::Food;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::Result;
use crate::tabular::{column, TabularReader};
use fdc_common::store::SerializedStore;

/// Decodes rows of one dependent extract into one collection of a food
pub trait RowDecoder: Send + Sync + 'static {
    type Item: Send + 'static;

    /// Short label used in logs and summaries
    fn name(&self) -> &'static str;

    /// Column holding the food id
    fn foreign_key_column(&self) -> usize;

    /// Decode one row, `None` when a required field is unusable
    fn decode(&self, row: &StringRecord, fdc_id: &str) -> Option<Self::Item>;

    /// Replace the collection this decoder owns
    fn assign(&self, food: &mut Food, items: Vec<Self::Item>);
}

/// Per-worker counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Data rows read
    pub rows: u64,
    /// Rows decoded into an item
    pub accumulated: u64,
    /// Rows dropped for a blank key or an unusable required field
    pub skipped_rows: u64,
    /// Rows whose key has no seeded food
    pub orphaned_rows: u64,
    /// Rows read with invalid UTF-8 replaced; they are still decoded
    pub repaired_rows: u64,
    /// Read-modify-write cycles performed
    pub flushes: u64,
}

struct Group<T> {
    key: String,
    items: Vec<T>,
    orphaned: bool,
}

/// Streams one dependent extract into the store
pub struct JoinWorker<D: RowDecoder> {
    path: PathBuf,
    decoder: D,
    store: Arc<SerializedStore>,
    has_headers: bool,
    progress_interval: u64,
    progress: ProgressBar,
}

impl<D: RowDecoder> JoinWorker<D> {
    pub fn new(path: impl Into<PathBuf>, decoder: D, store: Arc<SerializedStore>) -> Self {
        Self {
            path: path.into(),
            decoder,
            store,
            has_headers: true,
            progress_interval: 10_000,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Log a progress line every `interval` rows
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn with_progress_bar(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Read the whole extract, flushing one group at a time
    pub async fn run(self) -> Result<JoinStats> {
        let span = info_span!("join", worker = self.decoder.name());
        self.join().instrument(span).await
    }

    async fn join(self) -> Result<JoinStats> {
        let name = self.decoder.name();
        let key_column = self.decoder.foreign_key_column();
        info!(path = %self.path.display(), "Starting {} join", name);

        let mut reader = TabularReader::open(&self.path, self.has_headers).await?;
        let mut row = StringRecord::new();
        let mut stats = JoinStats::default();
        let mut group: Option<Group<D::Item>> = None;

        while reader.read_row(&mut row).await? {
            stats.rows += 1;
            self.progress.inc(1);
            if stats.rows % self.progress_interval == 0 {
                info!(rows = stats.rows, "{} rows processed", name);
            }

            let key = column(&row, key_column);
            if key.is_empty() {
                warn!(row = reader.rows_read(), "Row has no food id, skipping");
                stats.skipped_rows += 1;
                continue;
            }

            let starts_group = group.as_ref().map_or(true, |g| g.key != key);
            if starts_group {
                if let Some(done) = group.take() {
                    self.flush(done, &mut stats).await?;
                }
                group = Some(self.open_group(key).await?);
            }

            let Some(current) = group.as_mut() else {
                continue;
            };
            if current.orphaned {
                stats.orphaned_rows += 1;
                continue;
            }

            match self.decoder.decode(&row, key) {
                Some(item) => {
                    current.items.push(item);
                    stats.accumulated += 1;
                },
                None => stats.skipped_rows += 1,
            }
        }

        if let Some(done) = group.take() {
            self.flush(done, &mut stats).await?;
        }
        stats.repaired_rows = reader.rows_repaired();

        self.progress.finish_and_clear();
        info!(
            rows = stats.rows,
            flushes = stats.flushes,
            skipped = stats.skipped_rows,
            orphaned = stats.orphaned_rows,
            repaired = stats.repaired_rows,
            "Finished {} join",
            name
        );
        Ok(stats)
    }

    /// Start a group, checking that its food exists before anything accumulates
    async fn open_group(&self, key: &str) -> Result<Group<D::Item>> {
        let orphaned = self.store.get(key).await?.is_none();
        if orphaned {
            warn!(fdc_id = key, "No seeded food for id, skipping its rows");
        }
        Ok(Group {
            key: key.to_string(),
            items: Vec::new(),
            orphaned,
        })
    }

    async fn flush(&self, group: Group<D::Item>, stats: &mut JoinStats) -> Result<()> {
        let Group {
            key,
            items,
            orphaned,
        } = group;
        if orphaned {
            return Ok(());
        }

        let count = items.len();
        let decoder = &self.decoder;
        let written = self
            .store
            .modify(&key, |food| decoder.assign(food, items))
            .await?;

        if written {
            stats.flushes += 1;
            debug!(fdc_id = %key, items = count, "Flushed group");
        } else {
            warn!(fdc_id = %key, items = count, "Food disappeared before flush, dropping group");
            stats.orphaned_rows += count as u64;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fields::{required_number, text};
    use fdc_common::store::MemoryStore;
    use fdc_common::InputFood;
    use tempfile::TempDir;

    /// Collects column 2 into input food descriptions; column 1 is the key
    struct LabelDecoder;

    impl RowDecoder for LabelDecoder {
        type Item = InputFood;

        fn name(&self) -> &'static str {
            "labels"
        }

        fn foreign_key_column(&self) -> usize {
            1
        }

        fn decode(&self, row: &StringRecord, fdc_id: &str) -> Option<InputFood> {
            let seq_no = required_number(row, 3, "seq", fdc_id)?;
            Some(InputFood {
                seq_no,
                description: text(row, 2),
                ..Default::default()
            })
        }

        fn assign(&self, food: &mut Food, items: Vec<InputFood>) {
            food.input_foods = items;
        }
    }

    async fn seeded(ids: &[&str]) -> (Arc<MemoryStore>, Arc<SerializedStore>) {
        let memory = Arc::new(MemoryStore::new());
        let store = Arc::new(SerializedStore::new(memory.clone()));
        for id in ids {
            store.put(id, &Food::seed(*id, "seed", "TEST")).await.unwrap();
        }
        (memory, store)
    }

    fn extract(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("extract.csv");
        std::fs::write(&path, format!("id,fk,label,seq\n{body}")).unwrap();
        path
    }

    #[tokio::test]
    async fn test_one_flush_per_run() {
        let dir = TempDir::new().unwrap();
        let (memory, store) = seeded(&["A", "B"]).await;
        let path = extract(&dir, "1,A,a1,1\n2,A,a2,2\n3,B,b1,1\n");

        let stats = JoinWorker::new(path, LabelDecoder, store.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(stats.rows, 3);
        assert_eq!(stats.flushes, 2);
        // two seeds plus two flushes
        assert_eq!(memory.write_count(), 4);
        let a = store.get("A").await.unwrap().unwrap();
        assert_eq!(a.input_foods.len(), 2);
        assert_eq!(a.input_foods[1].description, "a2");
    }

    #[tokio::test]
    async fn test_bad_required_field_still_flushes_group() {
        let dir = TempDir::new().unwrap();
        let (_, store) = seeded(&["A"]).await;
        let path = extract(&dir, "1,A,a1,x\n");

        let stats = JoinWorker::new(path, LabelDecoder, store.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(stats.skipped_rows, 1);
        assert_eq!(stats.flushes, 1);
        assert!(store.get("A").await.unwrap().unwrap().input_foods.is_empty());
    }

    #[tokio::test]
    async fn test_blank_key_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let (_, store) = seeded(&["A"]).await;
        let path = extract(&dir, "1,,x,1\n2,A,a1,1\n");

        let stats = JoinWorker::new(path, LabelDecoder, store)
            .run()
            .await
            .unwrap();

        assert_eq!(stats.rows, 2);
        assert_eq!(stats.skipped_rows, 1);
        assert_eq!(stats.flushes, 1);
    }

    #[tokio::test]
    async fn test_empty_extract_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let (memory, store) = seeded(&["A"]).await;
        let path = extract(&dir, "");

        let stats = JoinWorker::new(path, LabelDecoder, store)
            .run()
            .await
            .unwrap();

        assert_eq!(stats, JoinStats::default());
        assert_eq!(memory.write_count(), 1);
    }
}
