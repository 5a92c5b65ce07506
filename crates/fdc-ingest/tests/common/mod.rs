//! Shared fixtures for the fdc-ingest integration tests
//!
//! - [`FnddsFixture`]: a temp directory holding the four extracts
//! - row builders in the FNDDS column layout
//! - store wrappers that record calls, add latency or fail dictionary lookups

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use fdc_common::store::{DocumentStore, MemoryStore, ReferenceEntry, SerializedStore};
use fdc_common::{FdcError, Food, Result};
use fdc_ingest::config::{
    IngestConfig, FOOD_FILE, INPUT_FOOD_FILE, NUTRIENT_FILE, SERVING_FILE,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const NAMESPACE: &str = "gnutdata";

pub const FOOD_HEADER: &str = "fdc_id,data_type,description,food_category_id,publication_date";
pub const PORTION_HEADER: &str =
    "id,fdc_id,seq_num,amount,measure_unit_id,portion_description,modifier,gram_weight";
const NUTRIENT_HEADER: &str = "id,fdc_id,nutrient_id,amount,data_points,derivation_id";
const INPUT_FOOD_HEADER: &str = "id,fdc_id,fdc_id_of_input_food,seq_num,amount,sr_code,\
sr_description,unit,portion_code,portion_description,gram_weight";

// ============================================================================
// Extract Fixtures
// ============================================================================

/// Temp directory holding a set of extracts
pub struct FnddsFixture {
    dir: TempDir,
    has_headers: bool,
}

impl FnddsFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            has_headers: true,
        }
    }

    /// Write extracts without a header row
    pub fn headerless() -> Self {
        Self {
            has_headers: false,
            ..Self::new()
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn foods(&self, rows: &[String]) -> &Self {
        self.write(FOOD_FILE, FOOD_HEADER, rows)
    }

    pub fn portions(&self, rows: &[String]) -> &Self {
        self.write(SERVING_FILE, PORTION_HEADER, rows)
    }

    pub fn nutrients(&self, rows: &[String]) -> &Self {
        self.write(NUTRIENT_FILE, NUTRIENT_HEADER, rows)
    }

    pub fn input_foods(&self, rows: &[String]) -> &Self {
        self.write(INPUT_FOOD_FILE, INPUT_FOOD_HEADER, rows)
    }

    /// Write `body` verbatim, for input that is not valid UTF-8
    pub fn raw(&self, name: &str, body: &[u8]) -> &Self {
        std::fs::write(self.file(name), body).unwrap();
        self
    }

    pub fn remove(&self, name: &str) -> &Self {
        std::fs::remove_file(self.file(name)).unwrap();
        self
    }

    /// Ingest config pointed at this directory
    pub fn config(&self) -> IngestConfig {
        IngestConfig::new()
            .with_data_dir(self.path())
            .with_headers(self.has_headers)
    }

    fn write(&self, name: &str, header: &str, rows: &[String]) -> &Self {
        let mut body = String::new();
        if self.has_headers {
            body.push_str(header);
            body.push('\n');
        }
        for row in rows {
            body.push_str(row);
            body.push('\n');
        }
        std::fs::write(self.file(name), body).unwrap();
        self
    }
}

pub fn food_row(fdc_id: &str, description: &str) -> String {
    format!("{fdc_id},survey_fndds_food,{description},16,2019-10-31")
}

/// Portion row with `amount` household units weighing 100 g
pub fn portion_row(row_id: u32, fdc_id: &str, description: &str, amount: &str) -> String {
    weighed_portion_row(row_id, fdc_id, description, amount, "100")
}

pub fn weighed_portion_row(
    row_id: u32,
    fdc_id: &str,
    description: &str,
    amount: &str,
    gram_weight: &str,
) -> String {
    format!("{row_id},{fdc_id},1,{amount},9999,{description},,{gram_weight}")
}

pub fn nutrient_row(row_id: u32, fdc_id: &str, nutrient_number: u32, value: &str) -> String {
    format!("{row_id},{fdc_id},{nutrient_number},{value},,71")
}

pub fn input_food_row(row_id: u32, fdc_id: &str, seq_no: u32, description: &str) -> String {
    format!("{row_id},{fdc_id},,{seq_no},1.5,1077,{description},CUP,1000,1 cup,244")
}

/// One full set of extracts covering `ids`, two rows per food per dependent file
pub fn write_complete_set(fixture: &FnddsFixture, ids: &[&str]) {
    let mut foods = Vec::new();
    let mut portions = Vec::new();
    let mut nutrients = Vec::new();
    let mut inputs = Vec::new();
    let mut row_id = 1;

    for id in ids {
        foods.push(food_row(id, &format!("Food {id}")));
        for n in 0..2u32 {
            portions.push(portion_row(row_id, id, &format!("{id} portion {n}"), "1"));
            nutrients.push(nutrient_row(row_id, id, 203 + n, "1.25"));
            inputs.push(input_food_row(row_id, id, n + 1, &format!("{id} input {n}")));
            row_id += 1;
        }
    }

    fixture
        .foods(&foods)
        .portions(&portions)
        .nutrients(&nutrients)
        .input_foods(&inputs);
}

// ============================================================================
// Stores
// ============================================================================

/// Memory store preloaded with a small nutrient and derivation dictionary
pub async fn reference_store() -> MemoryStore {
    let store = MemoryStore::new();
    add_references(&store).await;
    store
}

pub async fn add_references(store: &MemoryStore) {
    store
        .insert_references(
            NAMESPACE,
            "NUT",
            vec![
                json!({"nutrientno": 203, "tagname": "PROCNT", "name": "Protein", "unit": "g", "type": "NUT"}),
                json!({"nutrientno": 204, "tagname": "FAT", "name": "Total lipid (fat)", "unit": "g", "type": "NUT"}),
            ],
        )
        .await;
    store
        .insert_references(
            NAMESPACE,
            "DERV",
            vec![json!({"id": 71, "code": "A", "description": "Analytical"})],
        )
        .await;
}

pub fn serialized(store: Arc<dyn DocumentStore>) -> Arc<SerializedStore> {
    Arc::new(SerializedStore::new(store))
}

pub async fn seed(store: &SerializedStore, ids: &[&str]) {
    for id in ids {
        store
            .put(id, &Food::seed(*id, format!("Food {id}"), "FNDDS"))
            .await
            .unwrap();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Get(String),
    Update {
        key: String,
        servings: usize,
        nutrients: usize,
        input_foods: usize,
    },
    Lookup(String),
}

/// Memory store that logs every call in order
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    events: Mutex<Vec<StoreEvent>>,
}

impl RecordingStore {
    pub async fn with_references() -> Self {
        let store = Self::default();
        add_references(&store.inner).await;
        store
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn push(&self, event: StoreEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<Food>> {
        self.push(StoreEvent::Get(key.to_string()));
        self.inner.get(key).await
    }

    async fn update(&self, key: &str, food: &Food) -> Result<()> {
        self.push(StoreEvent::Update {
            key: key.to_string(),
            servings: food.servings.len(),
            nutrients: food.nutrients.len(),
            input_foods: food.input_foods.len(),
        });
        self.inner.update(key, food).await
    }

    async fn dictionary_lookup(
        &self,
        namespace: &str,
        category: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ReferenceEntry>> {
        self.push(StoreEvent::Lookup(category.to_string()));
        self.inner
            .dictionary_lookup(namespace, category, offset, limit)
            .await
    }
}

/// Memory store whose reads return a snapshot and then stall
///
/// Two unguarded read-modify-write cycles started together both read the old
/// document before either writes.
pub struct DelayedStore {
    pub inner: MemoryStore,
    delay: Duration,
}

impl DelayedStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            delay,
        }
    }
}

#[async_trait]
impl DocumentStore for DelayedStore {
    async fn get(&self, key: &str) -> Result<Option<Food>> {
        let snapshot = self.inner.get(key).await?;
        tokio::time::sleep(self.delay).await;
        Ok(snapshot)
    }

    async fn update(&self, key: &str, food: &Food) -> Result<()> {
        self.inner.update(key, food).await
    }

    async fn dictionary_lookup(
        &self,
        namespace: &str,
        category: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ReferenceEntry>> {
        self.inner
            .dictionary_lookup(namespace, category, offset, limit)
            .await
    }
}

/// Memory store whose reference lookups always fail
#[derive(Default)]
pub struct FailingDictionaryStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for FailingDictionaryStore {
    async fn get(&self, key: &str) -> Result<Option<Food>> {
        self.inner.get(key).await
    }

    async fn update(&self, key: &str, food: &Food) -> Result<()> {
        self.inner.update(key, food).await
    }

    async fn dictionary_lookup(
        &self,
        _namespace: &str,
        _category: &str,
        _offset: usize,
        _limit: usize,
    ) -> Result<Vec<ReferenceEntry>> {
        Err(FdcError::store("reference lookup unavailable"))
    }
}
