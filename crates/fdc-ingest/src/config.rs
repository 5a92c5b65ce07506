//! Configuration for the FNDDS ingest
//!
//! Values come from defaults, then environment variables (a `.env` file is
//! honoured), then whatever the CLI overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::fndds::{FoodColumns, InputFoodColumns, NutrientColumns, ServingColumns};

// ============================================================================
// Ingest Configuration Constants
// ============================================================================

/// Directory holding the four extract files
pub const DEFAULT_DATA_DIR: &str = "./data/fndds";

/// Root directory of the file-backed document store
pub const DEFAULT_STORE_DIR: &str = "./data/store";

/// Store bucket that receives the food documents
pub const DEFAULT_BUCKET: &str = "gnutdata";

/// Store namespace holding the nutrient and derivation dictionaries
pub const DEFAULT_DICTIONARY_NAMESPACE: &str = "gnutdata";

/// Source label stamped on every seeded food
pub const DEFAULT_SOURCE: &str = "FNDDS";

/// Dictionary entries fetched per lookup page
pub const DEFAULT_DICTIONARY_PAGE_SIZE: usize = 500;

pub const DEFAULT_FOOD_PROGRESS_INTERVAL: u64 = 1_000;
pub const DEFAULT_SERVING_PROGRESS_INTERVAL: u64 = 10_000;
pub const DEFAULT_NUTRIENT_PROGRESS_INTERVAL: u64 = 30_000;
pub const DEFAULT_INPUT_FOOD_PROGRESS_INTERVAL: u64 = 10_000;

/// Primary extract: one row per food
pub const FOOD_FILE: &str = "food.csv";
/// Household portions, joined into servings
pub const SERVING_FILE: &str = "food_portion.csv";
/// Nutrient values, joined into nutrients
pub const NUTRIENT_FILE: &str = "food_nutrient.csv";
/// Recipe ingredients, joined into input foods
pub const INPUT_FOOD_FILE: &str = "input_food.csv";

/// How often (in rows) each loader logs its progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressIntervals {
    pub foods: u64,
    pub servings: u64,
    pub nutrients: u64,
    pub input_foods: u64,
}

impl Default for ProgressIntervals {
    fn default() -> Self {
        Self {
            foods: DEFAULT_FOOD_PROGRESS_INTERVAL,
            servings: DEFAULT_SERVING_PROGRESS_INTERVAL,
            nutrients: DEFAULT_NUTRIENT_PROGRESS_INTERVAL,
            input_foods: DEFAULT_INPUT_FOOD_PROGRESS_INTERVAL,
        }
    }
}

/// Column positions of each extract, for exports that reorder columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayouts {
    pub foods: FoodColumns,
    pub servings: ServingColumns,
    pub nutrients: NutrientColumns,
    pub input_foods: InputFoodColumns,
}

/// Ingest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory holding `food.csv` and the three dependent extracts
    pub data_dir: PathBuf,

    /// Root directory of the file-backed store
    pub store_dir: PathBuf,

    /// Bucket that receives the food documents
    pub bucket: String,

    /// Namespace passed to dictionary lookups
    pub dictionary_namespace: String,

    /// Source label written to every seeded food
    pub source: String,

    /// Page size for dictionary lookups, must be positive
    pub dictionary_page_size: usize,

    /// Whether every extract starts with a header row
    pub has_headers: bool,

    #[serde(default)]
    pub progress: ProgressIntervals,

    #[serde(default)]
    pub columns: ColumnLayouts,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            bucket: DEFAULT_BUCKET.to_string(),
            dictionary_namespace: DEFAULT_DICTIONARY_NAMESPACE.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            dictionary_page_size: DEFAULT_DICTIONARY_PAGE_SIZE,
            has_headers: true,
            progress: ProgressIntervals::default(),
            columns: ColumnLayouts::default(),
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from environment variables
    ///
    /// Reads `FDC_DATA_DIR`, `FDC_STORE_DIR`, `FDC_BUCKET`,
    /// `FDC_DICTIONARY_NAMESPACE`, `FDC_SOURCE`, `FDC_DICTIONARY_PAGE_SIZE`,
    /// `FDC_HAS_HEADERS` and the `FDC_*_PROGRESS_INTERVAL` family. Numbers that
    /// fail to parse keep their default.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::new();

        if let Ok(dir) = std::env::var("FDC_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("FDC_STORE_DIR") {
            config.store_dir = PathBuf::from(dir);
        }
        if let Ok(bucket) = std::env::var("FDC_BUCKET") {
            config.bucket = bucket;
        }
        if let Ok(namespace) = std::env::var("FDC_DICTIONARY_NAMESPACE") {
            config.dictionary_namespace = namespace;
        }
        if let Ok(source) = std::env::var("FDC_SOURCE") {
            config.source = source;
        }

        config.dictionary_page_size =
            env_parse("FDC_DICTIONARY_PAGE_SIZE", config.dictionary_page_size);
        config.has_headers = env_parse("FDC_HAS_HEADERS", config.has_headers);

        config.progress = ProgressIntervals {
            foods: env_parse("FDC_FOOD_PROGRESS_INTERVAL", config.progress.foods),
            servings: env_parse("FDC_SERVING_PROGRESS_INTERVAL", config.progress.servings),
            nutrients: env_parse("FDC_NUTRIENT_PROGRESS_INTERVAL", config.progress.nutrients),
            input_foods: env_parse(
                "FDC_INPUT_FOOD_PROGRESS_INTERVAL",
                config.progress.input_foods,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = dir.into();
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_dictionary_page_size(mut self, page_size: usize) -> Self {
        self.dictionary_page_size = page_size;
        self
    }

    pub fn with_columns(mut self, columns: ColumnLayouts) -> Self {
        self.columns = columns;
        self
    }

    /// Reject settings the loaders cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.dictionary_page_size == 0 {
            return Err(IngestError::config("dictionary page size must be positive"));
        }
        if self.source.trim().is_empty() {
            return Err(IngestError::config("source label must not be empty"));
        }
        if self.bucket.trim().is_empty() {
            return Err(IngestError::config("bucket must not be empty"));
        }
        if self.dictionary_namespace.trim().is_empty() {
            return Err(IngestError::config("dictionary namespace must not be empty"));
        }
        let intervals = [
            self.progress.foods,
            self.progress.servings,
            self.progress.nutrients,
            self.progress.input_foods,
        ];
        if intervals.contains(&0) {
            return Err(IngestError::config("progress intervals must be positive"));
        }
        Ok(())
    }

    pub fn food_file(&self) -> PathBuf {
        self.data_file(FOOD_FILE)
    }

    pub fn serving_file(&self) -> PathBuf {
        self.data_file(SERVING_FILE)
    }

    pub fn nutrient_file(&self) -> PathBuf {
        self.data_file(NUTRIENT_FILE)
    }

    pub fn input_food_file(&self) -> PathBuf {
        self.data_file(INPUT_FOOD_FILE)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "FDC_DATA_DIR",
        "FDC_STORE_DIR",
        "FDC_BUCKET",
        "FDC_DICTIONARY_NAMESPACE",
        "FDC_SOURCE",
        "FDC_DICTIONARY_PAGE_SIZE",
        "FDC_HAS_HEADERS",
        "FDC_NUTRIENT_PROGRESS_INTERVAL",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = IngestConfig::default();
        assert_eq!(config.bucket, "gnutdata");
        assert_eq!(config.dictionary_namespace, "gnutdata");
        assert_eq!(config.source, "FNDDS");
        assert_eq!(config.dictionary_page_size, 500);
        assert!(config.has_headers);
        assert_eq!(config.progress.nutrients, 30_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_paths() {
        let config = IngestConfig::new().with_data_dir("/tmp/fndds");
        assert_eq!(config.food_file(), PathBuf::from("/tmp/fndds/food.csv"));
        assert_eq!(
            config.nutrient_file(),
            PathBuf::from("/tmp/fndds/food_nutrient.csv")
        );
    }

    #[test]
    fn test_partial_column_layout_from_json() {
        let json = r#"{
            "data_dir": "/srv/fndds",
            "store_dir": "/srv/store",
            "bucket": "gnutdata",
            "dictionary_namespace": "gnutdata",
            "source": "FNDDS",
            "dictionary_page_size": 500,
            "has_headers": true,
            "columns": { "servings": { "gram_weight": 9 } }
        }"#;
        let config: IngestConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.columns.servings.gram_weight, 9);
        assert_eq!(config.columns.servings.fdc_id, 1);
        assert_eq!(config.columns.foods, FoodColumns::default());
        assert_eq!(config.progress, ProgressIntervals::default());
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let config = IngestConfig::new().with_dictionary_page_size(0);
        assert!(matches!(config.validate(), Err(IngestError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_blank_source() {
        let config = IngestConfig::new().with_source("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("FDC_DATA_DIR", "/srv/fndds");
        std::env::set_var("FDC_SOURCE", "FNDDS-2019");
        std::env::set_var("FDC_DICTIONARY_PAGE_SIZE", "50");
        std::env::set_var("FDC_HAS_HEADERS", "false");
        std::env::set_var("FDC_NUTRIENT_PROGRESS_INTERVAL", "not-a-number");

        let config = IngestConfig::from_env().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/fndds"));
        assert_eq!(config.source, "FNDDS-2019");
        assert_eq!(config.dictionary_page_size, 50);
        assert!(!config.has_headers);
        assert_eq!(config.progress.nutrients, DEFAULT_NUTRIENT_PROGRESS_INTERVAL);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_page_size() {
        clear_env();
        std::env::set_var("FDC_DICTIONARY_PAGE_SIZE", "0");

        assert!(IngestConfig::from_env().is_err());

        clear_env();
    }
}
