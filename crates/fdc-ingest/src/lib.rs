//! FDC Ingest Library
//!
//! Builds merged food documents from the FNDDS survey food extracts.
//!
//! # Pipeline
//!
//! - **Seed**: `food.csv` writes one base document per food
//! - **Join**: portions, nutrient values and recipe ingredients are streamed
//!   concurrently, grouped by food id, and written into their own collection
//! - **Dictionary**: nutrient names, units and derivation codes resolved from
//!   reference entries in the store
//!
//! # Example
//!
//! ```no_run
//! use fdc_common::store::FileStore;
//! use fdc_ingest::{config::IngestConfig, fndds::FnddsIngest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::from_env()?;
//!     let store = FileStore::open(&config.store_dir, &config.bucket).await?;
//!
//!     let report = FnddsIngest::new(config, Arc::new(store)).run().await?;
//!     println!("{}", report.into_result()?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dictionary;
pub mod error;
pub mod fndds;
pub mod join;
pub mod progress;
pub mod tabular;

mod fields;

pub use error::{IngestError, Result};
