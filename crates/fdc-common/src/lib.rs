//! FDC Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, store contract and logging for the food data ingest workspace.
//!
//! # Overview
//!
//! - **Types**: the merged food document and its reference dictionaries
//! - **Store**: the [`store::DocumentStore`] contract plus memory and file adapters
//! - **Error Handling**: [`FdcError`] and the [`Result`] alias
//! - **Logging**: `tracing` subscriber setup shared by every binary
//!
//! # Example
//!
//! ```no_run
//! use fdc_common::store::{DocumentStore, FileStore};
//!
//! # async fn run() -> fdc_common::Result<()> {
//! let store = FileStore::open("./data/store", "gnutdata").await?;
//! if let Some(food) = store.get("11111000").await? {
//!     println!("{} has {} nutrients", food.description, food.nutrients.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod logging;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{FdcError, Result};
pub use types::{Derivation, Food, InputFood, Nutrient, NutrientData, Serving};
