//! Document store contract
//!
//! The ingest pipeline talks to its backing store only through [`DocumentStore`].
//! Each backend gets its own adapter:
//!
//! - [`MemoryStore`]: process-local maps, used by tests and dry runs
//! - [`FileStore`]: one JSON document per key under a directory tree
//!
//! `update` has full-document replace semantics. Writers that read a document,
//! change one field and write it back must go through [`SerializedStore`], which
//! holds a per-key lock across the get+update pair so that two writers touching
//! different fields of the same document cannot lose each other's change.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Food;

pub mod file;
pub mod memory;
pub mod serialized;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use serialized::SerializedStore;

/// Untyped reference document returned by a dictionary lookup.
///
/// Callers decode it into the concrete dictionary type for the category they asked for.
pub type ReferenceEntry = serde_json::Value;

/// Keyed food document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the document stored under `key`, `None` when it does not exist
    async fn get(&self, key: &str) -> Result<Option<Food>>;

    /// Replace (or create) the document stored under `key`
    async fn update(&self, key: &str, food: &Food) -> Result<()>;

    /// Page through reference entries of one category
    ///
    /// Returns at most `limit` entries starting at `offset`. A page shorter than
    /// `limit` means the category is exhausted.
    async fn dictionary_lookup(
        &self,
        namespace: &str,
        category: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ReferenceEntry>>;
}
