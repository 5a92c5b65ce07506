//! Per-key serialized read-modify-write on top of any [`DocumentStore`]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{DocumentStore, ReferenceEntry};
use crate::error::Result;
use crate::types::Food;

/// Default number of lock stripes.
pub const DEFAULT_LOCK_STRIPES: usize = 64;

/// Store handle shared by all writers of one ingest run
///
/// `modify` holds a lock for the key across the get+update pair. Keys are hashed
/// onto a fixed set of stripes, so two different keys may occasionally wait on
/// each other, but two writers of the same key never interleave.
pub struct SerializedStore {
    inner: Arc<dyn DocumentStore>,
    stripes: Vec<Mutex<()>>,
}

impl SerializedStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self::with_stripes(inner, DEFAULT_LOCK_STRIPES)
    }

    pub fn with_stripes(inner: Arc<dyn DocumentStore>, stripes: usize) -> Self {
        Self {
            inner,
            stripes: (0..stripes.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &Arc<dyn DocumentStore> {
        &self.inner
    }

    /// Unlocked read
    pub async fn get(&self, key: &str) -> Result<Option<Food>> {
        self.inner.get(key).await
    }

    /// Replace the whole document under the key lock
    pub async fn put(&self, key: &str, food: &Food) -> Result<()> {
        let _guard = self.stripe(key).lock().await;
        self.inner.update(key, food).await
    }

    /// Fetch the document, apply `change` and write it back, all under the key lock
    ///
    /// Returns `false` without writing when no document exists for `key`.
    pub async fn modify<F>(&self, key: &str, change: F) -> Result<bool>
    where
        F: FnOnce(&mut Food) + Send,
    {
        let _guard = self.stripe(key).lock().await;
        let Some(mut food) = self.inner.get(key).await? else {
            return Ok(false);
        };
        change(&mut food);
        self.inner.update(key, &food).await?;
        Ok(true)
    }

    pub async fn dictionary_lookup(
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

    fn stripe(&self, key: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.stripes.len() as u64) as usize;
        &self.stripes[index]
    }
}
