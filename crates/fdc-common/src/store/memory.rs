//! In-memory document store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{DocumentStore, ReferenceEntry};
use crate::error::Result;
use crate::types::Food;

/// Document store backed by process-local maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Food>>,
    references: RwLock<HashMap<(String, String), Vec<ReferenceEntry>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append reference entries to a dictionary category
    pub async fn insert_references(
        &self,
        namespace: &str,
        category: &str,
        entries: impl IntoIterator<Item = ReferenceEntry>,
    ) {
        self.references
            .write()
            .await
            .entry((namespace.to_string(), category.to_string()))
            .or_default()
            .extend(entries);
    }

    /// Number of `update` calls served so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Sorted list of stored keys
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.documents.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Food>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn update(&self, key: &str, food: &Food) -> Result<()> {
        self.documents
            .write()
            .await
            .insert(key.to_string(), food.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn dictionary_lookup(
        &self,
        namespace: &str,
        category: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ReferenceEntry>> {
        let references = self.references.read().await;
        let page = references
            .get(&(namespace.to_string(), category.to_string()))
            .map(|entries| entries.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(page)
    }
}
