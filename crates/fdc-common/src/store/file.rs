//! Directory-backed JSON document store
//!
//! # Layout
//! ```text
//! <root>/<bucket>/foods/<key>.json                  one food document per key
//! <root>/<namespace>/dictionary/<category>.json     JSON array of reference entries
//! ```
//!
//! Documents are written to a sibling temp file and renamed into place, so a
//! reader never observes a half-written document.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{DocumentStore, ReferenceEntry};
use crate::error::{FdcError, Result};
use crate::types::Food;

const FOODS_DIR: &str = "foods";
const DICTIONARY_DIR: &str = "dictionary";

/// Document store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    bucket: String,
}

impl FileStore {
    /// Open (and create if needed) the document directory for `bucket`
    pub async fn open(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Result<Self> {
        let store = Self {
            root: root.into(),
            bucket: bucket.into(),
        };
        validate_segment(&store.bucket)?;
        tokio::fs::create_dir_all(store.foods_dir()).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Replace the reference entries of one dictionary category
    pub async fn write_dictionary(
        &self,
        namespace: &str,
        category: &str,
        entries: &[ReferenceEntry],
    ) -> Result<()> {
        let path = self.dictionary_path(namespace, category)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_atomic(&path, &serde_json::to_vec_pretty(entries)?).await
    }

    fn foods_dir(&self) -> PathBuf {
        self.root.join(&self.bucket).join(FOODS_DIR)
    }

    fn document_path(&self, key: &str) -> Result<PathBuf> {
        validate_segment(key)?;
        Ok(self.foods_dir().join(format!("{key}.json")))
    }

    fn dictionary_path(&self, namespace: &str, category: &str) -> Result<PathBuf> {
        validate_segment(namespace)?;
        validate_segment(category)?;
        Ok(self
            .root
            .join(namespace)
            .join(DICTIONARY_DIR)
            .join(format!("{category}.json")))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Food>> {
        let path = self.document_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, key: &str, food: &Food) -> Result<()> {
        let path = self.document_path(key)?;
        write_atomic(&path, &serde_json::to_vec(food)?).await
    }

    async fn dictionary_lookup(
        &self,
        namespace: &str,
        category: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ReferenceEntry>> {
        let path = self.dictionary_path(namespace, category)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No dictionary file for category");
                return Ok(Vec::new());
            },
            Err(e) => return Err(e.into()),
        };

        let entries: Vec<ReferenceEntry> = serde_json::from_slice(&bytes)?;
        Ok(entries.into_iter().skip(offset).take(limit).collect())
    }
}

/// Keys and namespaces become path segments, so they must not escape the tree.
fn validate_segment(segment: &str) -> Result<()> {
    let escapes = segment.is_empty()
        || segment.starts_with('.')
        || segment.contains(['/', '\\', '\0'])
        || segment.contains("..");
    if escapes {
        return Err(FdcError::InvalidKey(segment.to_string()));
    }
    Ok(())
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
