//! Nutrient reference dictionary
//!
//! Nutrient values in the extracts only carry a nutrient number and a
//! derivation id. Names, units and derivation codes come from reference
//! entries in the store, fetched page by page before any nutrient rows are
//! read.

use fdc_common::store::DocumentStore;
use fdc_common::{Derivation, Nutrient};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};

/// Reference category holding nutrient definitions
pub const NUTRIENT_CATEGORY: &str = "NUT";

/// Reference category holding derivation codes
pub const DERIVATION_CATEGORY: &str = "DERV";

/// Nutrient definitions keyed by nutrient number, derivations keyed by id
#[derive(Debug, Clone, Default)]
pub struct NutrientDictionary {
    nutrients: HashMap<u32, Nutrient>,
    derivations: HashMap<u32, Derivation>,
}

impl NutrientDictionary {
    /// Fetch both categories from `namespace`, `page_size` entries at a time
    ///
    /// Entries that do not decode are logged and left out. Any lookup failure
    /// fails the whole load.
    pub async fn load(
        store: &dyn DocumentStore,
        namespace: &str,
        page_size: usize,
    ) -> Result<Self> {
        let nutrients: Vec<Nutrient> =
            fetch_category(store, namespace, NUTRIENT_CATEGORY, page_size).await?;
        let derivations: Vec<Derivation> =
            fetch_category(store, namespace, DERIVATION_CATEGORY, page_size).await?;

        let dictionary = Self::from_entries(nutrients, derivations);
        info!(
            namespace,
            nutrients = dictionary.nutrients.len(),
            derivations = dictionary.derivations.len(),
            "Loaded nutrient dictionary"
        );
        Ok(dictionary)
    }

    /// Build a dictionary from already decoded entries; later duplicates win
    pub fn from_entries(
        nutrients: impl IntoIterator<Item = Nutrient>,
        derivations: impl IntoIterator<Item = Derivation>,
    ) -> Self {
        Self {
            nutrients: nutrients
                .into_iter()
                .map(|nutrient| (nutrient.nutrientno, nutrient))
                .collect(),
            derivations: derivations
                .into_iter()
                .map(|derivation| (derivation.id, derivation))
                .collect(),
        }
    }

    pub fn nutrient(&self, number: u32) -> Option<&Nutrient> {
        self.nutrients.get(&number)
    }

    pub fn derivation(&self, id: u32) -> Option<&Derivation> {
        self.derivations.get(&id)
    }

    /// Number of nutrient definitions
    pub fn len(&self) -> usize {
        self.nutrients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nutrients.is_empty()
    }
}

async fn fetch_category<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    namespace: &str,
    category: &str,
    page_size: usize,
) -> Result<Vec<T>> {
    let page_size = page_size.max(1);
    let mut entries = Vec::new();
    let mut offset = 0;

    loop {
        let page = store
            .dictionary_lookup(namespace, category, offset, page_size)
            .await
            .map_err(|source| IngestError::Dictionary {
                category: category.to_string(),
                source,
            })?;

        let fetched = page.len();
        debug!(category, offset, fetched, "Fetched dictionary page");

        for entry in page {
            match serde_json::from_value::<T>(entry) {
                Ok(decoded) => entries.push(decoded),
                Err(e) => warn!(category, error = %e, "Skipping undecodable dictionary entry"),
            }
        }

        if fetched < page_size {
            break;
        }
        offset += fetched;
    }

    Ok(entries)
}
