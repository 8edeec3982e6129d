//! # Classification History
//!
//! The most recent classification is stored as one JSON document under
//! `LAST_CLASSIFICATION_KEY`. Every save overwrites it; readers on other
//! pages use it instead of asking the service again.

use crate::primitives::LAST_CLASSIFICATION_KEY;
use crate::storage::KeyValueStore;
use crate::types::{ClassificationHistoryEntry, ExoError};

/// Typed access to the latest classification in a `KeyValueStore`.
#[derive(Debug, Clone)]
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the stored entry.
    pub fn save_last(&self, entry: &ClassificationHistoryEntry) -> Result<(), ExoError> {
        let json =
            serde_json::to_string(entry).map_err(|e| ExoError::Serialization(e.to_string()))?;
        self.store.set(LAST_CLASSIFICATION_KEY, &json)
    }

    /// Read the stored entry, if any.
    pub fn load_last(&self) -> Result<Option<ClassificationHistoryEntry>, ExoError> {
        self.store
            .get(LAST_CLASSIFICATION_KEY)?
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| ExoError::Serialization(e.to_string()))
            })
            .transpose()
    }

    /// Forget the stored entry. Returns whether one existed.
    pub fn clear_last(&self) -> Result<bool, ExoError> {
        self.store.remove(LAST_CLASSIFICATION_KEY)
    }
}
