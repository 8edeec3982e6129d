//! In-memory `KeyValueStore`.

use super::KeyValueStore;
use crate::types::ExoError;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Process-local store backed by a `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock still guards a consistent map: every write is a
    // single insert or remove.
    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ExoError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ExoError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, ExoError> {
        Ok(self.entries().remove(key).is_some())
    }

    fn clear(&self) -> Result<(), ExoError> {
        self.entries().clear();
        Ok(())
    }
}
