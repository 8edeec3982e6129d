//! # Key-Value Persistence Port
//!
//! The dashboard keeps a little state outside the service (the latest
//! classification). It goes through `KeyValueStore`, whole values only,
//! last writer wins.
//!
//! Two implementations:
//! - `MemoryStore`: process-local, for tests and ephemeral sessions
//! - `RedbStore`: disk-backed via redb, survives restarts

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::types::ExoError;

/// String-keyed store of string values.
///
/// Implementations must be usable from several tasks at once, so every
/// method takes `&self`.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, ExoError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), ExoError>;

    /// Delete `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool, ExoError>;

    /// Delete every key.
    fn clear(&self) -> Result<(), ExoError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, ExoError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ExoError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<bool, ExoError> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<(), ExoError> {
        (**self).clear()
    }
}
