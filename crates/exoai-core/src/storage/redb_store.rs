//! # redb-backed Key-Value Store
//!
//! A single `kv` table of `&str -> &str` in an embedded redb database.
//! Each `set`/`remove`/`clear` is its own write transaction, so a value is
//! either fully replaced or untouched.

use super::KeyValueStore;
use crate::types::ExoError;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Table for entries: key -> value
const ENTRIES: TableDefinition<&str, &str> = TableDefinition::new("kv");

fn storage_err(e: impl std::fmt::Display) -> ExoError {
    ExoError::Storage(e.to_string())
}

/// Disk-backed `KeyValueStore`.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExoError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Create the table up front so read transactions never miss it.
        let write_txn = db.begin_write().map_err(storage_err)?;
        {
            let _ = write_txn.open_table(ENTRIES).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<String>, ExoError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(ENTRIES).map_err(storage_err)?;
        let value = table
            .get(key)
            .map_err(storage_err)?
            .map(|v| v.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ExoError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(ENTRIES).map_err(storage_err)?;
            table.insert(key, value).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)
    }

    fn remove(&self, key: &str) -> Result<bool, ExoError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        let existed = {
            let mut table = write_txn.open_table(ENTRIES).map_err(storage_err)?;
            table.remove(key).map_err(storage_err)?.is_some()
        };
        write_txn.commit().map_err(storage_err)?;
        Ok(existed)
    }

    fn clear(&self) -> Result<(), ExoError> {
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        write_txn.delete_table(ENTRIES).map_err(storage_err)?;
        {
            let _ = write_txn.open_table(ENTRIES).map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)
    }
}
