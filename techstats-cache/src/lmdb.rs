//! LMDB-backed persistent store.
//!
//! Uses the heed crate (Rust bindings for LMDB). Entries survive restarts of
//! the dashboard, which is what lets a day-boundary policy skip the network
//! entirely on a second launch within the same day.
//!
//! Every call opens its own transaction: reads use a read transaction,
//! `set` and `remove` a write transaction committed before returning.

use std::path::Path;

use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};
use techstats_core::StoreError;

use crate::store::{CacheStore, StoreStats};

/// LMDB store holding one unnamed database of string keys and values.
pub struct LmdbStore {
    env: Env,
    db: Database<Str, Str>,
}

impl LmdbStore {
    /// Open (or create) a store under `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the directory cannot be created
    /// or the environment cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&path).map_err(|e| StoreError::Unavailable {
            reason: e.to_string(),
        })?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(unavailable)?;

        let mut wtxn = env.write_txn().map_err(unavailable)?;
        let db: Database<Str, Str> = env.create_database(&mut wtxn, None).map_err(unavailable)?;
        wtxn.commit().map_err(unavailable)?;

        tracing::debug!(path = %path.as_ref().display(), max_size_mb, "Opened LMDB cache store");
        Ok(Self { env, db })
    }
}

fn unavailable(e: heed::Error) -> StoreError {
    StoreError::Unavailable {
        reason: e.to_string(),
    }
}

impl CacheStore for LmdbStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let read_failed = |e: heed::Error| StoreError::ReadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };
        let rtxn = self.env.read_txn().map_err(read_failed)?;
        let value = self.db.get(&rtxn, key).map_err(read_failed)?;
        Ok(value.map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let write_failed = |e: heed::Error| StoreError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };
        let mut wtxn = self.env.write_txn().map_err(write_failed)?;
        self.db.put(&mut wtxn, key, value).map_err(write_failed)?;
        wtxn.commit().map_err(write_failed)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let write_failed = |e: heed::Error| StoreError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        };
        let mut wtxn = self.env.write_txn().map_err(write_failed)?;
        self.db.delete(&mut wtxn, key).map_err(write_failed)?;
        wtxn.commit().map_err(write_failed)
    }

    fn stats(&self) -> StoreStats {
        let Ok(rtxn) = self.env.read_txn() else {
            return StoreStats::default();
        };
        let Ok(iter) = self.db.iter(&rtxn) else {
            return StoreStats::default();
        };
        let mut stats = StoreStats::default();
        for (_, value) in iter.flatten() {
            stats.entry_count += 1;
            stats.size_bytes += value.len() as u64;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (LmdbStore, TempDir) {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        let store = LmdbStore::open(temp_dir.path(), 10).expect("store creation should succeed");
        (store, temp_dir)
    }

    #[test]
    fn test_set_get_remove() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.get("repo-counts_weekly").unwrap(), None);

        store.set("repo-counts_weekly", "{\"a\":1}").unwrap();
        assert_eq!(
            store.get("repo-counts_weekly").unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        store.remove("repo-counts_weekly").unwrap();
        assert_eq!(store.get("repo-counts_weekly").unwrap(), None);
        // Removing again is fine.
        store.remove("repo-counts_weekly").unwrap();
    }

    #[test]
    fn test_stats_count_entries_and_bytes() {
        let (store, _dir) = create_test_store();
        store.set("a", "123").unwrap();
        store.set("b", "45").unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(
            store.stats(),
            StoreStats {
                entry_count: 2,
                size_bytes: 3
            }
        );
    }

    #[test]
    fn test_entries_survive_reopen() {
        let temp_dir = TempDir::new().expect("TempDir creation should succeed");
        {
            let store = LmdbStore::open(temp_dir.path(), 10).unwrap();
            store.set("repo-list_all", "[]").unwrap();
        }
        let store = LmdbStore::open(temp_dir.path(), 10).unwrap();
        assert_eq!(store.get("repo-list_all").unwrap().as_deref(), Some("[]"));
    }
}
