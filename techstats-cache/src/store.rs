//! Persistent key-value store behind the fetch cache.

use techstats_core::StoreError;

/// A string key-value store with synchronous get/set/remove.
///
/// The fetch cache tolerates every error this trait reports: a failed read
/// is a miss and a failed write only costs a future re-fetch. Implementations
/// must be safe to share across tasks.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    fn stats(&self) -> StoreStats;
}

/// Size statistics of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of entries currently stored.
    pub entry_count: u64,
    /// Total bytes of stored values.
    pub size_bytes: u64,
}
