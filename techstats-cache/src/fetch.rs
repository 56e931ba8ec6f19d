//! The fetch cache: persistent, validity-bounded, and de-duplicating.
//!
//! A read goes through three stages:
//!
//! 1. the persistent store, if it holds a valid entry for the key
//! 2. an in-flight request already issued for the same key, if any
//! 3. a new request to the data source, persisted on success
//!
//! No stage surfaces an error. An unconfigured backend, a failed request, or
//! a broken store all degrade to an empty payload plus a log line.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use techstats_core::{ApiEndpoints, Endpoint, Range, StoreError};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::entry::CacheEntry;
use crate::source::DataSource;
use crate::store::CacheStore;
use crate::validity::{CacheRead, ReadSource, ValidityPolicy};

type InFlight = Arc<OnceCell<CacheRead<Value>>>;

/// The payload every failure path resolves to.
pub fn empty_payload() -> Value {
    Value::Array(Vec::new())
}

/// Counters describing how reads were served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Reads served from a valid store entry.
    pub hits: u64,
    /// Reads that found no valid entry.
    pub misses: u64,
    /// Requests actually sent to the data source.
    pub network_calls: u64,
    /// Reads that joined a request already in flight.
    pub coalesced: u64,
    /// Requests that failed and resolved to an empty payload.
    pub failures: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    network_calls: AtomicU64,
    coalesced: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FetchStats {
        FetchStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            network_calls: self.network_calls.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Shared fetch cache. Wrap in an `Arc` and hand a clone to every consumer.
pub struct FetchCache {
    store: Arc<dyn CacheStore>,
    source: Arc<dyn DataSource>,
    clock: Arc<dyn Clock>,
    endpoints: ApiEndpoints,
    policy: ValidityPolicy,
    in_flight: Mutex<HashMap<String, InFlight>>,
    counters: Counters,
}

impl FetchCache {
    /// A cache with the system clock, the default day-boundary policy, and
    /// an unconfigured backend.
    pub fn new(store: Arc<dyn CacheStore>, source: Arc<dyn DataSource>) -> Self {
        Self {
            store,
            source,
            clock: Arc::new(SystemClock),
            endpoints: ApiEndpoints::unconfigured(),
            policy: ValidityPolicy::default(),
            in_flight: Mutex::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_endpoints(mut self, endpoints: ApiEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_policy(mut self, policy: ValidityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub fn policy(&self) -> ValidityPolicy {
        self.policy
    }

    pub fn stats(&self) -> FetchStats {
        self.counters.snapshot()
    }

    /// Number of keys with a request currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Payload for `(endpoint, range)` under the configured policy.
    pub async fn fetch_endpoint(&self, endpoint: Endpoint, range: Range) -> Value {
        self.read_endpoint(endpoint, range).await.into_value()
    }

    /// Like [`fetch_endpoint`](Self::fetch_endpoint), keeping provenance.
    pub async fn read_endpoint(&self, endpoint: Endpoint, range: Range) -> CacheRead<Value> {
        match self.endpoints.url(endpoint, range) {
            Some(url) => {
                self.read_with_cache(&url, &endpoint.cache_key(range), &self.policy)
                    .await
            }
            None => {
                debug!(endpoint = %endpoint, "Backend not configured, returning empty payload");
                CacheRead::empty(empty_payload(), ReadSource::Unconfigured)
            }
        }
    }

    /// Payload for `url`, cached under `cache_key` and valid per `policy`.
    ///
    /// Never fails: every error path yields [`empty_payload`].
    pub async fn fetch_with_cache(&self, url: &str, cache_key: &str, policy: &ValidityPolicy) -> Value {
        self.read_with_cache(url, cache_key, policy).await.into_value()
    }

    /// Like [`fetch_with_cache`](Self::fetch_with_cache), keeping provenance.
    pub async fn read_with_cache(
        &self,
        url: &str,
        cache_key: &str,
        policy: &ValidityPolicy,
    ) -> CacheRead<Value> {
        if url.trim().is_empty() {
            debug!(cache_key, "Backend not configured, returning empty payload");
            return CacheRead::empty(empty_payload(), ReadSource::Unconfigured);
        }

        if let Some(hit) = self.lookup(cache_key, policy) {
            Counters::bump(&self.counters.hits);
            debug!(cache_key, "Cache hit");
            return hit;
        }
        Counters::bump(&self.counters.misses);

        let (cell, joined) = self.in_flight_cell(cache_key);
        if joined {
            Counters::bump(&self.counters.coalesced);
            debug!(cache_key, "Joining in-flight request");
        }

        let read = cell
            .get_or_init(|| self.fetch_and_store(url, cache_key))
            .await
            .clone();

        self.settle(cache_key, &cell);
        read
    }

    /// Drop the stored entry for `cache_key` so the next read re-fetches.
    pub fn invalidate(&self, cache_key: &str) {
        if let Err(e) = self.store.remove(cache_key) {
            warn!(cache_key, error = %e, "Failed to invalidate cache entry");
        }
    }

    /// A valid stored payload, evicting whatever is stale or unreadable.
    fn lookup(&self, cache_key: &str, policy: &ValidityPolicy) -> Option<CacheRead<Value>> {
        let raw = match self.store.get(cache_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(cache_key, error = %e, "Cache store read failed, treating as miss");
                return None;
            }
        };

        match CacheEntry::decode(cache_key, &raw) {
            Ok(entry) => {
                let now = self.clock.now();
                match entry.written_at() {
                    Some(written_at) if policy.is_valid(written_at, now) => {
                        return Some(CacheRead::from_cache(entry.data, written_at));
                    }
                    _ => debug!(cache_key, "Cache entry expired"),
                }
            }
            Err(e) => warn!(cache_key, error = %e, "Discarding unreadable cache entry"),
        }
        self.evict(cache_key);
        None
    }

    fn evict(&self, cache_key: &str) {
        if let Err(e) = self.store.remove(cache_key) {
            warn!(cache_key, error = %e, "Failed to evict cache entry");
        }
    }

    /// The shared cell for `cache_key`, and whether it already existed.
    fn in_flight_cell(&self, cache_key: &str) -> (InFlight, bool) {
        let mut table = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match table.get(cache_key) {
            Some(cell) => (Arc::clone(cell), true),
            None => {
                let cell = InFlight::default();
                table.insert(cache_key.to_string(), Arc::clone(&cell));
                (cell, false)
            }
        }
    }

    /// Clear the table slot once the request has resolved, unless a newer
    /// request already replaced it.
    fn settle(&self, cache_key: &str, cell: &InFlight) {
        let mut table = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if table
            .get(cache_key)
            .is_some_and(|current| Arc::ptr_eq(current, cell))
        {
            table.remove(cache_key);
        }
    }

    async fn fetch_and_store(&self, url: &str, cache_key: &str) -> CacheRead<Value> {
        Counters::bump(&self.counters.network_calls);
        debug!(cache_key, url, "Fetching from data source");

        match self.source.fetch_json(url).await {
            Ok(data) => {
                let fetched_at = self.clock.now();
                if let Err(e) = self.persist(cache_key, CacheEntry::new(fetched_at, data.clone())) {
                    warn!(cache_key, error = %e, "Failed to persist cache entry");
                }
                CacheRead::from_network(data, fetched_at)
            }
            Err(e) => {
                Counters::bump(&self.counters.failures);
                warn!(cache_key, url, error = %e, "Fetch failed, returning empty payload");
                CacheRead::empty(empty_payload(), ReadSource::Failed)
            }
        }
    }

    fn persist(&self, cache_key: &str, entry: CacheEntry) -> Result<(), StoreError> {
        let raw = entry.encode(cache_key)?;
        self.store.set(cache_key, &raw)
    }
}
