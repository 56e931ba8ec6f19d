//! Tech-stats fetch cache.
//!
//! Serves upstream payloads for an `(endpoint, range)` pair while keeping
//! network traffic down:
//!
//! - a persistent [`CacheStore`] keeps payloads across restarts, each one
//!   servable for as long as its [`ValidityPolicy`] allows
//! - concurrent reads of the same key share one request
//! - reads never fail; every error path degrades to an empty payload
//!
//! # Example
//!
//! ```ignore
//! let cache = FetchCache::new(Arc::new(MemoryStore::new()), Arc::new(source))
//!     .with_endpoints(ApiEndpoints::new(Some("https://stats.example.com"), DEFAULT_API_PREFIX))
//!     .with_policy(ValidityPolicy::ttl(30));
//!
//! let payload = cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
//! ```

pub mod clock;
pub mod entry;
pub mod fetch;
pub mod lmdb;
pub mod memory;
pub mod source;
pub mod store;
pub mod validity;

pub use clock::{Clock, SystemClock};
pub use entry::CacheEntry;
pub use fetch::{empty_payload, FetchCache, FetchStats};
pub use lmdb::LmdbStore;
pub use memory::MemoryStore;
pub use source::{DataSource, HttpSource};
pub use store::{CacheStore, StoreStats};
pub use validity::{CacheRead, ReadSource, ValidityPolicy, DEFAULT_CUTOVER_HOUR, DEFAULT_UTC_OFFSET_HOURS};
