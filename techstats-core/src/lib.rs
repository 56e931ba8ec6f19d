//! Tech-stats Core - Data Model
//!
//! Pure data types shared by the fetch cache, the series reconciler, and the
//! terminal dashboard. Payload normalization lives here so that every other
//! crate sees canonical `TimeSeriesPoint`s only.

pub mod endpoint;
pub mod error;
pub mod range;
pub mod series;
pub mod week;
pub mod wire;

pub use endpoint::{ApiEndpoints, Endpoint, DEFAULT_API_PREFIX};
pub use error::{ConfigError, SourceError, StoreError, TechStatsError, TechStatsResult, WireError};
pub use range::{Range, RepoMetric};
pub use series::{ComparisonSeries, RepoListing, SeriesKey, TimeSeriesPoint};
pub use week::{decode_date, format_label, iso_week_monday, parse_iso_week};
pub use wire::{normalize_comparison, normalize_counts, normalize_repo_list, TOTAL_KEY};

/// Epoch milliseconds, the timestamp unit of persisted cache entries.
pub type EpochMillis = i64;
