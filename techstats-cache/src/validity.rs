//! Validity policies for cached payloads.
//!
//! Callers pick how long a cached payload may be served before it has to be
//! fetched again. Two policies are supported:
//!
//! - a fixed time-to-live measured from the write
//! - "valid until the next day boundary", where the boundary is a cutover
//!   hour in a fixed UTC offset, so every client agrees on it regardless of
//!   the machine's own timezone

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Default UTC offset of the day-boundary policy, in hours.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 1;

/// Default cutover hour of the day-boundary policy (local midnight).
pub const DEFAULT_CUTOVER_HOUR: u32 = 0;

/// How long a cache entry stays servable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidityPolicy {
    /// Valid for `minutes` after the write.
    Ttl { minutes: u32 },

    /// Valid until the next `cutover_hour:00` at `UTC+utc_offset_hours`.
    DayBoundary {
        cutover_hour: u32,
        utc_offset_hours: i32,
    },
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self::DayBoundary {
            cutover_hour: DEFAULT_CUTOVER_HOUR,
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl ValidityPolicy {
    pub fn ttl(minutes: u32) -> Self {
        Self::Ttl { minutes }
    }

    pub fn day_boundary(cutover_hour: u32, utc_offset_hours: i32) -> Self {
        Self::DayBoundary {
            cutover_hour,
            utc_offset_hours,
        }
    }

    /// Most recent boundary crossing at or before `now`.
    ///
    /// Returns `None` for TTL policies and for out-of-range parameters.
    pub fn last_boundary(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let Self::DayBoundary {
            cutover_hour,
            utc_offset_hours,
        } = *self
        else {
            return None;
        };
        let offset = FixedOffset::east_opt(utc_offset_hours.checked_mul(3600)?)?;
        let cutover = NaiveTime::from_hms_opt(cutover_hour, 0, 0)?;
        let local = now.with_timezone(&offset);
        let mut day = local.date_naive();
        if local.time() < cutover {
            day = day.pred_opt()?;
        }
        let boundary = offset.from_local_datetime(&day.and_time(cutover)).single()?;
        Some(boundary.with_timezone(&Utc))
    }

    /// Whether a payload written at `written_at` may still be served at `now`.
    ///
    /// Misconfigured day-boundary parameters make every entry stale.
    pub fn is_valid(&self, written_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::Ttl { minutes } => now - written_at < Duration::minutes(i64::from(*minutes)),
            Self::DayBoundary { .. } => match self.last_boundary(now) {
                Some(boundary) => written_at >= boundary,
                None => false,
            },
        }
    }
}

/// Where a [`CacheRead`] value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    /// Served from the persistent store without a network call.
    Cache,
    /// Fetched from the data source and persisted.
    Network,
    /// No backend is configured; the value is empty.
    Unconfigured,
    /// The fetch failed; the value is empty.
    Failed,
}

/// Result of a cache read, carrying provenance metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRead<T> {
    value: T,
    cached_at: Option<DateTime<Utc>>,
    source: ReadSource,
}

impl<T> CacheRead<T> {
    pub fn from_cache(value: T, cached_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at: Some(cached_at),
            source: ReadSource::Cache,
        }
    }

    pub fn from_network(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            value,
            cached_at: Some(fetched_at),
            source: ReadSource::Network,
        }
    }

    pub fn empty(value: T, source: ReadSource) -> Self {
        Self {
            value,
            cached_at: None,
            source,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn source(&self) -> ReadSource {
        self.source
    }

    /// When the payload was written, or `None` for empty results.
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.cached_at
    }

    pub fn was_cache_hit(&self) -> bool {
        self.source == ReadSource::Cache
    }

    /// Age of the payload at `now`.
    pub fn staleness(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.cached_at.map(|at| (now - at).max(Duration::zero()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_ttl_window() {
        let policy = ValidityPolicy::ttl(30);
        let written = utc(2025, 3, 1, 12, 0);
        assert!(policy.is_valid(written, written + Duration::minutes(29)));
        assert!(!policy.is_valid(written, written + Duration::minutes(30)));
        assert!(!policy.is_valid(written, written + Duration::minutes(31)));
    }

    #[test]
    fn test_default_policy_is_midnight_utc_plus_one() {
        assert_eq!(
            ValidityPolicy::default(),
            ValidityPolicy::day_boundary(0, 1)
        );
    }

    #[test]
    fn test_last_boundary_before_and_after_cutover() {
        let policy = ValidityPolicy::day_boundary(0, 1);
        // 22:30 UTC is 23:30 at UTC+1, so the last boundary is the previous
        // local midnight: 23:00 UTC the day before.
        assert_eq!(
            policy.last_boundary(utc(2025, 3, 1, 22, 30)),
            Some(utc(2025, 2, 28, 23, 0))
        );
        // 23:10 UTC is 00:10 local on the next day.
        assert_eq!(
            policy.last_boundary(utc(2025, 3, 1, 23, 10)),
            Some(utc(2025, 3, 1, 23, 0))
        );
    }

    #[test]
    fn test_day_boundary_invalidates_within_the_hour() {
        let policy = ValidityPolicy::day_boundary(0, 1);
        // Written at 23:30 local, checked 31 minutes later at 00:01 local.
        let written = utc(2025, 3, 1, 22, 30);
        assert!(policy.is_valid(written, utc(2025, 3, 1, 22, 59)));
        assert!(!policy.is_valid(written, utc(2025, 3, 1, 23, 1)));
    }

    #[test]
    fn test_day_boundary_with_non_midnight_cutover() {
        let policy = ValidityPolicy::day_boundary(6, 0);
        let written = utc(2025, 3, 1, 5, 0);
        assert!(policy.is_valid(written, utc(2025, 3, 1, 5, 59)));
        assert!(!policy.is_valid(written, utc(2025, 3, 1, 6, 0)));
    }

    #[test]
    fn test_invalid_parameters_mean_stale() {
        let policy = ValidityPolicy::day_boundary(25, 1);
        let now = utc(2025, 3, 1, 12, 0);
        assert!(policy.last_boundary(now).is_none());
        assert!(!policy.is_valid(now, now));
    }

    #[test]
    fn test_policy_serde_tagged() {
        let policy: ValidityPolicy =
            serde_json::from_str(r#"{"kind":"ttl","minutes":15}"#).unwrap();
        assert_eq!(policy, ValidityPolicy::ttl(15));
        let policy: ValidityPolicy = serde_json::from_str(
            r#"{"kind":"day_boundary","cutover_hour":0,"utc_offset_hours":1}"#,
        )
        .unwrap();
        assert_eq!(policy, ValidityPolicy::default());
    }

    #[test]
    fn test_cache_read_provenance() {
        let at = utc(2025, 3, 1, 12, 0);
        let read = CacheRead::from_cache(1, at);
        assert!(read.was_cache_hit());
        assert_eq!(read.staleness(at + Duration::minutes(5)), Some(Duration::minutes(5)));

        let empty = CacheRead::empty(0, ReadSource::Unconfigured);
        assert!(!empty.was_cache_hit());
        assert!(empty.cached_at().is_none());
    }
}
