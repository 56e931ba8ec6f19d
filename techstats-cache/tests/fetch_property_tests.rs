use chrono::Duration;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use techstats_cache::{
    CacheEntry, CacheStore, FetchCache, LmdbStore, MemoryStore, ReadSource, ValidityPolicy,
};
use techstats_core::{Endpoint, Range};
use techstats_test_utils::generators::arb_policy;
use techstats_test_utils::{
    endpoint_url, fixtures, test_endpoints, FailingStore, ManualClock, MockDataSource,
};
use tempfile::TempDir;

const KEY: &str = "repo-counts_weekly";

fn cache_with(
    store: Arc<dyn CacheStore>,
    source: Arc<MockDataSource>,
    clock: Arc<ManualClock>,
    policy: ValidityPolicy,
) -> FetchCache {
    FetchCache::new(store, source)
        .with_clock(clock)
        .with_endpoints(test_endpoints())
        .with_policy(policy)
}

fn topics_url() -> String {
    endpoint_url(Endpoint::RepoCounts, Range::Weekly)
}

#[tokio::test]
async fn concurrent_reads_share_one_request() {
    let (source, gate) = MockDataSource::gated();
    let source = Arc::new(source.with_response(topics_url(), fixtures::weekly_topic_counts()));
    let clock = Arc::new(ManualClock::at("2025-03-10T12:00:00Z"));
    let cache = cache_with(
        Arc::new(MemoryStore::new()),
        Arc::clone(&source),
        clock,
        ValidityPolicy::ttl(30),
    );

    let (a, b, ()) = tokio::join!(
        cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly),
        cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly),
        async {
            tokio::task::yield_now().await;
            gate.release(1);
        }
    );

    assert_eq!(a, fixtures::weekly_topic_counts());
    assert_eq!(a, b);
    assert_eq!(source.call_count(), 1);
    let stats = cache.stats();
    assert_eq!(stats.network_calls, 1);
    assert_eq!(stats.coalesced, 1);
    assert_eq!(cache.in_flight_count(), 0);
}

#[tokio::test]
async fn ttl_entry_served_until_expiry() {
    let source = Arc::new(MockDataSource::new().with_response(topics_url(), json!([{"date": "2025-W01", "a": 1}])));
    let clock = Arc::new(ManualClock::at("2025-03-10T12:00:00Z"));
    let cache = cache_with(
        Arc::new(MemoryStore::new()),
        Arc::clone(&source),
        Arc::clone(&clock),
        ValidityPolicy::ttl(30),
    );

    cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    clock.advance(Duration::minutes(29));
    let read = cache.read_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(read.source(), ReadSource::Cache);
    assert_eq!(source.call_count(), 1);

    clock.advance(Duration::minutes(2));
    source.respond(topics_url(), json!([{"date": "2025-W02", "a": 2}]));
    let refreshed = cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(source.call_count(), 2);
    assert_eq!(refreshed, json!([{"date": "2025-W02", "a": 2}]));
}

#[tokio::test]
async fn day_boundary_entry_expires_at_local_midnight() {
    let source = Arc::new(MockDataSource::new().with_response(topics_url(), fixtures::weekly_topic_counts()));
    let clock = Arc::new(ManualClock::at("2025-03-10T23:30:00+01:00"));
    let cache = cache_with(
        Arc::new(MemoryStore::new()),
        Arc::clone(&source),
        Arc::clone(&clock),
        ValidityPolicy::day_boundary(0, 1),
    );

    cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    clock.advance(Duration::minutes(29));
    cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(source.call_count(), 1);

    clock.advance(Duration::minutes(2));
    let read = cache.read_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(read.source(), ReadSource::Network);
    assert_eq!(source.call_count(), 2);
}

#[tokio::test]
async fn corrupt_entry_is_a_miss_and_gets_replaced() {
    let store = Arc::new(MemoryStore::new());
    store.set(KEY, "{not json").unwrap();
    let source = Arc::new(MockDataSource::new().with_response(topics_url(), fixtures::weekly_topic_counts()));
    let cache = cache_with(
        store.clone(),
        Arc::clone(&source),
        Arc::new(ManualClock::at("2025-03-10T12:00:00Z")),
        ValidityPolicy::ttl(30),
    );

    let payload = cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(payload, fixtures::weekly_topic_counts());
    assert_eq!(source.call_count(), 1);

    let raw = store.get(KEY).unwrap().unwrap();
    let entry = CacheEntry::decode(KEY, &raw).unwrap();
    assert_eq!(entry.data, fixtures::weekly_topic_counts());
}

#[tokio::test]
async fn unconfigured_backend_returns_empty_without_requests() {
    let source = Arc::new(MockDataSource::new());
    let cache = FetchCache::new(Arc::new(MemoryStore::new()), source.clone());

    let read = cache.read_endpoint(Endpoint::PrimaryLanguages, Range::Monthly).await;
    assert_eq!(read.source(), ReadSource::Unconfigured);
    assert_eq!(read.into_value(), json!([]));

    let blank = cache
        .fetch_with_cache("  ", "anything", &ValidityPolicy::ttl(5))
        .await;
    assert_eq!(blank, json!([]));
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn failed_request_is_empty_and_not_cached() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(MockDataSource::new());
    source.fail(topics_url(), 503);
    let cache = cache_with(
        store.clone(),
        Arc::clone(&source),
        Arc::new(ManualClock::at("2025-03-10T12:00:00Z")),
        ValidityPolicy::ttl(30),
    );

    let read = cache.read_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(read.source(), ReadSource::Failed);
    assert_eq!(read.into_value(), json!([]));
    assert!(store.is_empty());

    cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(source.call_count(), 2);
    assert_eq!(cache.stats().failures, 2);
}

#[tokio::test]
async fn store_write_failure_still_returns_data() {
    let source = Arc::new(MockDataSource::new().with_response(topics_url(), fixtures::weekly_topic_counts()));
    let cache = cache_with(
        Arc::new(FailingStore::failing_writes()),
        Arc::clone(&source),
        Arc::new(ManualClock::at("2025-03-10T12:00:00Z")),
        ValidityPolicy::ttl(30),
    );

    let payload = cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(payload, fixtures::weekly_topic_counts());
    cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(source.call_count(), 2);
}

#[tokio::test]
async fn store_read_failure_falls_through_to_network() {
    let store = Arc::new(FailingStore::new());
    store.set_fail_reads(true);
    let source = Arc::new(MockDataSource::new().with_response(topics_url(), fixtures::weekly_topic_counts()));
    let cache = cache_with(
        store,
        Arc::clone(&source),
        Arc::new(ManualClock::at("2025-03-10T12:00:00Z")),
        ValidityPolicy::ttl(30),
    );

    let payload = cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(payload, fixtures::weekly_topic_counts());
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn invalidate_forces_refetch() {
    let source = Arc::new(MockDataSource::new().with_response(topics_url(), fixtures::weekly_topic_counts()));
    let cache = cache_with(
        Arc::new(MemoryStore::new()),
        Arc::clone(&source),
        Arc::new(ManualClock::at("2025-03-10T12:00:00Z")),
        ValidityPolicy::ttl(30),
    );

    cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    cache.invalidate(KEY);
    cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(source.call_count(), 2);
}

#[tokio::test]
async fn ranges_are_cached_separately() {
    let monthly = endpoint_url(Endpoint::RepoCounts, Range::Monthly);
    let source = Arc::new(
        MockDataSource::new()
            .with_response(topics_url(), json!([{"date": "2025-W01", "a": 1}]))
            .with_response(monthly.clone(), json!([{"date": "2025-01", "a": 9}])),
    );
    let cache = cache_with(
        Arc::new(MemoryStore::new()),
        Arc::clone(&source),
        Arc::new(ManualClock::at("2025-03-10T12:00:00Z")),
        ValidityPolicy::ttl(30),
    );

    let weekly = cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    let by_month = cache.fetch_endpoint(Endpoint::RepoCounts, Range::Monthly).await;
    assert_ne!(weekly, by_month);
    assert_eq!(source.calls_to(&monthly), 1);
}

#[tokio::test]
async fn lmdb_entries_survive_restart() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::at("2025-03-10T12:00:00Z"));
    {
        let store = Arc::new(LmdbStore::open(dir.path(), 10).unwrap());
        let source = Arc::new(MockDataSource::new().with_response(topics_url(), fixtures::weekly_topic_counts()));
        let cache = cache_with(store, source, Arc::clone(&clock), ValidityPolicy::ttl(60));
        cache.fetch_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    }

    clock.advance(Duration::minutes(10));
    let store = Arc::new(LmdbStore::open(dir.path(), 10).unwrap());
    let offline = Arc::new(MockDataSource::new());
    let cache = cache_with(store, Arc::clone(&offline), clock, ValidityPolicy::ttl(60));

    let read = cache.read_endpoint(Endpoint::RepoCounts, Range::Weekly).await;
    assert_eq!(read.source(), ReadSource::Cache);
    assert_eq!(read.into_value(), fixtures::weekly_topic_counts());
    assert_eq!(offline.call_count(), 0);
}

proptest! {
    #[test]
    fn fresh_entry_is_valid_under_any_policy(policy in arb_policy(), secs in 0i64..10_000_000) {
        let now = chrono::DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap();
        prop_assert!(policy.is_valid(now, now));
    }

    #[test]
    fn ttl_validity_is_strict_age_bound(minutes in 1u32..2000, age in 0i64..4000) {
        let written = chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let now = written + Duration::minutes(age);
        prop_assert_eq!(ValidityPolicy::ttl(minutes).is_valid(written, now), age < i64::from(minutes));
    }

    #[test]
    fn day_boundary_never_outlives_a_day(policy in arb_policy(), secs in 0i64..10_000_000) {
        let written = chrono::DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap();
        if let ValidityPolicy::DayBoundary { .. } = policy {
            prop_assert!(!policy.is_valid(written, written + Duration::hours(24)));
        }
    }
}
