//! Tech-stats Test Utilities
//!
//! Shared test infrastructure for the workspace:
//! - Scripted data sources, clocks, and stores for the fetch cache
//! - A recording chart renderer and a headless chart surface
//! - Proptest generators for points, keys, and policies
//! - Payload fixtures in every upstream shape
//! - Assertions for chart and legend agreement

// Re-export core types for convenience
pub use techstats_cache::{
    CacheEntry, CacheStore, Clock, DataSource, FetchCache, MemoryStore, StoreStats, ValidityPolicy,
};
pub use techstats_charts::{
    ApplyOutcome, Canvas, ChartData, ChartInstance, ChartKind, ChartModel, ChartOptions, ChartRenderer,
    ChartSurface, Legend, Selector,
};
pub use techstats_core::{
    ApiEndpoints, Endpoint, Range, RepoMetric, SeriesKey, SourceError, StoreError, TimeSeriesPoint,
    DEFAULT_API_PREFIX,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Base URL every fixture endpoint resolves against.
pub const TEST_BASE_URL: &str = "http://stats.test";

// ============================================================================
// MOCK DATA SOURCE
// ============================================================================

/// Scripted [`DataSource`]: canned responses per URL and a call log.
///
/// URLs without a scripted response answer 404. A gated source holds every
/// request until [`Gate::release`] hands out permits, so tests decide when
/// responses arrive.
#[derive(Default)]
pub struct MockDataSource {
    responses: Mutex<HashMap<String, Result<Value, SourceError>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

/// Releases requests held by a gated [`MockDataSource`].
#[derive(Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
}

impl Gate {
    /// Let `n` held (or future) requests through.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose requests wait on the returned gate.
    pub fn gated() -> (Self, Gate) {
        let permits = Arc::new(Semaphore::new(0));
        let source = Self {
            gate: Some(Arc::clone(&permits)),
            ..Self::default()
        };
        (source, Gate { permits })
    }

    pub fn with_response(self, url: impl Into<String>, payload: Value) -> Self {
        self.respond(url, payload);
        self
    }

    /// Script (or replace) the payload for `url`.
    pub fn respond(&self, url: impl Into<String>, payload: Value) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url.into(), Ok(payload));
        }
    }

    /// Make `url` answer with an HTTP error status.
    pub fn fail(&self, url: impl Into<String>, status: u16) {
        let url = url.into();
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url.clone(), Err(SourceError::Status { url, status }));
        }
    }

    /// Every URL requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .map(|c| c.iter().filter(|u| *u == url).count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_json(&self, url: &str) -> Result<Value, SourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let scripted = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(url).cloned());
        scripted.unwrap_or_else(|| {
            Err(SourceError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}

// ============================================================================
// MANUAL CLOCK
// ============================================================================

/// A [`Clock`] that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Clock at an RFC 3339 instant, e.g. `2025-03-10T23:30:00+01:00`.
    pub fn at(rfc3339: &str) -> Self {
        let now = DateTime::parse_from_rfc3339(rfc3339)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|e| panic!("Invalid RFC 3339 instant {}: {}", rfc3339, e));
        Self::new(now)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|t| *t).unwrap_or_else(|_| Utc::now())
    }
}

// ============================================================================
// FAILING STORE
// ============================================================================

/// A [`MemoryStore`] whose reads or writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        let store = Self::default();
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl CacheStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::ReadFailed {
                key: key.to_string(),
                reason: "injected read failure".to_string(),
            });
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed {
                key: key.to_string(),
                reason: "injected write failure".to_string(),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.inner.remove(key)
    }

    fn stats(&self) -> StoreStats {
        self.inner.stats()
    }
}

// ============================================================================
// RECORDING RENDERER
// ============================================================================

/// A lifecycle call observed by [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    Constructed { canvas: String, kind: ChartKind },
    Updated { kind: ChartKind },
    Destroyed { kind: ChartKind },
}

/// A [`ChartRenderer`] building [`ChartModel`]s and logging every
/// construct, update, and destroy.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, matches: impl Fn(&RenderEvent) -> bool) -> usize {
        self.events().iter().filter(|e| matches(e)).count()
    }

    pub fn constructed(&self) -> usize {
        self.count(|e| matches!(e, RenderEvent::Constructed { .. }))
    }

    pub fn destroyed(&self) -> usize {
        self.count(|e| matches!(e, RenderEvent::Destroyed { .. }))
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    fn record(events: &Arc<Mutex<Vec<RenderEvent>>>, event: RenderEvent) {
        if let Ok(mut events) = events.lock() {
            events.push(event);
        }
    }
}

impl ChartRenderer for RecordingRenderer {
    fn construct(
        &self,
        canvas: &Canvas,
        kind: ChartKind,
        data: ChartData,
        options: ChartOptions,
    ) -> Box<dyn ChartInstance> {
        Self::record(
            &self.events,
            RenderEvent::Constructed {
                canvas: canvas.id.clone(),
                kind,
            },
        );
        Box::new(RecordingChart {
            model: ChartModel::new(kind, data, options),
            events: Arc::clone(&self.events),
        })
    }
}

struct RecordingChart {
    model: ChartModel,
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl ChartInstance for RecordingChart {
    fn kind(&self) -> ChartKind {
        self.model.kind()
    }

    fn data(&self) -> &ChartData {
        self.model.data()
    }

    fn data_mut(&mut self) -> &mut ChartData {
        self.model.data_mut()
    }

    fn update(&mut self) {
        self.model.update();
        RecordingRenderer::record(&self.events, RenderEvent::Updated { kind: self.model.kind() });
    }

    fn destroy(&mut self) {
        self.model.destroy();
        RecordingRenderer::record(&self.events, RenderEvent::Destroyed { kind: self.model.kind() });
    }

    fn elements_at(&self, index: usize) -> Vec<techstats_charts::ChartElement> {
        self.model.elements_at(index)
    }

    fn set_dataset_visibility(&mut self, dataset_index: usize, visible: bool) {
        self.model.set_dataset_visibility(dataset_index, visible);
    }

    fn is_dataset_visible(&self, dataset_index: usize) -> bool {
        self.model.is_dataset_visible(dataset_index)
    }
}

// ============================================================================
// HEADLESS SURFACE
// ============================================================================

/// A [`ChartSurface`] backed by plain fields.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    pub canvas: Option<Canvas>,
    pub legend: Legend,
    pub selector: Selector,
}

impl HeadlessSurface {
    pub fn new(canvas_id: &str) -> Self {
        Self {
            canvas: Some(Canvas::new(canvas_id)),
            ..Self::default()
        }
    }

    /// A surface missing its canvas element.
    pub fn without_canvas() -> Self {
        Self::default()
    }
}

impl ChartSurface for HeadlessSurface {
    fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    fn legend_container(&mut self) -> Option<&mut Legend> {
        Some(&mut self.legend)
    }

    fn selector_container(&mut self) -> Option<&mut Selector> {
        Some(&mut self.selector)
    }
}

/// Endpoints resolving against [`TEST_BASE_URL`].
pub fn test_endpoints() -> ApiEndpoints {
    ApiEndpoints::new(Some(TEST_BASE_URL), DEFAULT_API_PREFIX)
}

/// Full URL the test endpoints produce for `endpoint` and `range`.
pub fn endpoint_url(endpoint: Endpoint, range: Range) -> String {
    test_endpoints()
        .url(endpoint, range)
        .unwrap_or_else(|| panic!("Test endpoints are configured"))
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    pub fn arb_series_key() -> impl Strategy<Value = SeriesKey> {
        "[a-z][a-z0-9-]{0,11}".prop_map(SeriesKey::from)
    }

    pub fn arb_range() -> impl Strategy<Value = Range> {
        prop_oneof![Just(Range::Weekly), Just(Range::Monthly)]
    }

    pub fn arb_metric() -> impl Strategy<Value = RepoMetric> {
        prop_oneof![
            Just(RepoMetric::Stars),
            Just(RepoMetric::Forks),
            Just(RepoMetric::OpenIssues),
            Just(RepoMetric::Size),
            Just(RepoMetric::Watchers),
        ]
    }

    /// Distinct keys, in generation order.
    pub fn arb_distinct_keys(max: usize) -> impl Strategy<Value = Vec<SeriesKey>> {
        prop::collection::btree_set(arb_series_key(), 1..=max.max(1))
            .prop_map(|keys| keys.into_iter().collect())
            .prop_shuffle()
    }

    /// Whole-number counts, duplicates likely.
    pub fn arb_count() -> impl Strategy<Value = f64> {
        (0u32..50).prop_map(f64::from)
    }

    /// Consecutive ISO weeks of 2025, each point carrying every key.
    pub fn arb_weekly_points(max_keys: usize, max_weeks: usize) -> impl Strategy<Value = Vec<TimeSeriesPoint>> {
        (arb_distinct_keys(max_keys), 1..=max_weeks.clamp(1, 52)).prop_flat_map(|(keys, weeks)| {
            let width = keys.len();
            prop::collection::vec(prop::collection::vec(arb_count(), width), weeks).prop_map(move |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(week, counts)| {
                        let mut point = TimeSeriesPoint::new(format!("2025-W{:02}", week + 1));
                        for (key, count) in keys.iter().zip(counts) {
                            point.counts.insert(key.clone(), count);
                        }
                        point
                    })
                    .collect()
            })
        })
    }

    pub fn arb_policy() -> impl Strategy<Value = ValidityPolicy> {
        prop_oneof![
            (1u32..=24 * 60).prop_map(ValidityPolicy::ttl),
            (0u32..24, -12i32..=14).prop_map(|(hour, offset)| ValidityPolicy::day_boundary(hour, offset)),
        ]
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use serde_json::{json, Value};

    /// `repo-counts` in the flat shape: `{date, <topic>: n, ...}`.
    pub fn weekly_topic_counts() -> Value {
        json!([
            {"date": "2025-W46", "data-engineering": 120, "machine-learning": 300, "rust": 40},
            {"date": "2025-W48", "data-engineering": 130, "machine-learning": 310, "rust": 55},
            {"date": "2025-W47", "data-engineering": 125, "machine-learning": 305, "rust": 50}
        ])
    }

    /// `primary-languages` in the nested shape: `{date, counts: {...}}`.
    pub fn monthly_language_counts() -> Value {
        json!([
            {"date": "2025-01", "counts": {"Python": 900, "Rust": 150, "Go": 300, "Java": 600}},
            {"date": "2025-02", "counts": {"Python": 950, "Rust": 180, "Go": 310, "Java": 590}}
        ])
    }

    /// A single-total series: `{date, count}`.
    pub fn total_counts() -> Value {
        json!([
            {"date": "2025-W01", "count": 10},
            {"date": "2025-W02", "count": 12}
        ])
    }

    pub fn repo_list() -> Value {
        json!([
            {"id": 11, "name": "apache/spark", "stars": 39000},
            {"id": 12, "name": "apache/airflow", "stars": 36000},
            {"id": 13, "name": "duckdb/duckdb", "stars": 24000},
            {"id": 14, "name": "pola-rs/polars", "stars": 29000},
            {"id": 15, "name": "dbt-labs/dbt-core", "stars": 9500},
            {"id": 16, "name": "apache/flink", "stars": 23500}
        ])
    }

    /// `repo-comparison` keyed by repository id, each with a history.
    pub fn comparison_history() -> Value {
        json!({
            "11": {"name": "apache/spark", "history": [
                {"date": "2025-W02", "stars": 38900, "forks": 28000},
                {"date": "2025-W01", "stars": 38800, "forks": 27990}
            ]},
            "13": {"name": "duckdb/duckdb", "history": [
                {"date": "2025-W01", "stars": 23800, "forks": 1900},
                {"date": "2025-W02", "stars": 24000, "forks": 1950}
            ]}
        })
    }

    /// `repo-comparison` as periods keyed by repository name.
    pub fn comparison_periods() -> Value {
        json!([
            {"date": "2025-01", "repos": {
                "apache/spark": {"stars": 38000, "forks": 27900},
                "duckdb/duckdb": {"stars": 22000, "forks": 1800}
            }},
            {"date": "2025-02", "repos": {
                "apache/spark": {"stars": 38500, "forks": 27950},
                "duckdb/duckdb": {"stars": 23000, "forks": 1850}
            }}
        ])
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    use super::*;

    pub fn assert_rendered(outcome: ApplyOutcome) {
        assert!(outcome.rendered(), "Expected a rendered chart, got {:?}", outcome);
    }

    /// Every legend chip's `active` flag equals the chart's own visibility.
    pub fn assert_legend_matches_chart(legend: &Legend, chart: &dyn ChartInstance) {
        assert_eq!(
            legend.len(),
            chart.data().datasets.len(),
            "Legend has one chip per dataset"
        );
        for chip in legend.chips() {
            assert_eq!(
                chip.active,
                chart.is_dataset_visible(chip.index),
                "Legend chip {} disagrees with chart",
                chip.index
            );
        }
    }

    pub fn assert_series_keys(chart: &dyn ChartInstance, expected: &[&str]) {
        let keys: Vec<String> = chart.data().datasets.iter().map(|d| d.key.to_string()).collect();
        assert_eq!(keys, expected);
    }
}
