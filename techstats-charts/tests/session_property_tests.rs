use serde_json::json;
use std::sync::Arc;
use techstats_cache::{FetchCache, MemoryStore, ValidityPolicy};
use techstats_charts::{
    ApplyOutcome, ChartDefaults, ChartKind, DashboardSession, Panel, SelectionChange, SurfaceState,
};
use techstats_core::{Endpoint, Range, RepoMetric, SeriesKey};
use techstats_test_utils::assertions::{assert_legend_matches_chart, assert_rendered, assert_series_keys};
use techstats_test_utils::{
    endpoint_url, fixtures, test_endpoints, HeadlessSurface, MockDataSource, RecordingRenderer, RenderEvent,
};

struct Harness {
    session: DashboardSession,
    source: Arc<MockDataSource>,
    renderer: RecordingRenderer,
}

fn harness(source: MockDataSource) -> Harness {
    let source = Arc::new(source);
    let renderer = RecordingRenderer::new();
    let cache = FetchCache::new(Arc::new(MemoryStore::new()), source.clone())
        .with_endpoints(test_endpoints())
        .with_policy(ValidityPolicy::ttl(60));
    let session = DashboardSession::new(Arc::new(cache), Arc::new(renderer.clone()), ChartDefaults::default());
    Harness {
        session,
        source,
        renderer,
    }
}

fn comparison_source(payload: serde_json::Value) -> MockDataSource {
    MockDataSource::new()
        .with_response(endpoint_url(Endpoint::RepoComparison, Range::Weekly), payload)
        .with_response(endpoint_url(Endpoint::RepoList, Range::Weekly), fixtures::repo_list())
}

#[tokio::test]
async fn topics_render_in_calendar_order() {
    let mut h = harness(
        MockDataSource::new()
            .with_response(endpoint_url(Endpoint::RepoCounts, Range::Weekly), fixtures::weekly_topic_counts()),
    );
    let mut surface = HeadlessSurface::new("topics");

    let outcome = h.session.refresh_topics(&mut surface, None).await;
    assert_eq!(outcome, ApplyOutcome::Constructed);

    let chart = h.session.chart(Panel::Topics).unwrap();
    assert_eq!(chart.data().labels.len(), 3);
    assert!(chart.data().labels[0].starts_with("Nov 10"));
    // Ranked by the W48 value.
    assert_series_keys(chart, &["machine-learning", "data-engineering", "rust"]);
    assert_eq!(chart.data().datasets[2].data, vec![40.0, 50.0, 55.0]);
    assert_legend_matches_chart(&surface.legend, chart);
    assert_eq!(surface.selector.options().len(), 3);
}

#[tokio::test]
async fn explicit_topic_selection_keeps_given_order() {
    let mut h = harness(
        MockDataSource::new()
            .with_response(endpoint_url(Endpoint::RepoCounts, Range::Weekly), fixtures::weekly_topic_counts()),
    );
    let mut surface = HeadlessSurface::new("topics");

    h.session
        .refresh_topics(&mut surface, Some(vec!["rust".into(), "data-engineering".into()]))
        .await;
    assert_series_keys(h.session.chart(Panel::Topics).unwrap(), &["rust", "data-engineering"]);
}

#[tokio::test]
async fn same_kind_refresh_updates_in_place() {
    let mut h = harness(
        MockDataSource::new()
            .with_response(endpoint_url(Endpoint::PrimaryLanguages, Range::Weekly), fixtures::weekly_topic_counts()),
    );
    let mut surface = HeadlessSurface::new("languages");

    h.session.refresh_languages(&mut surface).await;
    h.session.toggle_visibility(Panel::Languages, &mut surface, 0);
    let outcome = h.session.refresh_languages(&mut surface).await;

    assert_eq!(outcome, ApplyOutcome::Updated);
    assert_eq!(h.renderer.constructed(), 1);
    assert_eq!(h.renderer.destroyed(), 0);
    let chart = h.session.chart(Panel::Languages).unwrap();
    assert!(!chart.is_dataset_visible(0));
    assert_legend_matches_chart(&surface.legend, chart);
}

#[tokio::test]
async fn ranked_kind_change_destroys_before_constructing() {
    let mut h = harness(
        MockDataSource::new()
            .with_response(endpoint_url(Endpoint::PrimaryLanguages, Range::Weekly), fixtures::monthly_language_counts()),
    );
    let mut surface = HeadlessSurface::new("ranked");

    assert_rendered(h.session.refresh_ranked(&mut surface).await);
    let labels = h.session.chart(Panel::Ranked).unwrap().data().labels.clone();
    assert_eq!(labels, vec!["Python", "Java", "Go", "Rust"]);

    assert_eq!(h.session.toggle_ranked_kind(&mut surface), ApplyOutcome::Rebuilt);
    let lifecycle: Vec<RenderEvent> = h
        .renderer
        .events()
        .into_iter()
        .filter(|e| !matches!(e, RenderEvent::Updated { .. }))
        .collect();
    assert_eq!(
        lifecycle,
        vec![
            RenderEvent::Constructed {
                canvas: "ranked".into(),
                kind: ChartKind::Bar
            },
            RenderEvent::Destroyed { kind: ChartKind::Bar },
            RenderEvent::Constructed {
                canvas: "ranked".into(),
                kind: ChartKind::Doughnut
            },
        ]
    );
    assert_eq!(h.source.call_count(), 1);
}

#[test]
fn stale_response_is_discarded() {
    let mut h = harness(MockDataSource::new());
    let mut surface = HeadlessSurface::new("topics");

    let first = h.session.begin_refresh(Panel::Topics);
    let second = h.session.begin_refresh(Panel::Topics);

    let newer = json!([{"date": "2025-W10", "fresh": 2}]);
    let older = json!([{"date": "2025-W09", "old": 1}]);
    assert_eq!(h.session.complete_refresh(&mut surface, &second, newer), ApplyOutcome::Constructed);
    assert_eq!(h.session.complete_refresh(&mut surface, &first, older), ApplyOutcome::Stale);

    assert_series_keys(h.session.chart(Panel::Topics).unwrap(), &["fresh"]);
    assert_eq!(h.renderer.constructed(), 1);
}

#[test]
fn panels_sequence_independently() {
    let mut h = harness(MockDataSource::new());
    let mut surface = HeadlessSurface::new("languages");

    let languages = h.session.begin_refresh(Panel::Languages);
    h.session.begin_refresh(Panel::Topics);
    let outcome = h
        .session
        .complete_refresh(&mut surface, &languages, fixtures::weekly_topic_counts());
    assert_eq!(outcome, ApplyOutcome::Constructed);
}

#[tokio::test]
async fn missing_canvas_renders_nothing() {
    let mut h = harness(
        MockDataSource::new()
            .with_response(endpoint_url(Endpoint::RepoCounts, Range::Weekly), fixtures::weekly_topic_counts()),
    );
    let mut surface = HeadlessSurface::without_canvas();

    assert_eq!(h.session.refresh_topics(&mut surface, None).await, ApplyOutcome::NoCanvas);
    assert_eq!(h.session.state(Panel::Topics), SurfaceState::Uninitialized);
    assert_eq!(h.renderer.constructed(), 0);
}

#[tokio::test]
async fn failed_fetch_is_no_data() {
    let mut h = harness(MockDataSource::new());
    let mut surface = HeadlessSurface::new("topics");
    assert_eq!(h.session.refresh_topics(&mut surface, None).await, ApplyOutcome::NoData);
}

#[tokio::test]
async fn range_change_fetches_the_other_range() {
    let monthly = endpoint_url(Endpoint::RepoCounts, Range::Monthly);
    let mut h = harness(MockDataSource::new().with_response(
        monthly.clone(),
        json!([{"date": "2025-01", "rust": 1}, {"date": "2025-02", "rust": 2}]),
    ));
    let mut surface = HeadlessSurface::new("topics");

    assert!(h.session.set_range(Range::Monthly));
    assert!(!h.session.set_range(Range::Monthly));
    h.session.refresh_topics(&mut surface, None).await;

    assert_eq!(h.source.calls(), vec![monthly]);
    let chart = h.session.chart(Panel::Topics).unwrap();
    assert_eq!(chart.data().labels, vec!["Jan 2025", "Feb 2025"]);
}

#[tokio::test]
async fn empty_selection_clears_without_fetch() {
    let mut h = harness(comparison_source(fixtures::comparison_history()));
    let mut surface = HeadlessSurface::new("comparison");

    assert_eq!(h.session.refresh_comparison(&mut surface).await, ApplyOutcome::Cleared);
    assert_eq!(h.source.call_count(), 0);

    h.session.toggle_repo(&"11".into());
    assert_rendered(h.session.refresh_comparison(&mut surface).await);
    assert_eq!(surface.legend.len(), 1);

    h.session.toggle_repo(&"11".into());
    assert_eq!(h.session.refresh_comparison(&mut surface).await, ApplyOutcome::Cleared);
    assert_eq!(h.session.state(Panel::Comparison), SurfaceState::Uninitialized);
    assert!(surface.legend.is_empty());
    assert_eq!(h.renderer.destroyed(), 1);
    assert_eq!(h.source.call_count(), 1);
}

#[tokio::test]
async fn metric_switch_redraws_without_fetch() {
    let mut h = harness(comparison_source(fixtures::comparison_history()));
    let mut surface = HeadlessSurface::new("comparison");
    h.session.toggle_repo(&"11".into());
    h.session.toggle_repo(&"13".into());

    h.session.refresh_comparison(&mut surface).await;
    let stars = h.session.chart(Panel::Comparison).unwrap().data().datasets[1].data.clone();
    assert_eq!(stars, vec![23800.0, 24000.0]);

    assert!(h.session.set_metric(RepoMetric::Forks));
    assert_eq!(h.session.apply_comparison(&mut surface), ApplyOutcome::Updated);
    let chart = h.session.chart(Panel::Comparison).unwrap();
    assert_eq!(chart.data().datasets[1].data, vec![1900.0, 1950.0]);
    assert_eq!(chart.data().datasets[0].label, "apache/spark");
    assert_eq!(h.source.call_count(), 1);
}

#[tokio::test]
async fn hidden_repo_stays_hidden_across_redraws() {
    let mut h = harness(comparison_source(fixtures::comparison_history()));
    let mut surface = HeadlessSurface::new("comparison");
    h.session.toggle_repo(&"11".into());
    h.session.toggle_repo(&"13".into());
    h.session.refresh_comparison(&mut surface).await;

    assert_eq!(h.session.toggle_visibility(Panel::Comparison, &mut surface, 1), Some(false));
    assert!(h.session.selection().is_hidden(&SeriesKey::from("13")));

    h.session.toggle_repo(&"11".into());
    h.session.apply_comparison(&mut surface);
    let chart = h.session.chart(Panel::Comparison).unwrap();
    assert_series_keys(chart, &["13"]);
    assert!(!chart.is_dataset_visible(0));
    assert_legend_matches_chart(&surface.legend, chart);
}

#[tokio::test]
async fn name_keyed_periods_resolve_through_repo_list() {
    let mut h = harness(comparison_source(fixtures::comparison_periods()));
    let mut surface = HeadlessSurface::new("comparison");

    assert_eq!(h.session.refresh_repo_list().await, 6);
    let selected: Vec<&str> = h.session.selection().selected().iter().map(|k| k.as_str()).collect();
    assert_eq!(selected, vec!["11", "12", "14", "13", "16"]);

    h.session.refresh_comparison(&mut surface).await;
    let chart = h.session.chart(Panel::Comparison).unwrap();
    assert_eq!(chart.data().labels, vec!["Jan 1", "Feb 1"]);
    assert_eq!(chart.data().datasets[0].label, "apache/spark");
    assert_eq!(chart.data().datasets[0].data, vec![38000.0, 38500.0]);
    assert_eq!(chart.data().datasets[3].data, vec![22000.0, 23000.0]);
    assert_eq!(chart.data().datasets[1].data, vec![0.0, 0.0]);

    let summary = h.session.summary(Panel::Comparison);
    assert_eq!(summary[0].label, "apache/spark");
    assert_eq!(summary[0].diff, Some(500.0));
}

#[tokio::test]
async fn sixth_repo_is_rejected() {
    let mut h = harness(comparison_source(fixtures::comparison_history()));
    h.session.refresh_repo_list().await;
    assert!(h.session.selection().is_full());
    assert_eq!(h.session.toggle_repo(&"15".into()), SelectionChange::Rejected);
    assert!(h.session.picker().options(h.session.selection()).iter().all(|o| o.disabled));
}

#[tokio::test]
async fn summary_reports_latest_and_change() {
    let mut h = harness(
        MockDataSource::new()
            .with_response(endpoint_url(Endpoint::RepoCounts, Range::Weekly), fixtures::weekly_topic_counts()),
    );
    let mut surface = HeadlessSurface::new("topics");
    h.session.refresh_topics(&mut surface, None).await;

    let summary = h.session.summary(Panel::Topics);
    let rust = summary.iter().find(|s| s.key.as_str() == "rust").unwrap();
    assert_eq!(rust.latest, 55.0);
    assert_eq!(rust.diff, Some(5.0));
    assert_eq!(rust.pct_change, Some(10.0));
    assert_eq!(rust.label, "Rust");

    let tooltip = h.session.tooltip(Panel::Topics, 2).unwrap();
    assert_eq!(tooltip.rows.len(), 3);
    assert_eq!(tooltip.rows[0].value, "310");
}
