//! Dashboard session: every panel's chart state in one owned value.
//!
//! A session holds the fetch cache handle, the current range and comparison
//! metric, the repository selection, and one [`ChartReconciler`] plus
//! [`RequestSequencer`] per panel. Independent sessions share nothing but
//! the cache they are given.
//!
//! Refreshes come in two forms. The async `refresh_*` methods fetch and apply
//! in one call. When refreshes may overlap (a UI issuing a new one before the
//! previous resolved) use [`DashboardSession::begin_refresh`], fetch on your
//! own task, and hand the payload to [`DashboardSession::complete_refresh`];
//! responses to superseded refreshes are discarded there.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use techstats_cache::FetchCache;
use techstats_core::{
    normalize_comparison, normalize_counts, normalize_repo_list, Endpoint, Range, RepoMetric,
    SeriesKey, TimeSeriesPoint,
};
use tracing::{debug, warn};

use crate::chart::{ChartInstance, ChartKind, ChartOptions, ChartRenderer};
use crate::derive::{derive_sorted, latest_keys, sort_points};
use crate::format::{tooltip_at, Tooltip};
use crate::palette::{REPO_PALETTE, SERIES_PALETTE};
use crate::rank::{latest_counts, ranked_chart_data, ranked_latest, select_top_n, LatestCount};
use crate::reconciler::{ApplyOutcome, ChartReconciler, SurfaceState};
use crate::selection::{RepoPicker, SelectionChange, SelectionState, MAX_SELECTION};
use crate::sequence::{RefreshToken, RequestSequencer};
use crate::summary::{compute_summary, SeriesSummary};
use crate::surface::{ChartSurface, SelectorOption};

/// The dashboard's chart panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    /// Topic counts over time.
    Topics,
    /// Primary-language counts over time.
    Languages,
    /// Selected repositories' metric history.
    Comparison,
    /// Latest language counts as ranked bars or a doughnut.
    Ranked,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Topics, Panel::Languages, Panel::Comparison, Panel::Ranked];

    pub fn endpoint(&self) -> Endpoint {
        match self {
            Panel::Topics => Endpoint::RepoCounts,
            Panel::Languages | Panel::Ranked => Endpoint::PrimaryLanguages,
            Panel::Comparison => Endpoint::RepoComparison,
        }
    }

    fn index(&self) -> usize {
        match self {
            Panel::Topics => 0,
            Panel::Languages => 1,
            Panel::Comparison => 2,
            Panel::Ranked => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Panel::Topics => "Repositories by topic",
            Panel::Languages => "Repositories by language",
            Panel::Comparison => "Repository comparison",
            Panel::Ranked => "Language ranking",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How many series each panel shows before the user overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDefaults {
    pub topics_top_n: usize,
    pub languages_top_n: usize,
    pub repos_top_n: usize,
}

impl Default for ChartDefaults {
    fn default() -> Self {
        Self {
            topics_top_n: 10,
            languages_top_n: 10,
            repos_top_n: MAX_SELECTION,
        }
    }
}

/// A refresh that has been issued but not applied yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRefresh {
    pub panel: Panel,
    pub endpoint: Endpoint,
    /// Range in effect when the refresh was issued.
    pub range: Range,
    pub token: RefreshToken,
}

struct PanelState {
    reconciler: ChartReconciler,
    sequencer: RequestSequencer,
    /// Last applied points, in calendar order.
    points: Vec<TimeSeriesPoint>,
    /// Keys shown by the chart, in dataset order.
    keys: Vec<SeriesKey>,
}

/// Owned state of one dashboard.
pub struct DashboardSession {
    cache: Arc<FetchCache>,
    defaults: ChartDefaults,
    range: Range,
    metric: RepoMetric,
    ranked_kind: ChartKind,
    topic_filter: Vec<SeriesKey>,
    selection: SelectionState,
    picker: RepoPicker,
    comparison_payload: Option<(Range, Value)>,
    panels: [PanelState; 4],
}

impl DashboardSession {
    pub fn new(cache: Arc<FetchCache>, renderer: Arc<dyn ChartRenderer>, defaults: ChartDefaults) -> Self {
        let panels = Panel::ALL.map(|panel| PanelState {
            reconciler: ChartReconciler::new(Arc::clone(&renderer), ChartOptions::titled(panel.title())),
            sequencer: RequestSequencer::new(),
            points: Vec::new(),
            keys: Vec::new(),
        });

        Self {
            cache,
            defaults,
            range: Range::default(),
            metric: RepoMetric::default(),
            ranked_kind: ChartKind::Bar,
            topic_filter: Vec::new(),
            selection: SelectionState::new(),
            picker: RepoPicker::default(),
            comparison_payload: None,
            panels,
        }
    }

    pub fn cache(&self) -> &Arc<FetchCache> {
        &self.cache
    }

    pub fn defaults(&self) -> ChartDefaults {
        self.defaults
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Returns whether the range changed. Panels keep their data until
    /// refreshed.
    pub fn set_range(&mut self, range: Range) -> bool {
        if self.range == range {
            return false;
        }
        debug!(from = %self.range, to = %range, "Range changed");
        self.range = range;
        true
    }

    pub fn metric(&self) -> RepoMetric {
        self.metric
    }

    /// Returns whether the metric changed. Call
    /// [`apply_comparison`](Self::apply_comparison) to redraw without a fetch.
    pub fn set_metric(&mut self, metric: RepoMetric) -> bool {
        if self.metric == metric {
            return false;
        }
        self.metric = metric;
        true
    }

    pub fn ranked_kind(&self) -> ChartKind {
        self.ranked_kind
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn picker(&self) -> &RepoPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut RepoPicker {
        &mut self.picker
    }

    pub fn topic_filter(&self) -> &[SeriesKey] {
        &self.topic_filter
    }

    /// Explicit topic list; empty means "top N by latest count".
    pub fn set_topic_filter(&mut self, keys: Vec<SeriesKey>) {
        self.topic_filter = keys;
    }

    pub fn state(&self, panel: Panel) -> SurfaceState {
        self.panel(panel).reconciler.state()
    }

    pub fn chart(&self, panel: Panel) -> Option<&dyn ChartInstance> {
        self.panel(panel).reconciler.chart()
    }

    /// Points last applied to `panel`, in calendar order.
    pub fn points(&self, panel: Panel) -> &[TimeSeriesPoint] {
        &self.panel(panel).points
    }

    /// Keys `panel` currently shows, in dataset order.
    pub fn keys(&self, panel: Panel) -> &[SeriesKey] {
        &self.panel(panel).keys
    }

    // ========================================================================
    // REFRESH
    // ========================================================================

    /// Issue a refresh token for `panel`. Any refresh issued earlier for the
    /// same panel becomes stale.
    pub fn begin_refresh(&mut self, panel: Panel) -> PendingRefresh {
        let token = self.panel_mut(panel).sequencer.issue();
        PendingRefresh {
            panel,
            endpoint: panel.endpoint(),
            range: self.range,
            token,
        }
    }

    /// Apply `payload` for `pending`, unless a newer refresh was issued.
    pub fn complete_refresh(
        &mut self,
        surface: &mut dyn ChartSurface,
        pending: &PendingRefresh,
        payload: Value,
    ) -> ApplyOutcome {
        if !self.panel_mut(pending.panel).sequencer.is_current(pending.token) {
            debug!(
                panel = ?pending.panel,
                sequence = pending.token.sequence(),
                "Discarding stale response"
            );
            return ApplyOutcome::Stale;
        }

        match pending.panel {
            Panel::Topics | Panel::Languages => {
                self.apply_counts(pending.panel, surface, &payload, pending.range)
            }
            Panel::Ranked => self.apply_ranked(surface, &payload),
            Panel::Comparison => {
                self.comparison_payload = Some((pending.range, payload));
                self.apply_comparison(surface)
            }
        }
    }

    /// Fetch and apply `panel` in one step.
    pub async fn refresh(&mut self, panel: Panel, surface: &mut dyn ChartSurface) -> ApplyOutcome {
        if panel == Panel::Comparison && self.selection.is_empty() {
            self.begin_refresh(panel);
            return self.panel_mut(panel).reconciler.clear(surface);
        }
        let pending = self.begin_refresh(panel);
        let cache = Arc::clone(&self.cache);
        let payload = cache.fetch_endpoint(pending.endpoint, pending.range).await;
        self.complete_refresh(surface, &pending, payload)
    }

    /// Refresh the topic chart. `selected` replaces the topic filter when
    /// given; an empty list restores the top-N default.
    pub async fn refresh_topics(
        &mut self,
        surface: &mut dyn ChartSurface,
        selected: Option<Vec<SeriesKey>>,
    ) -> ApplyOutcome {
        if let Some(selected) = selected {
            self.topic_filter = selected;
        }
        self.refresh(Panel::Topics, surface).await
    }

    pub async fn refresh_languages(&mut self, surface: &mut dyn ChartSurface) -> ApplyOutcome {
        self.refresh(Panel::Languages, surface).await
    }

    pub async fn refresh_ranked(&mut self, surface: &mut dyn ChartSurface) -> ApplyOutcome {
        self.refresh(Panel::Ranked, surface).await
    }

    /// Refresh the comparison chart. With nothing selected the chart is
    /// destroyed and its legend cleared, without a fetch.
    pub async fn refresh_comparison(&mut self, surface: &mut dyn ChartSurface) -> ApplyOutcome {
        self.refresh(Panel::Comparison, surface).await
    }

    /// Fetch the repository list into the picker. Returns the list length.
    pub async fn refresh_repo_list(&mut self) -> usize {
        let cache = Arc::clone(&self.cache);
        let payload = cache.fetch_endpoint(Endpoint::RepoList, self.range).await;
        self.load_repo_list(&payload)
    }

    /// Load a `repo-list` payload into the picker.
    ///
    /// With an empty selection, the most-starred repositories are
    /// preselected, up to the configured default.
    pub fn load_repo_list(&mut self, payload: &Value) -> usize {
        let repos = match normalize_repo_list(payload) {
            Ok(repos) => repos,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed repo list");
                Vec::new()
            }
        };

        if self.selection.is_empty() {
            let by_stars: Vec<LatestCount> = repos
                .iter()
                .map(|r| LatestCount::new(r.id.clone(), r.stars))
                .collect();
            for top in select_top_n(&by_stars, self.defaults.repos_top_n.min(MAX_SELECTION)) {
                self.selection.add(top.key);
            }
        }

        self.picker.set_repos(repos);
        self.picker.repos().len()
    }

    // ========================================================================
    // APPLY
    // ========================================================================

    fn apply_counts(
        &mut self,
        panel: Panel,
        surface: &mut dyn ChartSurface,
        payload: &Value,
        range: Range,
    ) -> ApplyOutcome {
        let sorted = match normalize_counts(payload) {
            Ok(points) => sort_points(&points),
            Err(e) => {
                warn!(panel = ?panel, error = %e, "Ignoring malformed payload");
                Vec::new()
            }
        };
        if sorted.is_empty() {
            return ApplyOutcome::NoData;
        }

        let all_keys = latest_keys(&sorted);
        let top_n = match panel {
            Panel::Languages => self.defaults.languages_top_n,
            _ => self.defaults.topics_top_n,
        };
        let keys: Vec<SeriesKey> = if panel == Panel::Topics && !self.topic_filter.is_empty() {
            self.topic_filter.clone()
        } else {
            select_top_n(&latest_counts(&sorted, &all_keys), top_n)
                .into_iter()
                .map(|c| c.key)
                .collect()
        };

        if let Some(selector) = surface.selector_container() {
            selector.replace(
                all_keys
                    .iter()
                    .map(|key| SelectorOption {
                        key: key.clone(),
                        label: key.display_name(),
                        selected: keys.contains(key),
                    })
                    .collect(),
            );
        }

        let data = derive_sorted(&sorted, &keys, range).into_chart_data(&SERIES_PALETTE);
        let state = self.panel_mut(panel);
        state.points = sorted;
        state.keys = keys;
        state.reconciler.apply_to_chart(surface, ChartKind::Line, data)
    }

    fn apply_ranked(&mut self, surface: &mut dyn ChartSurface, payload: &Value) -> ApplyOutcome {
        let sorted = match normalize_counts(payload) {
            Ok(points) => sort_points(&points),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed ranking payload");
                Vec::new()
            }
        };
        if sorted.is_empty() {
            return ApplyOutcome::NoData;
        }
        self.panel_mut(Panel::Ranked).points = sorted;
        self.redraw_ranked(surface)
    }

    fn redraw_ranked(&mut self, surface: &mut dyn ChartSurface) -> ApplyOutcome {
        let limit = self.defaults.languages_top_n;
        let kind = self.ranked_kind;
        let state = self.panel_mut(Panel::Ranked);
        if state.points.is_empty() {
            return ApplyOutcome::NoData;
        }
        let entries = ranked_latest(&state.points, limit);
        state.keys = entries.iter().map(|e| e.key.clone()).collect();
        let data = ranked_chart_data(&entries, "Latest", &SERIES_PALETTE);
        state.reconciler.apply_to_chart(surface, kind, data)
    }

    /// Switch the ranking between bars and doughnut, rebuilding the chart
    /// from the last applied data.
    pub fn toggle_ranked_kind(&mut self, surface: &mut dyn ChartSurface) -> ApplyOutcome {
        let kind = match self.ranked_kind {
            ChartKind::Bar => ChartKind::Doughnut,
            _ => ChartKind::Bar,
        };
        self.set_ranked_kind(surface, kind)
    }

    pub fn set_ranked_kind(&mut self, surface: &mut dyn ChartSurface, kind: ChartKind) -> ApplyOutcome {
        self.ranked_kind = kind;
        self.redraw_ranked(surface)
    }

    /// Redraw the comparison chart from the last fetched payload, using the
    /// current selection and metric.
    pub fn apply_comparison(&mut self, surface: &mut dyn ChartSurface) -> ApplyOutcome {
        if self.selection.is_empty() {
            let state = self.panel_mut(Panel::Comparison);
            state.points.clear();
            state.keys.clear();
            return state.reconciler.clear(surface);
        }
        let Some((range, payload)) = self.comparison_payload.as_ref() else {
            return ApplyOutcome::NoData;
        };
        let range = *range;

        let series = match normalize_comparison(payload, self.metric) {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed comparison payload");
                return ApplyOutcome::NoData;
            }
        };
        if series.is_empty() {
            return ApplyOutcome::NoData;
        }

        // Payloads key repositories by id or by name; charts key them by the
        // id the picker knows.
        let ids: Vec<SeriesKey> = self.selection.selected().to_vec();
        let sources: Vec<SeriesKey> = ids
            .iter()
            .map(|id| {
                if series.names.contains_key(id) {
                    return id.clone();
                }
                match self.picker.find(id) {
                    Some(listing) if series.names.contains_key(listing.name.as_str()) => {
                        SeriesKey::from(listing.name.as_str())
                    }
                    _ => id.clone(),
                }
            })
            .collect();

        let sorted: Vec<TimeSeriesPoint> = sort_points(&series.points)
            .into_iter()
            .map(|point| {
                let mut rekeyed = TimeSeriesPoint::new(point.date.clone());
                for (id, source) in ids.iter().zip(&sources) {
                    if let Some(value) = point.counts.get(source) {
                        rekeyed.counts.insert(id.clone(), *value);
                    }
                }
                rekeyed
            })
            .collect();

        let picker = &self.picker;
        let mut data = derive_sorted(&sorted, &ids, range)
            .with_names(|id| match picker.find(id) {
                Some(listing) => listing.name.clone(),
                None => series.name_of(id),
            })
            .into_chart_data(&REPO_PALETTE);
        for dataset in &mut data.datasets {
            dataset.hidden = self.selection.is_hidden(&dataset.key);
        }

        let state = self.panel_mut(Panel::Comparison);
        state.points = sorted;
        state.keys = ids;
        state.reconciler.apply_to_chart(surface, ChartKind::Line, data)
    }

    // ========================================================================
    // INTERACTION
    // ========================================================================

    /// Flip visibility of dataset `index` on `panel`.
    pub fn toggle_visibility(
        &mut self,
        panel: Panel,
        surface: &mut dyn ChartSurface,
        index: usize,
    ) -> Option<bool> {
        let state = &mut self.panels[panel.index()];
        let visible = state.reconciler.toggle_visibility(surface, index)?;
        if panel == Panel::Comparison {
            if let Some(key) = state.keys.get(index) {
                self.selection.set_hidden(key, !visible);
            }
        }
        Some(visible)
    }

    /// Add or remove a repository from the comparison. Adding clears the
    /// picker's search filter.
    pub fn toggle_repo(&mut self, repo_id: &SeriesKey) -> SelectionChange {
        let change = self.selection.toggle(repo_id.clone());
        match change {
            SelectionChange::Added => self.picker.clear_query(),
            SelectionChange::Rejected => {
                debug!(repo = %repo_id, "Selection full, ignoring repository")
            }
            SelectionChange::Removed => {}
        }
        change
    }

    /// Trend summary of the series `panel` shows.
    pub fn summary(&self, panel: Panel) -> Vec<SeriesSummary> {
        let state = self.panel(panel);
        let mut summaries = compute_summary(&state.points, &state.keys);
        if panel == Panel::Comparison {
            for summary in &mut summaries {
                summary.label = self.picker.name_of(&summary.key);
            }
        }
        summaries
    }

    pub fn tooltip(&self, panel: Panel, index: usize) -> Option<Tooltip> {
        tooltip_at(self.chart(panel)?, index)
    }

    fn panel(&self, panel: Panel) -> &PanelState {
        &self.panels[panel.index()]
    }

    fn panel_mut(&mut self, panel: Panel) -> &mut PanelState {
        &mut self.panels[panel.index()]
    }
}
