//! Tech-stats chart state.
//!
//! Turns canonical time-series points into chart data and keeps one live
//! chart per surface in step with it:
//!
//! - [`derive`]: calendar ordering, labels, per-series arrays
//! - [`rank`]: latest-value ranking and top-N selection
//! - [`reconciler`]: in-place update versus destroy-and-rebuild, legend sync
//! - [`selection`]: the bounded repository selection and picker
//! - [`sequence`]: stale-response discard
//! - [`session`]: all of the above for one dashboard
//!
//! Rendering goes through the [`ChartRenderer`] and [`ChartSurface`] traits,
//! so the same state machine drives a terminal UI or a headless test double.

pub mod chart;
pub mod derive;
pub mod format;
pub mod palette;
pub mod rank;
pub mod reconciler;
pub mod selection;
pub mod sequence;
pub mod session;
pub mod summary;
pub mod surface;

pub use chart::{
    ChartData, ChartElement, ChartInstance, ChartKind, ChartModel, ChartOptions, ChartRenderer, Dataset,
};
pub use derive::{derive_series, derive_sorted, latest_keys, sort_points, DerivedSeries, Series};
pub use format::{format_thousands, format_tick, tooltip_at, Tooltip, TooltipRow};
pub use palette::{color_at, Color, REPO_PALETTE, SERIES_PALETTE};
pub use rank::{
    latest_counts, rank_by_latest, ranked_chart_data, ranked_latest, select_top_n, LatestCount, RankedEntry,
};
pub use reconciler::{legend_chips, ApplyOutcome, ChartReconciler, SurfaceState};
pub use selection::{PickerOption, RepoPicker, SelectionChange, SelectionState, MAX_SELECTION};
pub use sequence::{RefreshToken, RequestSequencer};
pub use session::{ChartDefaults, DashboardSession, Panel, PendingRefresh};
pub use summary::{compute_summary, SeriesSummary};
pub use surface::{Canvas, ChartSurface, Legend, LegendChip, Selector, SelectorOption};
