//! Trend summaries: latest value, change, and percent change per series.

use serde::Serialize;
use techstats_core::{SeriesKey, TimeSeriesPoint};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub key: SeriesKey,
    pub label: String,
    pub latest: f64,
    /// `latest - previous`; `None` with fewer than two points.
    pub diff: Option<f64>,
    /// `diff / previous * 100`; `None` when there is no previous value or it
    /// is zero.
    pub pct_change: Option<f64>,
}

/// Summaries for `keys` over points in calendar order.
pub fn compute_summary(sorted: &[TimeSeriesPoint], keys: &[SeriesKey]) -> Vec<SeriesSummary> {
    let newest = sorted.last();
    let previous = sorted.len().checked_sub(2).and_then(|i| sorted.get(i));

    keys.iter()
        .map(|key| {
            let latest = newest.map(|p| p.count(key.as_str())).unwrap_or(0.0);
            let prev = previous.map(|p| p.count(key.as_str()));
            let diff = prev.map(|p| latest - p);
            let pct_change = match (diff, prev) {
                (Some(diff), Some(prev)) if prev != 0.0 => Some(diff / prev * 100.0),
                _ => None,
            };
            SeriesSummary {
                key: key.clone(),
                label: key.display_name(),
                latest,
                diff,
                pct_change,
            }
        })
        .collect()
}
