//! Ranking series by their latest observed value.

use techstats_core::{SeriesKey, TimeSeriesPoint};

use crate::chart::{ChartData, Dataset};
use crate::palette::{color_at, Color};

/// A series key with its value at the most recent point.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestCount {
    pub key: SeriesKey,
    pub latest: f64,
}

impl LatestCount {
    pub fn new(key: impl Into<SeriesKey>, latest: f64) -> Self {
        Self {
            key: key.into(),
            latest,
        }
    }
}

/// Latest value of each key in `sorted`, in key order.
pub fn latest_counts(sorted: &[TimeSeriesPoint], keys: &[SeriesKey]) -> Vec<LatestCount> {
    let last = sorted.last();
    keys.iter()
        .map(|key| LatestCount {
            key: key.clone(),
            latest: last.map(|p| p.count(key.as_str())).unwrap_or(0.0),
        })
        .collect()
}

/// Sort descending by latest value. Ties keep their input order.
pub fn rank_by_latest(items: &[LatestCount]) -> Vec<LatestCount> {
    let mut ranked = items.to_vec();
    ranked.sort_by(|a, b| b.latest.total_cmp(&a.latest));
    ranked
}

/// The `n` largest by latest value, in descending order, ties stable.
pub fn select_top_n(items: &[LatestCount], n: usize) -> Vec<LatestCount> {
    let mut ranked = rank_by_latest(items);
    ranked.truncate(n);
    ranked
}

/// One bar or doughnut slice.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub key: SeriesKey,
    pub name: String,
    pub value: f64,
    /// Share of the total, in percent. Zero when the total is zero.
    pub share_pct: f64,
}

/// Latest values of every key of the most recent point, ranked, capped at
/// `limit` entries. Shares are computed over the capped set.
pub fn ranked_latest(sorted: &[TimeSeriesPoint], limit: usize) -> Vec<RankedEntry> {
    let Some(last) = sorted.last() else {
        return Vec::new();
    };
    let items: Vec<LatestCount> = last
        .counts
        .iter()
        .map(|(key, value)| LatestCount::new(key.clone(), *value))
        .collect();
    let top = select_top_n(&items, limit);
    let total: f64 = top.iter().map(|i| i.latest).sum();
    top.into_iter()
        .map(|item| RankedEntry {
            name: item.key.display_name(),
            share_pct: if total > 0.0 {
                item.latest / total * 100.0
            } else {
                0.0
            },
            key: item.key,
            value: item.latest,
        })
        .collect()
}

/// Single-dataset chart data for a ranked bar or doughnut view.
pub fn ranked_chart_data(entries: &[RankedEntry], label: &str, palette: &[Color]) -> ChartData {
    let mut dataset = Dataset::new(
        SeriesKey::from(label),
        label,
        color_at(palette, 0),
        entries.iter().map(|e| e.value).collect(),
    );
    dataset.element_colors = (0..entries.len()).map(|i| color_at(palette, i)).collect();
    ChartData {
        labels: entries.iter().map(|e| e.name.clone()).collect(),
        datasets: vec![dataset],
    }
}
