//! Deriving labels and per-series arrays from canonical points.

use techstats_core::{decode_date, format_label, Range, SeriesKey, TimeSeriesPoint};

use crate::chart::{ChartData, Dataset};
use crate::palette::{color_at, Color};

/// One derived series, values aligned with the label sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: SeriesKey,
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    /// Value at the last label, or zero for an empty series.
    pub fn latest(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }
}

/// Labels plus the series to draw against them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedSeries {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl DerivedSeries {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Replace display names, e.g. with repository names from a payload.
    pub fn with_names(mut self, name_of: impl Fn(&SeriesKey) -> String) -> Self {
        for series in &mut self.series {
            series.name = name_of(&series.key);
        }
        self
    }

    /// Line-chart data, colouring series by position in `palette`.
    pub fn into_chart_data(self, palette: &[Color]) -> ChartData {
        let datasets = self
            .series
            .into_iter()
            .enumerate()
            .map(|(i, s)| Dataset::new(s.key, s.name, color_at(palette, i), s.values))
            .collect();
        ChartData {
            labels: self.labels,
            datasets,
        }
    }
}

/// Points in ascending calendar order.
///
/// Tokens that do not decode keep their relative order after every
/// decodable one.
pub fn sort_points(points: &[TimeSeriesPoint]) -> Vec<TimeSeriesPoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by_cached_key(|p| {
        let date = decode_date(&p.date);
        (date.is_none(), date)
    });
    sorted
}

/// Keys of the most recent point, in payload order.
pub fn latest_keys(sorted: &[TimeSeriesPoint]) -> Vec<SeriesKey> {
    sorted
        .last()
        .map(|p| p.keys().cloned().collect())
        .unwrap_or_default()
}

/// Derive labels and series arrays.
///
/// When `selected` is `None` or empty, the keys of the most recent point are
/// used. Output series follow the key order. Keys absent from a point read
/// as zero.
pub fn derive_series(
    points: &[TimeSeriesPoint],
    selected: Option<&[SeriesKey]>,
    range: Range,
) -> DerivedSeries {
    let sorted = sort_points(points);
    let keys = match selected {
        Some(keys) if !keys.is_empty() => keys.to_vec(),
        _ => latest_keys(&sorted),
    };
    derive_sorted(&sorted, &keys, range)
}

/// [`derive_series`] for points already in calendar order.
pub fn derive_sorted(sorted: &[TimeSeriesPoint], keys: &[SeriesKey], range: Range) -> DerivedSeries {
    let labels = sorted.iter().map(|p| format_label(&p.date, range)).collect();
    let series = keys
        .iter()
        .map(|key| Series {
            key: key.clone(),
            name: key.display_name(),
            values: sorted.iter().map(|p| p.count(key.as_str())).collect(),
        })
        .collect();
    DerivedSeries { labels, series }
}
