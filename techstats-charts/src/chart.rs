//! The contract between the reconciler and a chart rendering library.
//!
//! The reconciler only ever talks to a chart through [`ChartRenderer`] and
//! [`ChartInstance`]. [`ChartModel`] is a ready-made in-memory instance state
//! that concrete renderers can wrap.

use serde::{Deserialize, Serialize};
use std::fmt;
use techstats_core::SeriesKey;

use crate::palette::Color;
use crate::surface::Canvas;

/// Shape of a chart. Changing it requires rebuilding the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Time-series lines.
    Line,
    /// Ranked bars.
    Bar,
    /// Proportional doughnut.
    Doughnut,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Doughnut => "doughnut",
        };
        f.write_str(name)
    }
}

/// One series as handed to the chart library.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub key: SeriesKey,
    pub label: String,
    pub color: Color,
    pub data: Vec<f64>,
    /// Per-element colours, used by bar and doughnut charts.
    pub element_colors: Vec<Color>,
    /// Initial visibility. Once constructed, the chart owns the live flag.
    pub hidden: bool,
}

impl Dataset {
    pub fn new(key: SeriesKey, label: impl Into<String>, color: Color, data: Vec<f64>) -> Self {
        Self {
            key,
            label: label.into(),
            color,
            data,
            element_colors: Vec::new(),
            hidden: false,
        }
    }

    /// Colour of the element at `index`.
    pub fn element_color(&self, index: usize) -> Color {
        self.element_colors.get(index).copied().unwrap_or(self.color)
    }
}

/// Labels plus datasets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn dataset_keys(&self) -> Vec<SeriesKey> {
        self.datasets.iter().map(|d| d.key.clone()).collect()
    }
}

/// Presentation options passed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOptions {
    pub title: Option<String>,
    /// Render y-axis ticks of 1000 and above as `Nk`.
    pub compact_ticks: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: None,
            compact_ticks: true,
        }
    }
}

impl ChartOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// A data point under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartElement {
    pub dataset_index: usize,
    pub index: usize,
    pub value: f64,
}

/// A live chart.
pub trait ChartInstance: Send {
    fn kind(&self) -> ChartKind;

    fn data(&self) -> &ChartData;

    /// Mutable access for in-place refreshes. Call [`update`](Self::update)
    /// afterwards.
    fn data_mut(&mut self) -> &mut ChartData;

    /// Re-render after data or visibility changes.
    fn update(&mut self);

    /// Release the chart. The instance is not used afterwards.
    fn destroy(&mut self);

    /// Elements of visible datasets at x index `index`.
    fn elements_at(&self, index: usize) -> Vec<ChartElement>;

    fn set_dataset_visibility(&mut self, dataset_index: usize, visible: bool);

    fn is_dataset_visible(&self, dataset_index: usize) -> bool;
}

/// A chart library: builds instances on a canvas.
pub trait ChartRenderer: Send + Sync {
    fn construct(
        &self,
        canvas: &Canvas,
        kind: ChartKind,
        data: ChartData,
        options: ChartOptions,
    ) -> Box<dyn ChartInstance>;
}

/// In-memory chart state: data, per-dataset visibility, and lifecycle flags.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    kind: ChartKind,
    data: ChartData,
    options: ChartOptions,
    visible: Vec<bool>,
    updates: u64,
    destroyed: bool,
}

impl ChartModel {
    pub fn new(kind: ChartKind, data: ChartData, options: ChartOptions) -> Self {
        let visible = data.datasets.iter().map(|d| !d.hidden).collect();
        Self {
            kind,
            data,
            options,
            visible,
            updates: 0,
            destroyed: false,
        }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Number of [`update`](ChartInstance::update) calls so far.
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl ChartInstance for ChartModel {
    fn kind(&self) -> ChartKind {
        self.kind
    }

    fn data(&self) -> &ChartData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut ChartData {
        &mut self.data
    }

    fn update(&mut self) {
        let len = self.data.datasets.len();
        if self.visible.len() > len {
            self.visible.truncate(len);
        }
        while self.visible.len() < len {
            let hidden = self.data.datasets[self.visible.len()].hidden;
            self.visible.push(!hidden);
        }
        self.updates += 1;
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }

    fn elements_at(&self, index: usize) -> Vec<ChartElement> {
        self.data
            .datasets
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_dataset_visible(*i))
            .filter_map(|(dataset_index, dataset)| {
                dataset.data.get(index).map(|value| ChartElement {
                    dataset_index,
                    index,
                    value: *value,
                })
            })
            .collect()
    }

    fn set_dataset_visibility(&mut self, dataset_index: usize, visible: bool) {
        if dataset_index >= self.data.datasets.len() {
            return;
        }
        if self.visible.len() <= dataset_index {
            self.visible.resize(dataset_index + 1, true);
        }
        self.visible[dataset_index] = visible;
    }

    fn is_dataset_visible(&self, dataset_index: usize) -> bool {
        match self.visible.get(dataset_index) {
            Some(visible) => *visible,
            None => self
                .data
                .datasets
                .get(dataset_index)
                .is_some_and(|d| !d.hidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::SERIES_PALETTE;

    fn data() -> ChartData {
        let mut hidden = Dataset::new("go".into(), "Go", SERIES_PALETTE[1], vec![3.0, 4.0]);
        hidden.hidden = true;
        ChartData {
            labels: vec!["a".into(), "b".into()],
            datasets: vec![
                Dataset::new("rust".into(), "Rust", SERIES_PALETTE[0], vec![1.0, 2.0]),
                hidden,
            ],
        }
    }

    #[test]
    fn test_model_initial_visibility_follows_hidden_flag() {
        let model = ChartModel::new(ChartKind::Line, data(), ChartOptions::default());
        assert!(model.is_dataset_visible(0));
        assert!(!model.is_dataset_visible(1));
        assert!(!model.is_dataset_visible(5));
    }

    #[test]
    fn test_elements_at_skips_hidden_datasets() {
        let mut model = ChartModel::new(ChartKind::Line, data(), ChartOptions::default());
        let elements = model.elements_at(1);
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].value, 2.0);

        model.set_dataset_visibility(1, true);
        assert_eq!(model.elements_at(1).len(), 2);
        assert!(model.elements_at(9).is_empty());
    }

    #[test]
    fn test_update_resyncs_visibility_length() {
        let mut model = ChartModel::new(ChartKind::Line, data(), ChartOptions::default());
        model.data_mut().datasets.truncate(1);
        model.update();
        assert_eq!(model.update_count(), 1);
        assert!(!model.is_dataset_visible(1));
    }

    #[test]
    fn test_set_visibility_out_of_range_is_ignored() {
        let mut model = ChartModel::new(ChartKind::Bar, data(), ChartOptions::default());
        model.set_dataset_visibility(7, false);
        assert!(model.is_dataset_visible(0));
    }
}
