//! Chart surfaces: where a chart, its legend, and its selector live.

use serde::{Deserialize, Serialize};
use techstats_core::SeriesKey;

use crate::palette::Color;

/// Identifies a drawing target for a chart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Canvas {
    pub id: String,
}

impl Canvas {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One legend chip per dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendChip {
    pub index: usize,
    pub label: String,
    pub color: Color,
    /// Mirrors the chart's visibility flag for the dataset.
    pub active: bool,
}

/// Legend container contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Legend {
    chips: Vec<LegendChip>,
}

impl Legend {
    pub fn chips(&self) -> &[LegendChip] {
        &self.chips
    }

    pub fn replace(&mut self, chips: Vec<LegendChip>) {
        self.chips = chips;
    }

    pub fn clear(&mut self) {
        self.chips.clear();
    }

    pub fn set_active(&mut self, index: usize, active: bool) {
        if let Some(chip) = self.chips.iter_mut().find(|c| c.index == index) {
            chip.active = active;
        }
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }
}

/// One selectable series key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    pub key: SeriesKey,
    pub label: String,
    pub selected: bool,
}

/// Selector container contents: the full key set, with the displayed ones
/// flagged, so the user can override a top-N default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    options: Vec<SelectorOption>,
}

impl Selector {
    pub fn options(&self) -> &[SelectorOption] {
        &self.options
    }

    pub fn replace(&mut self, options: Vec<SelectorOption>) {
        self.options = options;
    }

    pub fn clear(&mut self) {
        self.options.clear();
    }

    pub fn selected_keys(&self) -> Vec<SeriesKey> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.key.clone())
            .collect()
    }
}

/// Where a chart is drawn.
///
/// Any container may be absent; the reconciler skips whatever is missing.
pub trait ChartSurface {
    fn canvas(&self) -> Option<&Canvas>;

    fn legend_container(&mut self) -> Option<&mut Legend>;

    fn selector_container(&mut self) -> Option<&mut Selector>;
}
