//! Applying derived data to a live chart with minimal disruption.
//!
//! A surface moves through a small state machine:
//!
//! ```text
//! Uninitialized --apply(K)--> Rendered(K)
//! Rendered(K)   --apply(K)--> Rendered(K)    in-place update
//! Rendered(K)   --apply(K')-> Rendered(K')   destroy, then construct
//! Rendered(K)   --clear-----> Uninitialized
//! ```
//!
//! The chart's own visibility flags are the only record of which datasets
//! are shown. Legend chips are rebuilt from them after every apply.

use std::collections::HashSet;
use std::sync::Arc;

use techstats_core::SeriesKey;
use tracing::debug;

use crate::chart::{ChartData, ChartInstance, ChartKind, ChartOptions, ChartRenderer};
use crate::surface::{ChartSurface, LegendChip};

/// What an apply did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A chart was built on an empty surface.
    Constructed,
    /// The existing chart was updated in place.
    Updated,
    /// The chart kind changed, so the old chart was destroyed and a new one
    /// built.
    Rebuilt,
    /// The chart was destroyed and its legend cleared.
    Cleared,
    /// The payload held no points; the chart was left as it was.
    NoData,
    /// The surface has no canvas; nothing was drawn.
    NoCanvas,
    /// A newer refresh was issued after this one; the response was dropped.
    Stale,
}

impl ApplyOutcome {
    /// Whether the chart now shows the applied data.
    pub fn rendered(&self) -> bool {
        matches!(self, Self::Constructed | Self::Updated | Self::Rebuilt)
    }
}

/// Lifecycle state of one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    Rendered(ChartKind),
}

/// Owns at most one chart for one surface.
pub struct ChartReconciler {
    renderer: Arc<dyn ChartRenderer>,
    options: ChartOptions,
    chart: Option<Box<dyn ChartInstance>>,
}

impl ChartReconciler {
    pub fn new(renderer: Arc<dyn ChartRenderer>, options: ChartOptions) -> Self {
        Self {
            renderer,
            options,
            chart: None,
        }
    }

    pub fn state(&self) -> SurfaceState {
        match &self.chart {
            Some(chart) => SurfaceState::Rendered(chart.kind()),
            None => SurfaceState::Uninitialized,
        }
    }

    pub fn chart(&self) -> Option<&dyn ChartInstance> {
        self.chart.as_deref()
    }

    /// Put `data` on the surface as a `kind` chart.
    ///
    /// Same kind: labels and datasets are swapped in place and the chart
    /// re-rendered; datasets whose key was hidden before stay hidden.
    /// Different kind: the old chart is destroyed first. A surface without a
    /// canvas is left untouched.
    pub fn apply_to_chart(
        &mut self,
        surface: &mut dyn ChartSurface,
        kind: ChartKind,
        mut data: ChartData,
    ) -> ApplyOutcome {
        let Some(canvas) = surface.canvas().cloned() else {
            debug!("Surface has no canvas, skipping render");
            return ApplyOutcome::NoCanvas;
        };

        let same_kind = self.chart.as_ref().is_some_and(|c| c.kind() == kind);
        let outcome = match self.chart.as_mut() {
            Some(chart) if same_kind => {
                let hidden = hidden_keys(&**chart);
                for dataset in &mut data.datasets {
                    dataset.hidden |= hidden.contains(&dataset.key);
                }
                let visibility: Vec<bool> = data.datasets.iter().map(|d| !d.hidden).collect();
                *chart.data_mut() = data;
                for (index, visible) in visibility.into_iter().enumerate() {
                    chart.set_dataset_visibility(index, visible);
                }
                chart.update();
                ApplyOutcome::Updated
            }
            _ => {
                let outcome = match self.chart.take() {
                    Some(mut old) => {
                        debug!(from = %old.kind(), to = %kind, canvas = %canvas.id, "Chart kind changed, rebuilding");
                        old.destroy();
                        ApplyOutcome::Rebuilt
                    }
                    None => {
                        debug!(kind = %kind, canvas = %canvas.id, "Constructing chart");
                        ApplyOutcome::Constructed
                    }
                };
                self.chart = Some(self.renderer.construct(&canvas, kind, data, self.options.clone()));
                outcome
            }
        };

        self.rebuild_legend(surface);
        outcome
    }

    /// Flip dataset `index` and return its new visibility.
    ///
    /// Reads the current flag from the chart itself, so any sequence of
    /// toggles leaves chart and legend agreeing. `None` if there is no chart
    /// or no such dataset.
    pub fn toggle_visibility(&mut self, surface: &mut dyn ChartSurface, index: usize) -> Option<bool> {
        let chart = self.chart.as_mut()?;
        if index >= chart.data().datasets.len() {
            return None;
        }
        let visible = chart.is_dataset_visible(index);
        chart.set_dataset_visibility(index, !visible);
        chart.update();

        let now_visible = chart.is_dataset_visible(index);
        if let Some(legend) = surface.legend_container() {
            legend.set_active(index, now_visible);
        }
        Some(now_visible)
    }

    /// Destroy the chart, if any, and empty the legend.
    pub fn clear(&mut self, surface: &mut dyn ChartSurface) -> ApplyOutcome {
        if let Some(mut chart) = self.chart.take() {
            chart.destroy();
        }
        if let Some(legend) = surface.legend_container() {
            legend.clear();
        }
        ApplyOutcome::Cleared
    }

    /// Legend chips mirroring the chart's datasets and visibility flags.
    pub fn rebuild_legend(&self, surface: &mut dyn ChartSurface) {
        let Some(legend) = surface.legend_container() else {
            return;
        };
        match self.chart.as_deref() {
            Some(chart) => legend.replace(legend_chips(chart)),
            None => legend.clear(),
        }
    }
}

/// One chip per dataset, `active` read from the chart.
pub fn legend_chips(chart: &dyn ChartInstance) -> Vec<LegendChip> {
    chart
        .data()
        .datasets
        .iter()
        .enumerate()
        .map(|(index, dataset)| LegendChip {
            index,
            label: dataset.label.clone(),
            color: dataset.color,
            active: chart.is_dataset_visible(index),
        })
        .collect()
}

fn hidden_keys(chart: &dyn ChartInstance) -> HashSet<SeriesKey> {
    chart
        .data()
        .datasets
        .iter()
        .enumerate()
        .filter(|(i, _)| !chart.is_dataset_visible(*i))
        .map(|(_, d)| d.key.clone())
        .collect()
}
