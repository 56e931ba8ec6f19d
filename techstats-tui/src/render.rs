//! Chart renderer for terminal views.
//!
//! Terminal charts are drawn from the live chart state on every frame, so an
//! instance only has to hold that state. Lifecycle calls are logged so a
//! rebuild can be told apart from an in-place update in the log file.

use techstats_charts::{
    Canvas, ChartData, ChartElement, ChartInstance, ChartKind, ChartModel, ChartOptions, ChartRenderer,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

impl ChartRenderer for TerminalRenderer {
    fn construct(
        &self,
        canvas: &Canvas,
        kind: ChartKind,
        data: ChartData,
        options: ChartOptions,
    ) -> Box<dyn ChartInstance> {
        debug!(canvas = %canvas.id, kind = %kind, datasets = data.datasets.len(), "Chart constructed");
        Box::new(TerminalChart {
            canvas: canvas.id.clone(),
            model: ChartModel::new(kind, data, options),
        })
    }
}

/// A chart bound to one view's canvas.
pub struct TerminalChart {
    canvas: String,
    model: ChartModel,
}

impl ChartInstance for TerminalChart {
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
        debug!(canvas = %self.canvas, updates = self.model.update_count(), "Chart updated");
    }

    fn destroy(&mut self) {
        self.model.destroy();
        debug!(canvas = %self.canvas, "Chart destroyed");
    }

    fn elements_at(&self, index: usize) -> Vec<ChartElement> {
        self.model.elements_at(index)
    }

    fn set_dataset_visibility(&mut self, dataset_index: usize, visible: bool) {
        self.model.set_dataset_visibility(dataset_index, visible);
    }

    fn is_dataset_visible(&self, dataset_index: usize) -> bool {
        self.model.is_dataset_visible(dataset_index)
    }
}
