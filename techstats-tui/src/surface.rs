//! Chart surfaces owned by the terminal views.

use techstats_charts::{Canvas, ChartSurface, Legend, Selector};

/// Canvas, legend and selector of one view.
#[derive(Debug, Clone, Default)]
pub struct ViewSurface {
    pub canvas: Option<Canvas>,
    pub legend: Legend,
    pub selector: Selector,
}

impl ViewSurface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            canvas: Some(Canvas::new(id)),
            ..Self::default()
        }
    }
}

impl ChartSurface for ViewSurface {
    fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    fn legend_container(&mut self) -> Option<&mut Legend> {
        Some(&mut self.legend)
    }

    fn selector_container(&mut self) -> Option<&mut Selector> {
        Some(&mut self.selector)
    }
}
