//! Ranked view: latest language counts as bars or as doughnut shares.

use crate::nav::View;
use crate::state::App;
use crate::theme::series_color;
use crate::views::helpers::{render_placeholder, titled_block};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Gauge},
    Frame,
};
use techstats_charts::{format_thousands, ChartData, ChartKind};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let panel = View::Ranked.panel();
    let Some(chart) = app.session.chart(panel) else {
        render_placeholder(f, app, area, panel.title(), "No data yet");
        return;
    };
    match chart.kind() {
        ChartKind::Doughnut => render_shares(f, app, area, chart.data()),
        _ => render_bars(f, app, area, chart.data()),
    }
}

fn render_bars(f: &mut Frame<'_>, app: &App, area: Rect, data: &ChartData) {
    let Some(dataset) = data.datasets.first() else {
        return;
    };
    let bars: Vec<Bar> = data
        .labels
        .iter()
        .zip(&dataset.data)
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::default()
                .value(value.max(0.0).round() as u64)
                .text_value(format_thousands(*value))
                .label(Line::from(label.clone()))
                .style(Style::default().fg(series_color(dataset.element_color(i))))
        })
        .collect();

    let width = if bars.is_empty() {
        1
    } else {
        (area.width.saturating_sub(2) / bars.len() as u16).saturating_sub(1).clamp(3, 12)
    };
    let widget = BarChart::default()
        .block(titled_block(app, "Language ranking (bars)", true))
        .bar_width(width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(widget, area);
}

/// Doughnut slices drawn as one share gauge per language.
fn render_shares(f: &mut Frame<'_>, app: &App, area: Rect, data: &ChartData) {
    let Some(dataset) = data.datasets.first() else {
        return;
    };
    let total: f64 = dataset.data.iter().sum();

    let block = titled_block(app, "Language ranking (shares)", true);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            data.labels
                .iter()
                .map(|_| Constraint::Length(1))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(inner);

    for (i, (label, value)) in data.labels.iter().zip(&dataset.data).enumerate() {
        let Some(row) = rows.get(i) else {
            break;
        };
        let ratio = if total > 0.0 { (value / total).clamp(0.0, 1.0) } else { 0.0 };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(series_color(dataset.element_color(i))).bg(app.theme.bg))
            .ratio(ratio)
            .label(format!("{} {:.1}%", label, ratio * 100.0));
        f.render_widget(gauge, *row);
    }
}
