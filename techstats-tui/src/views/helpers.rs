//! Shared drawing helpers: line charts, legends and trend summaries.

use crate::nav::View;
use crate::state::App;
use crate::theme::{series_color, trend_color};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph},
    Frame,
};
use techstats_charts::{format_thousands, format_tick};

pub fn titled_block<'a>(app: &App, title: impl Into<String>, focused: bool) -> Block<'a> {
    let border = if focused {
        app.theme.border_focus
    } else {
        app.theme.border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(title.into(), Style::default().fg(app.theme.text)))
}

pub fn render_placeholder(f: &mut Frame<'_>, app: &App, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.text_muted))
        .block(titled_block(app, title, false));
    f.render_widget(paragraph, area);
}

/// Draw the live line chart of `view`. Hidden datasets are skipped.
pub fn render_line_chart(f: &mut Frame<'_>, app: &App, area: Rect, view: View) {
    let panel = view.panel();
    let Some(chart) = app.session.chart(panel) else {
        render_placeholder(f, app, area, panel.title(), "No data yet");
        return;
    };
    let data = chart.data();

    let points: Vec<Vec<(f64, f64)>> = data
        .datasets
        .iter()
        .map(|d| d.data.iter().enumerate().map(|(x, y)| (x as f64, *y)).collect())
        .collect();
    let max_y = data
        .datasets
        .iter()
        .enumerate()
        .filter(|(i, _)| chart.is_dataset_visible(*i))
        .flat_map(|(_, d)| d.data.iter().copied())
        .fold(0.0_f64, f64::max);
    let top = if max_y > 0.0 { max_y * 1.1 } else { 1.0 };

    let datasets: Vec<Dataset> = data
        .datasets
        .iter()
        .enumerate()
        .filter(|(i, _)| chart.is_dataset_visible(*i))
        .map(|(i, d)| {
            Dataset::default()
                .name(d.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(d.color)))
                .data(&points[i])
        })
        .collect();

    let x_labels = axis_labels(&data.labels);
    let last_x = data.labels.len().saturating_sub(1).max(1) as f64;
    let tick = |v: f64| format_tick(v.round());
    let y_labels = vec![
        Span::raw(tick(0.0)),
        Span::raw(tick(top / 2.0)),
        Span::raw(tick(top)),
    ];

    let widget = Chart::new(datasets)
        .block(titled_block(app, panel.title(), true))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.text_dim))
                .bounds([0.0, last_x])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.text_dim))
                .bounds([0.0, top])
                .labels(y_labels),
        );
    f.render_widget(widget, area);
}

/// First, middle and last x labels.
fn axis_labels(labels: &[String]) -> Vec<Span<'static>> {
    match labels.len() {
        0 => Vec::new(),
        1 => vec![Span::raw(labels[0].clone())],
        n => vec![
            Span::raw(labels[0].clone()),
            Span::raw(labels[n / 2].clone()),
            Span::raw(labels[n - 1].clone()),
        ],
    }
}

/// Legend chips of `view` with the legend cursor highlighted.
pub fn render_legend(f: &mut Frame<'_>, app: &App, area: Rect, view: View, title: &str) {
    let legend = &app.surface(view).legend;
    let items: Vec<ListItem> = legend
        .chips()
        .iter()
        .map(|chip| {
            let marker = if chip.active { "●" } else { "○" };
            let mut style = Style::default().fg(series_color(chip.color));
            if !chip.active {
                style = style.add_modifier(Modifier::CROSSED_OUT | Modifier::DIM);
            }
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", marker), Style::default().fg(series_color(chip.color))),
                Span::styled(chip.label.clone(), style),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if !legend.is_empty() && app.active_view == view {
        state.select(Some(app.legend_cursor));
    }
    let list = List::new(items)
        .block(titled_block(app, title, false))
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

/// Latest value and change per shown series, plus the newest tooltip.
pub fn render_summary(f: &mut Frame<'_>, app: &App, area: Rect, view: View) {
    let panel = view.panel();
    let mut lines: Vec<Line> = Vec::new();

    let last = app
        .session
        .chart(panel)
        .map(|c| c.data().labels.len())
        .unwrap_or(0);
    if let Some(tooltip) = last.checked_sub(1).and_then(|i| app.session.tooltip(panel, i)) {
        lines.push(Line::from(Span::styled(
            tooltip.title,
            Style::default().fg(app.theme.text).add_modifier(Modifier::BOLD),
        )));
    }

    for summary in app.session.summary(panel) {
        let change = match (summary.diff, summary.pct_change) {
            (Some(diff), Some(pct)) => format!("{:+} ({:+.1}%)", diff, pct),
            (Some(diff), None) => format!("{:+}", diff),
            _ => "n/a".to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<18}", summary.label),
                Style::default().fg(app.theme.text),
            ),
            Span::raw(format!("{:>10} ", format_thousands(summary.latest))),
            Span::styled(change, Style::default().fg(trend_color(summary.diff, &app.theme))),
        ]));
    }

    let paragraph = Paragraph::new(lines).block(titled_block(app, "Summary", false));
    f.render_widget(paragraph, area);
}
