//! Topic and language time-series views.

use crate::nav::View;
use crate::state::App;
use crate::views::helpers::{render_legend, render_line_chart, render_summary, titled_block};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect, view: View) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    render_line_chart(f, app, columns[0], view);

    let side = if view == View::Topics {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Percentage(30),
                Constraint::Percentage(35),
            ])
            .split(columns[1])
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1])
    };

    render_legend(f, app, side[0], view, "Legend");
    render_summary(f, app, side[1], view);
    if view == View::Topics {
        render_selector(f, app, side[2]);
    }
}

/// Every topic of the latest point; checked ones are charted.
fn render_selector(f: &mut Frame<'_>, app: &App, area: Rect) {
    let selector = &app.surface(View::Topics).selector;
    let items: Vec<ListItem> = selector
        .options()
        .iter()
        .map(|option| {
            let mark = if option.selected { "[x]" } else { "[ ]" };
            let color = if option.selected {
                app.theme.text
            } else {
                app.theme.text_dim
            };
            ListItem::new(Line::from(Span::styled(
                format!("{} {}", mark, option.label),
                Style::default().fg(color),
            )))
        })
        .collect();

    let mut state = ListState::default();
    if !selector.options().is_empty() {
        state.select(Some(app.picker_cursor));
    }
    let title = if app.session.topic_filter().is_empty() {
        "Topics (top N)"
    } else {
        "Topics (custom)"
    };
    let list = List::new(items)
        .block(titled_block(app, title, false))
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}
