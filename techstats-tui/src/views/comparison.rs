//! Repository comparison view: chart, selected chips, and the picker.

use crate::keys::InputMode;
use crate::nav::View;
use crate::state::App;
use crate::views::helpers::{render_legend, render_line_chart, render_placeholder, render_summary, titled_block};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};
use techstats_charts::MAX_SELECTION;

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8)])
        .split(columns[0]);

    if app.session.selection().is_empty() {
        render_placeholder(
            f,
            app,
            left[0],
            View::Comparison.panel().title(),
            "Select repositories to compare",
        );
    } else {
        render_line_chart(f, app, left[0], View::Comparison);
    }
    render_summary(f, app, left[1], View::Comparison);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(MAX_SELECTION as u16 + 2),
            Constraint::Min(0),
        ])
        .split(columns[1]);

    render_search(f, app, side[0]);
    let chips_title = format!(
        "Selected {}/{}",
        app.session.selection().len(),
        MAX_SELECTION
    );
    render_legend(f, app, side[1], View::Comparison, &chips_title);
    render_picker(f, app, side[2]);
}

fn render_search(f: &mut Frame<'_>, app: &App, area: Rect) {
    let searching = app.input_mode == InputMode::Search;
    let query = app.session.picker().query();
    let text = if searching {
        format!("{}_", query)
    } else if query.is_empty() {
        "/ to search".to_string()
    } else {
        query.to_string()
    };
    let color = if searching {
        app.theme.text
    } else {
        app.theme.text_dim
    };
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(titled_block(app, "Search", searching));
    f.render_widget(paragraph, area);
}

fn render_picker(f: &mut Frame<'_>, app: &App, area: Rect) {
    let options = app.picker_options();
    let items: Vec<ListItem> = options
        .iter()
        .map(|option| {
            let style = if option.disabled {
                Style::default()
                    .fg(app.theme.text_muted)
                    .add_modifier(Modifier::DIM)
            } else {
                Style::default().fg(app.theme.text)
            };
            ListItem::new(Line::from(Span::styled(option.name.clone(), style)))
        })
        .collect();

    let mut state = ListState::default();
    if !options.is_empty() {
        state.select(Some(app.picker_cursor));
    }
    let title = format!("Repositories ({})", options.len());
    let list = List::new(items)
        .block(titled_block(app, title, false))
        .highlight_style(Style::default().bg(app.theme.bg_highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}
