//! View rendering dispatch.

pub mod comparison;
pub mod helpers;
pub mod line;
pub mod ranked;

use crate::keys::InputMode;
use crate::nav::View;
use crate::state::App;
use crate::theme::notification_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.active_view {
        View::Topics | View::Languages => line::render(f, app, layout[1], app.active_view),
        View::Comparison => comparison::render(f, app, layout[1]),
        View::Ranked => ranked::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    let title = format!(
        "TECH STATS | Range: {} | Metric: {}",
        app.session.range(),
        app.session.metric().title()
    );
    let tabs = Tabs::new(titles)
        .select(app.active_view.index())
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(Span::styled(title, Style::default().fg(app.theme.primary))),
        );
    f.render_widget(tabs, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = match (app.input_mode, app.active_view) {
        (InputMode::Search, _) => "type to filter • Enter keep • Esc clear",
        (_, View::Comparison) => {
            "j/k pick • Space add • x remove • / search • s/f/i/z metric • h/l v legend • q quit"
        }
        (_, View::Ranked) => "b bar/doughnut • w/m range • r refresh • Tab switch view • q quit",
        (_, View::Topics) => "j/k Space topics • h/l v legend • w/m range • r refresh • q quit",
        (_, View::Languages) => "h/l v legend • w/m range • r refresh • Tab switch view • q quit",
    };
    let (text, style) = match app.notifications.back() {
        Some(note) => (
            format!("{}: {}", note.label(), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(style);
    f.render_widget(footer, area);
}
