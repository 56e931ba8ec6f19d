//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use techstats_core::{Range, RepoMetric};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextView,
    PrevView,
    SwitchView(usize),
    SetRange(Range),
    SetMetric(RepoMetric),
    LegendLeft,
    LegendRight,
    ToggleDataset,
    PickerUp,
    PickerDown,
    ToggleRepo,
    RemoveRepo,
    OpenSearch,
    ToggleRankedKind,
    Refresh,
    Cancel,
}

/// How key presses are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the repository search filter.
    Search,
}

/// What a key press does while editing the search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEdit {
    Push(char),
    Backspace,
    /// Keep the filter and leave search mode.
    Accept,
    /// Clear the filter and leave search mode.
    Abort,
}

pub fn map_key(event: KeyEvent) -> Option<Action> {
    let KeyEvent { code, modifiers, .. } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        };
    }

    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Tab => Some(Action::NextView),
        KeyCode::BackTab => Some(Action::PrevView),
        KeyCode::Char('w') => Some(Action::SetRange(Range::Weekly)),
        KeyCode::Char('m') => Some(Action::SetRange(Range::Monthly)),
        KeyCode::Char('s') => Some(Action::SetMetric(RepoMetric::Stars)),
        KeyCode::Char('f') => Some(Action::SetMetric(RepoMetric::Forks)),
        KeyCode::Char('i') => Some(Action::SetMetric(RepoMetric::OpenIssues)),
        KeyCode::Char('z') => Some(Action::SetMetric(RepoMetric::Size)),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::LegendLeft),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::LegendRight),
        KeyCode::Char('v') => Some(Action::ToggleDataset),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::PickerUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::PickerDown),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::ToggleRepo),
        KeyCode::Char('x') | KeyCode::Delete => Some(Action::RemoveRepo),
        KeyCode::Char('/') => Some(Action::OpenSearch),
        KeyCode::Char('b') => Some(Action::ToggleRankedKind),
        KeyCode::Char('r') => Some(Action::Refresh),
        KeyCode::Char(c @ '1'..='4') => Some(Action::SwitchView(c as usize - '1' as usize)),
        _ => None,
    }
}

pub fn map_search_key(event: KeyEvent) -> Option<SearchEdit> {
    match event.code {
        KeyCode::Enter => Some(SearchEdit::Accept),
        KeyCode::Esc => Some(SearchEdit::Abort),
        KeyCode::Backspace => Some(SearchEdit::Backspace),
        KeyCode::Char(c) if !event.modifiers.contains(KeyModifiers::CONTROL) => Some(SearchEdit::Push(c)),
        _ => None,
    }
}
