//! Application state for the TUI.

use std::collections::VecDeque;

use serde_json::Value;
use techstats_charts::{
    ApplyOutcome, DashboardSession, Panel, PendingRefresh, PickerOption, SelectionChange, MAX_SELECTION,
};
use techstats_core::{Range, RepoMetric};
use tracing::debug;

use crate::config::TuiConfig;
use crate::keys::{InputMode, SearchEdit};
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::persistence::PersistedState;
use crate::surface::ViewSurface;
use crate::theme::DashboardTheme;

const MAX_NOTIFICATIONS: usize = 5;

pub struct App {
    pub config: TuiConfig,
    pub theme: DashboardTheme,
    pub session: DashboardSession,
    pub active_view: View,
    pub surfaces: [ViewSurface; 4],
    pub legend_cursor: usize,
    pub picker_cursor: usize,
    pub input_mode: InputMode,
    pub notifications: VecDeque<Notification>,
}

impl App {
    pub fn new(config: TuiConfig, session: DashboardSession) -> Self {
        let surfaces = [
            ViewSurface::new("topics"),
            ViewSurface::new("languages"),
            ViewSurface::new("comparison"),
            ViewSurface::new("ranked"),
        ];
        Self {
            config,
            theme: DashboardTheme::dark(),
            session,
            active_view: View::default(),
            surfaces,
            legend_cursor: 0,
            picker_cursor: 0,
            input_mode: InputMode::Normal,
            notifications: VecDeque::new(),
        }
    }

    pub fn restore(&mut self, state: PersistedState) {
        self.active_view = state.active_view;
        self.session.set_range(state.range);
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            active_view: self.active_view,
            range: self.session.range(),
        }
    }

    pub fn surface(&self, view: View) -> &ViewSurface {
        &self.surfaces[view.index()]
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push_back(Notification::new(level, message));
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn switch_view(&mut self, view: View) {
        if self.active_view != view {
            self.active_view = view;
            self.legend_cursor = 0;
            self.picker_cursor = 0;
        }
    }

    pub fn move_legend(&mut self, delta: isize) {
        let len = self.surface(self.active_view).legend.len();
        self.legend_cursor = step(self.legend_cursor, delta, len);
    }

    pub fn move_picker(&mut self, delta: isize) {
        let len = self.list_len();
        self.picker_cursor = step(self.picker_cursor, delta, len);
    }

    /// Length of the list the picker cursor walks in the active view.
    fn list_len(&self) -> usize {
        match self.active_view {
            View::Topics => self.surface(View::Topics).selector.options().len(),
            View::Comparison => self.picker_options().len(),
            View::Languages | View::Ranked => 0,
        }
    }

    // ========================================================================
    // REFRESH
    // ========================================================================

    /// Issue refreshes for `views`.
    ///
    /// An empty comparison is cleared on the spot instead of being fetched.
    pub fn begin_refresh(&mut self, views: &[View]) -> Vec<PendingRefresh> {
        let mut pending = Vec::new();
        for view in views {
            let panel = view.panel();
            if panel == Panel::Comparison && self.session.selection().is_empty() {
                self.session.begin_refresh(panel);
                let surface = &mut self.surfaces[view.index()];
                self.session.apply_comparison(surface);
                continue;
            }
            pending.push(self.session.begin_refresh(panel));
        }
        pending
    }

    pub fn complete_refresh(&mut self, pending: &PendingRefresh, payload: Value) -> ApplyOutcome {
        let view = view_for(pending.panel);
        let surface = &mut self.surfaces[view.index()];
        let outcome = self.session.complete_refresh(surface, pending, payload);
        debug!(panel = ?pending.panel, outcome = ?outcome, "Refresh completed");
        if outcome == ApplyOutcome::NoData && pending.panel != Panel::Comparison {
            self.notify(
                NotificationLevel::Warning,
                format!("No data for {}", pending.panel.title()),
            );
        }
        self.clamp_cursors();
        outcome
    }

    pub fn load_repo_list(&mut self, payload: &Value) -> usize {
        let count = self.session.load_repo_list(payload);
        self.clamp_cursors();
        count
    }

    /// Switch range. Returns whether every panel needs refetching.
    pub fn set_range(&mut self, range: Range) -> bool {
        self.session.set_range(range)
    }

    /// Switch the comparison metric and redraw from the stored payload.
    pub fn set_metric(&mut self, metric: RepoMetric) -> ApplyOutcome {
        if !self.session.set_metric(metric) {
            return ApplyOutcome::NoData;
        }
        let surface = &mut self.surfaces[View::Comparison.index()];
        self.session.apply_comparison(surface)
    }

    // ========================================================================
    // INTERACTION
    // ========================================================================

    /// Flip the dataset under the legend cursor.
    pub fn toggle_dataset(&mut self) -> Option<bool> {
        let view = self.active_view;
        let surface = &mut self.surfaces[view.index()];
        self.session.toggle_visibility(view.panel(), surface, self.legend_cursor)
    }

    pub fn toggle_ranked_kind(&mut self) -> ApplyOutcome {
        let surface = &mut self.surfaces[View::Ranked.index()];
        self.session.toggle_ranked_kind(surface)
    }

    pub fn picker_options(&self) -> Vec<PickerOption> {
        self.session.picker().options(self.session.selection())
    }

    /// Add or remove the repository under the picker cursor and redraw the
    /// comparison. Returns the change and whether a fetch is still needed.
    pub fn toggle_highlighted_repo(&mut self) -> Option<(SelectionChange, bool)> {
        let option = self.picker_options().into_iter().nth(self.picker_cursor)?;
        Some(self.toggle_repo(&option.id))
    }

    /// Remove a selected repository chip by position.
    pub fn remove_selected(&mut self, index: usize) -> Option<(SelectionChange, bool)> {
        let id = self.session.selection().selected().get(index)?.clone();
        Some(self.toggle_repo(&id))
    }

    fn toggle_repo(&mut self, id: &techstats_core::SeriesKey) -> (SelectionChange, bool) {
        let change = self.session.toggle_repo(id);
        if change == SelectionChange::Rejected {
            self.notify(
                NotificationLevel::Warning,
                format!("At most {} repositories can be compared", MAX_SELECTION),
            );
            return (change, false);
        }
        let surface = &mut self.surfaces[View::Comparison.index()];
        let outcome = self.session.apply_comparison(surface);
        self.clamp_cursors();
        let needs_fetch = outcome == ApplyOutcome::NoData && !self.session.selection().is_empty();
        (change, needs_fetch)
    }

    /// Flip the topic under the cursor in the topic selector and return the
    /// new filter. An emptied filter falls back to the top-N default.
    pub fn toggle_highlighted_topic(&mut self) -> Option<Vec<techstats_core::SeriesKey>> {
        let selector = &self.surfaces[View::Topics.index()].selector;
        let option = selector.options().get(self.picker_cursor)?;
        let mut keys = selector.selected_keys();
        match keys.iter().position(|k| k == &option.key) {
            Some(pos) => {
                keys.remove(pos);
            }
            None => keys.push(option.key.clone()),
        }
        self.session.set_topic_filter(keys.clone());
        Some(keys)
    }

    pub fn open_search(&mut self) {
        self.input_mode = InputMode::Search;
    }

    pub fn edit_search(&mut self, edit: SearchEdit) {
        let mut query = self.session.picker().query().to_string();
        match edit {
            SearchEdit::Push(c) => query.push(c),
            SearchEdit::Backspace => {
                query.pop();
            }
            SearchEdit::Accept => self.input_mode = InputMode::Normal,
            SearchEdit::Abort => {
                query.clear();
                self.input_mode = InputMode::Normal;
            }
        }
        self.session.picker_mut().set_query(query);
        self.picker_cursor = 0;
    }

    fn clamp_cursors(&mut self) {
        let legend_len = self.surface(self.active_view).legend.len();
        self.legend_cursor = self.legend_cursor.min(legend_len.saturating_sub(1));
        let list_len = self.list_len();
        self.picker_cursor = self.picker_cursor.min(list_len.saturating_sub(1));
    }
}

pub fn view_for(panel: Panel) -> View {
    match panel {
        Panel::Topics => View::Topics,
        Panel::Languages => View::Languages,
        Panel::Comparison => View::Comparison,
        Panel::Ranked => View::Ranked,
    }
}

fn step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = cursor as isize + delta;
    next.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clamps_to_list() {
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(1, 5, 3), 2);
        assert_eq!(step(2, -1, 3), 1);
        assert_eq!(step(4, 1, 0), 0);
    }

    #[test]
    fn test_view_for_matches_panel() {
        for view in View::all() {
            assert_eq!(view_for(view.panel()), *view);
        }
    }
}
