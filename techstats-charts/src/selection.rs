//! Repository selection for the comparison chart, and the picker model.
//!
//! Selection decides which repositories are in the chart. The hidden set
//! only remembers which of them the user switched off in the legend, so a
//! rebuilt chart can restore that.

use std::collections::HashSet;

use techstats_core::{RepoListing, SeriesKey};

/// Maximum number of repositories compared at once.
pub const MAX_SELECTION: usize = 5;

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Added,
    Removed,
    /// Adding would exceed [`MAX_SELECTION`].
    Rejected,
}

/// Ordered, bounded set of selected keys plus a legend hidden-set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Vec<SeriesKey>,
    hidden: HashSet<SeriesKey>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected keys in selection order.
    pub fn selected(&self) -> &[SeriesKey] {
        &self.selected
    }

    pub fn contains(&self, key: &SeriesKey) -> bool {
        self.selected.contains(key)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= MAX_SELECTION
    }

    /// Add `key`; returns `false` if present already or the set is full.
    pub fn add(&mut self, key: SeriesKey) -> bool {
        if self.contains(&key) || self.is_full() {
            return false;
        }
        self.selected.push(key);
        true
    }

    /// Remove `key` and forget its hidden flag.
    pub fn remove(&mut self, key: &SeriesKey) -> bool {
        let before = self.selected.len();
        self.selected.retain(|k| k != key);
        self.hidden.remove(key);
        before != self.selected.len()
    }

    pub fn toggle(&mut self, key: SeriesKey) -> SelectionChange {
        if self.remove(&key) {
            SelectionChange::Removed
        } else if self.add(key) {
            SelectionChange::Added
        } else {
            SelectionChange::Rejected
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.hidden.clear();
    }

    pub fn is_hidden(&self, key: &SeriesKey) -> bool {
        self.hidden.contains(key)
    }

    /// Record a legend toggle. Keys that are not selected are ignored.
    pub fn set_hidden(&mut self, key: &SeriesKey, hidden: bool) {
        if hidden && self.contains(key) {
            self.hidden.insert(key.clone());
        } else {
            self.hidden.remove(key);
        }
    }
}

/// One row of the repository picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOption {
    pub id: SeriesKey,
    pub name: String,
    /// Set once the selection is full.
    pub disabled: bool,
}

/// Repository list plus search filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoPicker {
    repos: Vec<RepoListing>,
    query: String,
}

impl RepoPicker {
    pub fn new(repos: Vec<RepoListing>) -> Self {
        let mut picker = Self::default();
        picker.set_repos(repos);
        picker
    }

    /// Replace the list, sorted alphabetically (case-insensitive).
    pub fn set_repos(&mut self, mut repos: Vec<RepoListing>) {
        repos.sort_by_cached_key(|r| r.name.to_lowercase());
        self.repos = repos;
    }

    pub fn repos(&self) -> &[RepoListing] {
        &self.repos
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    pub fn find(&self, id: &SeriesKey) -> Option<&RepoListing> {
        self.repos.iter().find(|r| &r.id == id)
    }

    /// Display name for `id`, falling back to the id itself.
    pub fn name_of(&self, id: &SeriesKey) -> String {
        self.find(id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Unselected repositories whose name contains the query.
    pub fn options(&self, selection: &SelectionState) -> Vec<PickerOption> {
        let query = self.query.trim().to_lowercase();
        let disabled = selection.is_full();
        self.repos
            .iter()
            .filter(|r| !selection.contains(&r.id))
            .filter(|r| query.is_empty() || r.name.to_lowercase().contains(&query))
            .map(|r| PickerOption {
                id: r.id.clone(),
                name: r.name.clone(),
                disabled,
            })
            .collect()
    }

    /// `(id, name)` chips for the current selection, in selection order.
    pub fn chips(&self, selection: &SelectionState) -> Vec<(SeriesKey, String)> {
        selection
            .selected()
            .iter()
            .map(|id| (id.clone(), self.name_of(id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, name: &str) -> RepoListing {
        RepoListing {
            id: SeriesKey::from(id),
            name: name.to_string(),
            stars: 0.0,
        }
    }

    #[test]
    fn test_selection_is_bounded() {
        let mut selection = SelectionState::new();
        for i in 0..MAX_SELECTION {
            assert!(selection.add(SeriesKey::new(i.to_string())));
        }
        assert!(selection.is_full());
        assert_eq!(selection.toggle("extra".into()), SelectionChange::Rejected);
        assert_eq!(selection.len(), MAX_SELECTION);
    }

    #[test]
    fn test_toggle_add_remove() {
        let mut selection = SelectionState::new();
        assert_eq!(selection.toggle("a".into()), SelectionChange::Added);
        assert!(!selection.add("a".into()));
        assert_eq!(selection.toggle("a".into()), SelectionChange::Removed);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_hidden_tracks_only_selected_keys() {
        let mut selection = SelectionState::new();
        selection.add("a".into());
        selection.set_hidden(&"a".into(), true);
        selection.set_hidden(&"b".into(), true);
        assert!(selection.is_hidden(&"a".into()));
        assert!(!selection.is_hidden(&"b".into()));

        selection.remove(&"a".into());
        selection.add("a".into());
        assert!(!selection.is_hidden(&"a".into()));
    }

    #[test]
    fn test_picker_sorted_filtered_excluding_selected() {
        let picker = RepoPicker::new(vec![
            listing("3", "duckdb/duckdb"),
            listing("1", "apache/Spark"),
            listing("2", "apache/airflow"),
        ]);
        let names: Vec<&str> = picker.repos().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["apache/airflow", "apache/Spark", "duckdb/duckdb"]);

        let mut selection = SelectionState::new();
        selection.add("2".into());
        let mut picker = picker;
        picker.set_query("APACHE");
        let options = picker.options(&selection);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].name, "apache/Spark");
        assert!(!options[0].disabled);
    }

    #[test]
    fn test_picker_disables_when_full() {
        let picker = RepoPicker::new(vec![listing("x", "x/x")]);
        let mut selection = SelectionState::new();
        for i in 0..MAX_SELECTION {
            selection.add(SeriesKey::new(format!("s{}", i)));
        }
        assert!(picker.options(&selection).iter().all(|o| o.disabled));
    }

    #[test]
    fn test_chips_use_names() {
        let picker = RepoPicker::new(vec![listing("1", "apache/spark")]);
        let mut selection = SelectionState::new();
        selection.add("1".into());
        selection.add("unknown".into());
        assert_eq!(
            picker.chips(&selection),
            vec![
                (SeriesKey::from("1"), "apache/spark".to_string()),
                (SeriesKey::from("unknown"), "unknown".to_string()),
            ]
        );
    }
}
