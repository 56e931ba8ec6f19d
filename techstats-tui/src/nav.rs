//! Navigation and view switching utilities.

use serde::{Deserialize, Serialize};
use techstats_charts::Panel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Topics,
    Languages,
    Comparison,
    Ranked,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Topics => "Topics",
            View::Languages => "Languages",
            View::Comparison => "Compare",
            View::Ranked => "Ranking",
        }
    }

    pub fn all() -> &'static [View] {
        &[View::Topics, View::Languages, View::Comparison, View::Ranked]
    }

    /// The chart panel this view shows.
    pub fn panel(&self) -> Panel {
        match self {
            View::Topics => Panel::Topics,
            View::Languages => Panel::Languages,
            View::Comparison => Panel::Comparison,
            View::Ranked => Panel::Ranked,
        }
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}
