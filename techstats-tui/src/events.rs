//! Event types for the TUI event loop.

use crossterm::event::KeyEvent;
use serde_json::Value;
use techstats_charts::PendingRefresh;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    /// A panel payload arrived for an issued refresh.
    Fetched { pending: PendingRefresh, payload: Value },
    /// The repository list arrived.
    RepoList(Value),
}
