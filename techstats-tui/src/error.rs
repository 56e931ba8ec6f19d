//! Error types for the TUI.

use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use techstats_core::{SourceError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
