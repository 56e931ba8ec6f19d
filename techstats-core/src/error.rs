//! Error types for tech-stats operations

use thiserror::Error;

/// Payload normalization errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Expected {expected} at {path}, found {found}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid date token: {token}")]
    InvalidDate { token: String },

    #[error("Unknown range: {value}")]
    UnknownRange { value: String },

    #[error("Unknown metric: {value}")]
    UnknownMetric { value: String },
}

/// Persistent cache store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("Corrupt entry under key {key}: {reason}")]
    CorruptEntry { key: String, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Upstream data source errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Data source not configured")]
    NotConfigured,

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Transport error for {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Undecodable body from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for all tech-stats errors.
#[derive(Debug, Clone, Error)]
pub enum TechStatsError {
    #[error("Wire error: {0}")]
    Wire(#[from] WireError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for tech-stats operations.
pub type TechStatsResult<T> = Result<T, TechStatsError>;

// =============================================================================
// TESTS
// =============================================================================
