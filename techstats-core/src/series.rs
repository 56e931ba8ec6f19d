//! Series keys and canonical time-series points.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

// ============================================================================
// SERIES KEY
// ============================================================================

/// Opaque identifier of one series: a topic, a language, or a repository id.
///
/// Stable for the lifetime of a session. Used for colour assignment and for
/// visibility bookkeeping, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesKey(String);

impl SeriesKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable form: dashes become spaces and each word is capitalised.
    ///
    /// `data-engineering` becomes `Data Engineering`.
    pub fn display_name(&self) -> String {
        self.0
            .split(|c: char| c == '-' || c.is_whitespace())
            .filter(|w| !w.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeriesKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SeriesKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for SeriesKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SeriesKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// TIME SERIES POINT
// ============================================================================

/// One observation date with a count per series key.
///
/// `date` is either an ISO date (`2025-01-08`), a month (`2025-01`), or an
/// ISO week token (`2025-W48`). Key order is the order the upstream payload
/// listed them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub counts: IndexMap<SeriesKey, f64>,
}

impl TimeSeriesPoint {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            counts: IndexMap::new(),
        }
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, key: impl Into<SeriesKey>, value: f64) -> Self {
        self.counts.insert(key.into(), value);
        self
    }

    /// Count for `key`, with absent keys read as zero.
    pub fn count(&self, key: &str) -> f64 {
        self.counts.get(key).copied().unwrap_or(0.0)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.counts.keys()
    }
}

// ============================================================================
// REPOSITORY RECORDS
// ============================================================================

/// One entry of the `repo-list` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoListing {
    pub id: SeriesKey,
    pub name: String,
    pub stars: f64,
}

/// Comparison series plus the display name for each repository id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonSeries {
    pub points: Vec<TimeSeriesPoint>,
    pub names: IndexMap<SeriesKey, String>,
}

impl ComparisonSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Display name for `key`, falling back to the key itself.
    pub fn name_of(&self, key: &SeriesKey) -> String {
        self.names
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
