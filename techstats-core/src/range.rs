//! Range (series granularity) and repository metric enums.

use crate::error::WireError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RANGE
// ============================================================================

/// Granularity of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Range {
    /// One point per ISO week.
    #[default]
    Weekly,
    /// One point per calendar month.
    Monthly,
}

impl Range {
    /// Query-string representation, also used in cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Range::Weekly => "weekly",
            Range::Monthly => "monthly",
        }
    }

    pub fn all() -> &'static [Range] {
        &[Range::Weekly, Range::Monthly]
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Range {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Range::Weekly),
            "monthly" => Ok(Range::Monthly),
            _ => Err(WireError::UnknownRange {
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// REPO METRIC
// ============================================================================

/// Per-repository measurement plotted by the comparison chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoMetric {
    #[default]
    Stars,
    Forks,
    OpenIssues,
    Size,
    Watchers,
}

impl RepoMetric {
    /// Field name in the comparison payload.
    pub fn field(&self) -> &'static str {
        match self {
            RepoMetric::Stars => "stars",
            RepoMetric::Forks => "forks",
            RepoMetric::OpenIssues => "open_issues",
            RepoMetric::Size => "size",
            RepoMetric::Watchers => "watchers",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RepoMetric::Stars => "Stars",
            RepoMetric::Forks => "Forks",
            RepoMetric::OpenIssues => "Open issues",
            RepoMetric::Size => "Size",
            RepoMetric::Watchers => "Watchers",
        }
    }
}

impl fmt::Display for RepoMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field())
    }
}

impl FromStr for RepoMetric {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stars" => Ok(RepoMetric::Stars),
            "forks" => Ok(RepoMetric::Forks),
            "open_issues" | "open-issues" => Ok(RepoMetric::OpenIssues),
            "size" => Ok(RepoMetric::Size),
            "watchers" => Ok(RepoMetric::Watchers),
            _ => Err(WireError::UnknownMetric {
                value: s.to_string(),
            }),
        }
    }
}
