//! Upstream endpoint catalogue, URL building, and cache keys.

use crate::range::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default path prefix the upstream API mounts its routes under.
pub const DEFAULT_API_PREFIX: &str = "/data-tech-stats/api";

/// Logical read endpoints of the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    /// Topic-keyed repository counts over time.
    RepoCounts,
    /// Primary-language-keyed repository counts over time.
    PrimaryLanguages,
    /// Repositories available to the comparison picker.
    RepoList,
    /// Per-repository metric history.
    RepoComparison,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::RepoCounts => "repo-counts",
            Endpoint::PrimaryLanguages => "primary-languages",
            Endpoint::RepoList => "repo-list",
            Endpoint::RepoComparison => "repo-comparison",
        }
    }

    /// Whether the endpoint takes an `interval` query parameter.
    pub fn is_ranged(&self) -> bool {
        !matches!(self, Endpoint::RepoList)
    }

    /// Persistent cache key: `{endpointName}_{range}`.
    ///
    /// Unranged endpoints use the fixed suffix `all`.
    pub fn cache_key(&self, range: Range) -> String {
        if self.is_ranged() {
            format!("{}_{}", self.name(), range.as_str())
        } else {
            format!("{}_all", self.name())
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Base address and prefix of the upstream API.
///
/// A missing base URL means the backend is unconfigured; callers treat that
/// as "no data" rather than as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base_url: Option<String>,
    prefix: String,
}

impl ApiEndpoints {
    pub fn new(base_url: Option<&str>, prefix: &str) -> Self {
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        let prefix = prefix.trim().trim_end_matches('/');
        let prefix = if prefix.is_empty() || prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{}", prefix)
        };
        Self { base_url, prefix }
    }

    pub fn unconfigured() -> Self {
        Self::new(None, DEFAULT_API_PREFIX)
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Fully-formed request URL, or `None` when unconfigured.
    pub fn url(&self, endpoint: Endpoint, range: Range) -> Option<String> {
        let base = self.base_url.as_ref()?;
        let mut url = format!("{}{}/{}", base, self.prefix, endpoint.name());
        if endpoint.is_ranged() {
            url.push_str("?interval=");
            url.push_str(range.as_str());
        }
        Some(url)
    }
}
