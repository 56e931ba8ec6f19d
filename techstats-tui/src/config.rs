//! Configuration loading for the tech-stats TUI.
//!
//! All fields are required unless explicitly marked optional. No defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use techstats_cache::ValidityPolicy;
use techstats_charts::{ChartDefaults, MAX_SELECTION};
use techstats_core::ApiEndpoints;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuiConfig {
    /// Upstream base URL. Absent means the backend is unconfigured and every
    /// chart stays empty.
    pub api_base_url: Option<String>,
    pub api_prefix: String,
    pub request_timeout_ms: u64,
    pub refresh_interval_ms: u64,
    pub cache: CacheConfig,
    pub charts: ChartsConfig,
    pub persistence_path: PathBuf,
    pub log_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    pub path: PathBuf,
    pub max_size_mb: usize,
    pub policy: ValidityPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartsConfig {
    pub default_topics_top_n: usize,
    pub default_languages_top_n: usize,
    pub default_repos_top_n: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or TECHSTATS_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] techstats_core::ConfigError),
}

impl TuiConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_base_url {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("api_base_url", "must start with http:// or https://"));
            }
        }
        if self.api_prefix.trim().is_empty() {
            return Err(invalid("api_prefix", "must not be empty"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be > 0"));
        }
        if self.refresh_interval_ms == 0 {
            return Err(invalid("refresh_interval_ms", "must be > 0"));
        }
        if self.cache.path.as_os_str().is_empty() {
            return Err(invalid("cache.path", "must not be empty"));
        }
        if self.cache.max_size_mb == 0 {
            return Err(invalid("cache.max_size_mb", "must be > 0"));
        }
        match self.cache.policy {
            ValidityPolicy::Ttl { minutes } if minutes == 0 => {
                return Err(invalid("cache.policy.minutes", "must be > 0"));
            }
            ValidityPolicy::DayBoundary { cutover_hour, .. } if cutover_hour > 23 => {
                return Err(invalid("cache.policy.cutover_hour", "must be within 0..=23"));
            }
            ValidityPolicy::DayBoundary { utc_offset_hours, .. } if !(-12..=14).contains(&utc_offset_hours) => {
                return Err(invalid("cache.policy.utc_offset_hours", "must be within -12..=14"));
            }
            _ => {}
        }
        if self.charts.default_topics_top_n == 0 {
            return Err(invalid("charts.default_topics_top_n", "must be > 0"));
        }
        if self.charts.default_languages_top_n == 0 {
            return Err(invalid("charts.default_languages_top_n", "must be > 0"));
        }
        if self.charts.default_repos_top_n > MAX_SELECTION {
            return Err(invalid(
                "charts.default_repos_top_n",
                &format!("must be <= {}", MAX_SELECTION),
            ));
        }
        if self.persistence_path.as_os_str().is_empty() {
            return Err(invalid("persistence_path", "must not be empty"));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(invalid("log_path", "must not be empty"));
        }
        Ok(())
    }

    pub fn endpoints(&self) -> ApiEndpoints {
        ApiEndpoints::new(self.api_base_url.as_deref(), &self.api_prefix)
    }

    pub fn chart_defaults(&self) -> ChartDefaults {
        ChartDefaults {
            topics_top_n: self.charts.default_topics_top_n,
            languages_top_n: self.charts.default_languages_top_n,
            repos_top_n: self.charts.default_repos_top_n,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid(techstats_core::ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    })
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var("TECHSTATS_CONFIG").ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
