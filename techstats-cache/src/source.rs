//! Upstream data sources.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use techstats_core::SourceError;

/// Something that can turn a URL into a JSON document.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, SourceError>;
}

/// `reqwest`-backed source for the real upstream API.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_json(&self, url: &str) -> Result<Value, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| SourceError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
