//! HTTP-backed text source

use super::TextSource;
use crate::config::FetchConfig;
use crate::{Error, Result};
use std::time::Duration;
use tracing::debug;

/// [`TextSource`] issuing GET requests through a shared reqwest client
///
/// The client pools connections, so one instance is built per run and shared
/// by every worker.
#[derive(Debug, Clone)]
pub struct HttpTextSource {
    client: reqwest::Client,
}

impl HttpTextSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl TextSource for HttpTextSource {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, "request failed", Some(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url, format!("HTTP status {}", status), None));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(url, "failed to read response body", Some(e)))
    }
}
