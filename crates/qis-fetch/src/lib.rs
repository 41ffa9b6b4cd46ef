//! qis-fetch: retrieval of QIS schedule pages
//!
//! Pages come either from the QIS server over HTTP(S) or from HTML files
//! saved to disk.

pub mod error;

pub use error::{FetchError, Result};

use std::path::Path;
use std::time::Duration;

use qis_core::SourceConfig;
use reqwest::Client;
use tracing::{debug, info};

/// Fetches schedule pages over HTTP
#[derive(Debug, Clone)]
pub struct ScheduleFetcher {
    client: Client,
}

impl ScheduleFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Create with custom client (for testing)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the page at `url` and return its body
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: "only HTTP and HTTPS URLs are supported".to_string(),
            });
        }

        info!(url = %parsed, "Fetching schedule page");

        let response = self.client.get(parsed).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transport {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        debug!(url = %url, bytes = body.len(), "Fetched schedule page");
        Ok(body)
    }

    /// Load a schedule page from a local file or a URL
    ///
    /// `source` is read from disk when it names an existing file and
    /// fetched otherwise.
    pub async fn load_source(&self, source: &str) -> Result<String> {
        if is_file(source).await {
            info!(path = %source, "Reading schedule page");
            return tokio::fs::read_to_string(source).await.map_err(|e| FetchError::Io {
                path: source.to_string(),
                source: e,
            });
        }

        self.fetch(source).await
    }
}

async fn is_file(source: &str) -> bool {
    tokio::fs::metadata(Path::new(source))
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
