use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};

use crate::core::errors::{DirectoryError, Result};
use crate::core::traits::fetcher::KeyFetcher;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Webkey-Directory-Client";

/// The webkey service is asked for JSON on every request.
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Default timeout for fetching a listing.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches webkey listings over HTTP(S) with a blocking call.
///
/// Each fetch runs on its own current-thread runtime, so callers stay
/// synchronous.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    user_agent: String,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout,
        }
    }

    fn build_client(&self, url: &str) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| fetch_failed(url, format!("failed to create HTTP client: {e}")))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT)
    }
}

fn fetch_failed(url: &str, reason: String) -> DirectoryError {
    DirectoryError::FetchFailed {
        url: url.to_string(),
        reason,
    }
}

impl KeyFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| fetch_failed(url, format!("failed to create async runtime: {e}")))?;

        rt.block_on(async {
            let client = self.build_client(url)?;
            let resp = client
                .get(url)
                .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
                .send()
                .await
                .map_err(|e| fetch_failed(url, format!("request failed: {e}")))?;

            if !resp.status().is_success() {
                return Err(fetch_failed(
                    url,
                    format!("service returned status {}", resp.status()),
                ));
            }

            resp.bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| fetch_failed(url, format!("failed to read response: {e}")))
        })
    }
}
