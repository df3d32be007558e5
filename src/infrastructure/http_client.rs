//! HTTP page fetcher with retry and backoff
//!
//! Wishlist pages are fetched with a browser-like client (cookies, gzip,
//! desktop user agent) because some hosts serve reduced markup to obvious
//! bots. Transient failures retry with capped exponential backoff plus a
//! little jitter; a target that keeps failing is skipped for the cycle,
//! never fatal.

use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::infrastructure::config::FetchConfig;

const BACKOFF_BASE_MS: u64 = 1_000;
const BACKOFF_CAP_MS: u64 = 30_000;
const BACKOFF_JITTER_MS: u64 = 1_000;

/// Fetch failures after the retry budget is spent.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// HTTP client for fetching wishlist pages.
pub struct PageFetcher {
    client: Client,
    max_attempts: u32,
}

impl PageFetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = reqwest::Proxy::all(proxy_url)
                .with_context(|| format!("Invalid proxy URL: {proxy_url}"))?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_attempts: config.max_attempts,
        })
    }

    /// Fetch a page body with automatic retry.
    ///
    /// Network errors and transient HTTP statuses (408, 429, 5xx) retry up
    /// to the configured attempt budget; other statuses fail immediately.
    /// An empty 2xx body is a successful fetch — whether the page holds
    /// any items is the extraction pipeline's call, not the transport's.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            debug!("🌐 HTTP GET (attempt {}/{}): {}", attempt, self.max_attempts, url);

            match self.fetch_once(url).await {
                Ok(body) => {
                    debug!("Fetched {} bytes from {} on attempt {}", body.len(), url, attempt);
                    return Ok(body);
                }
                Err(error) => {
                    warn!("⚠️ Attempt {} failed for {}: {}", attempt, url, error);

                    if !is_retryable(&error) || attempt >= self.max_attempts {
                        return Err(error);
                    }
                    sleep(backoff_delay(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })
    }
}

fn is_retryable(error: &FetchError) -> bool {
    match error {
        FetchError::Network { .. } => true,
        FetchError::Status { status, .. } => matches!(
            *status,
            StatusCode::REQUEST_TIMEOUT
                | StatusCode::TOO_MANY_REQUESTS
                | StatusCode::INTERNAL_SERVER_ERROR
                | StatusCode::BAD_GATEWAY
                | StatusCode::SERVICE_UNAVAILABLE
                | StatusCode::GATEWAY_TIMEOUT
        ),
    }
}

/// Exponential backoff capped at 30s, plus up to 1s of jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let exponential = BACKOFF_BASE_MS.saturating_mul(2_u64.saturating_pow(attempt - 1));
    let capped = exponential.min(BACKOFF_CAP_MS);
    Duration::from_millis(capped + fastrand::u64(0..=BACKOFF_JITTER_MS))
}
