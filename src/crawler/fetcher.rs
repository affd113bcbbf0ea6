//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - The `PageFetcher` capability the walker and robots loader depend on
//! - Building the reqwest client with the crawler's user agent and timeouts
//! - Classifying responses into `FetchResult` variants

use crate::config::UserAgentConfig;
use crate::GathererError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug, Clone)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty if missing)
        content_type: String,
        /// Response body
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns true for a successful response whose Content-Type is HTML or XHTML
    ///
    /// A missing Content-Type is accepted, as HTML parsers accept anything.
    pub fn is_html(&self) -> bool {
        match self {
            FetchResult::Success { content_type, .. } => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.is_empty()
                    || content_type.contains("text/html")
                    || content_type.contains("application/xhtml+xml")
            }
            _ => false,
        }
    }
}

/// Page fetching capability
///
/// Every page fetch and robots.txt download in the crate goes through this trait, so a
/// walker can be driven by a real HTTP client or by an in-memory double.
///
/// Redirects are followed inside `fetch`. Robots rules are only checked for the URL the
/// walker asked for, never for the hops a redirect passes through or lands on.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a URL with the implementation's timeout and user agent
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Formats the user agent header value
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound for a whole request, body included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed `PageFetcher`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    ///
    /// # Returns
    ///
    /// * `Ok(HttpFetcher)` - Ready to fetch
    /// * `Err(GathererError::Reqwest)` - The TLS backend or client could not be initialised
    pub fn new(config: &UserAgentConfig, timeout: Duration) -> Result<Self, GathererError> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 2xx | `Success` |
/// | Other HTTP status | `HttpError` |
/// | Timeout | `NetworkError` ("Request timeout") |
/// | Connection refused | `NetworkError` ("Connection refused") |
/// | Body read failure, redirect limit, other | `NetworkError` |
///
/// Nothing is retried.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            let final_url = response.url().to_string();

            if !status.is_success() {
                return FetchResult::HttpError {
                    status_code: status.as_u16(),
                };
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();

            match response.text().await {
                Ok(body) => FetchResult::Success {
                    final_url,
                    status_code: status.as_u16(),
                    content_type,
                    body,
                },
                Err(e) => FetchResult::NetworkError {
                    error: e.to_string(),
                },
            }
        }
        Err(e) => {
            if e.is_timeout() {
                FetchResult::NetworkError {
                    error: "Request timeout".to_string(),
                }
            } else if e.is_connect() {
                FetchResult::NetworkError {
                    error: "Connection refused".to_string(),
                }
            } else {
                FetchResult::NetworkError {
                    error: e.to_string(),
                }
            }
        }
    }
}
