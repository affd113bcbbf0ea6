//! Robots.txt handling module
//!
//! This module fetches a site's robots.txt once at load time and exposes the result as a
//! `RobotsOracle`, an allow/deny predicate over URLs for the crawler's user agent.

mod parser;

pub use parser::RobotsRules;

use crate::crawler::{FetchResult, PageFetcher};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors from fetching or evaluating robots.txt
#[derive(Debug, Error)]
pub enum RobotsError {
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Allow/deny predicate over URLs for one site and user agent
///
/// Callers must treat an `Err` as "disallowed".
pub trait RobotsOracle: fmt::Debug + Send + Sync {
    /// Checks whether the given absolute URL may be fetched
    fn is_allowed(&self, url: &str) -> Result<bool, RobotsError>;
}

/// Returns the robots.txt location for a site's base URL
///
/// The file lives at the root of the base URL's origin.
pub fn robots_url(base_url: &Url) -> Result<Url, RobotsError> {
    base_url
        .join("/robots.txt")
        .map_err(|e| RobotsError::InvalidUrl(format!("{}: {}", base_url, e)))
}

/// Fetches and parses robots.txt for a site
///
/// # Arguments
///
/// * `fetcher` - The page fetcher to use
/// * `base_url` - The site's base URL
/// * `user_agent` - The crawler's product token the rules are evaluated for
///
/// # Returns
///
/// * `Ok(RobotsRules)` - Successfully fetched and parsed robots.txt
/// * `Err(RobotsError)` - The file could not be fetched or returned a non-success status
pub async fn fetch_robots(
    fetcher: &dyn PageFetcher,
    base_url: &Url,
    user_agent: &str,
) -> Result<RobotsRules, RobotsError> {
    let url = robots_url(base_url)?;
    tracing::debug!("Fetching robots.txt from {}", url);

    match fetcher.fetch(url.as_str()).await {
        FetchResult::Success { body, .. } => Ok(RobotsRules::from_content(&body, user_agent)),
        FetchResult::HttpError { status_code } => Err(RobotsError::Status {
            url: url.to_string(),
            status: status_code,
        }),
        FetchResult::NetworkError { error } => Err(RobotsError::Fetch {
            url: url.to_string(),
            message: error,
        }),
    }
}
