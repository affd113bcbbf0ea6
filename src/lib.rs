//! NewsMap Gatherer: a polite, config-driven news crawler
//!
//! This crate crawls news sites described by per-site JSON definitions. For each site it
//! follows topic links down to a depth ceiling, extracts article pages, normalizes their
//! metadata and writes them out as JSON records, while respecting robots.txt and a
//! per-site article budget.

pub mod article;
pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum GathererError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("No site configurations could be loaded")]
    NoSites,

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Crawl of {site} failed: {message}")]
    SiteFailed { site: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse site definition: {0}")]
    SiteJson(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Config directory not found: {0}")]
    MissingDirectory(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, GathererError>;

// Re-export commonly used types
pub use article::Article;
pub use config::{RunConfig, SiteConfig};
pub use crawler::{Coordinator, RunSummary, Walker};
pub use state::CrawlState;
