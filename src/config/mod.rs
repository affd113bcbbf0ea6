//! Configuration module for NewsMap Gatherer
//!
//! This module handles the two configuration layers:
//! - The run configuration (TOML): budget, concurrency, user agent, output
//! - Site definitions (one JSON file per site), validated and resolved into
//!   `SiteConfig`s with their robots.txt rules
//!
//! # Example
//!
//! ```no_run
//! use newsmap_gatherer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gatherer.toml")).unwrap();
//! println!("Sites are read from: {}", config.sites.config_dir);
//! ```

mod parser;
mod sites;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlerConfig, OutputConfig, OutputFormat, RunConfig, SiteConfig, SiteDefinition,
    SitesConfig, UserAgentConfig,
};

// Re-export loading functions
pub use parser::{list_site_files, load_config, load_site_definition, parse_config};
pub use sites::load_sites;
pub use validation::{validate, validate_site_definition};
