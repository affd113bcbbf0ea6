//! Crawler module for fetching and walking news sites
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` capability
//! - HTML parsing and selector-driven link and text extraction
//! - The per-site `Walker` with its explicit depth-first frontier
//! - The `Coordinator` that runs one walker per site

mod coordinator;
mod fetcher;
mod parser;
mod walker;

pub use coordinator::{Coordinator, RunSummary, SiteOutcome, SiteReport};
pub use fetcher::{
    build_http_client, fetch_url, user_agent_string, FetchResult, HttpFetcher, PageFetcher,
};
pub use parser::{element_text, links_for_selectors, Document};
pub use walker::{StopReason, WalkError, WalkReport, Walker};
