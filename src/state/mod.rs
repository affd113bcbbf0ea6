//! State module for tracking crawl progress
//!
//! Each site walk owns one `CrawlState`: the set of URLs it already visited and the
//! number of articles it saved against its budget. Nothing in here is shared between
//! walks, so no locking is needed.

mod crawl_state;

pub use crawl_state::CrawlState;
