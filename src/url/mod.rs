//! URL helpers
//!
//! Host extraction for article sources and the domain suffix used to keep concurrent
//! batch files apart.

mod domain;

pub use domain::{batch_suffix, extract_domain, source_name, UNKNOWN_SOURCE};
