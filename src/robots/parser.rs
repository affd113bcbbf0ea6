//! Robots.txt rules implementation
//!
//! This module wraps the robotstxt crate's matcher behind the `RobotsOracle` capability.

use crate::robots::{RobotsError, RobotsOracle};
use robotstxt::DefaultMatcher;
use url::Url;

/// Parsed robots.txt rules bound to one user agent
///
/// The rules are matched on demand by the robotstxt crate, which follows Google's
/// robots.txt matching semantics (longest match wins, `Allow` beats `Disallow` on ties).
#[derive(Debug, Clone)]
pub struct RobotsRules {
    /// Raw robots.txt content
    content: String,

    /// Product token the rules are evaluated for (e.g. "NewsMapGathererBot")
    user_agent: String,
}

impl RobotsRules {
    /// Creates rules from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `user_agent` - The crawler's product token
    pub fn from_content(content: &str, user_agent: &str) -> Self {
        Self {
            content: content.to_string(),
            user_agent: user_agent.to_string(),
        }
    }
}

impl RobotsOracle for RobotsRules {
    fn is_allowed(&self, url: &str) -> Result<bool, RobotsError> {
        let parsed = Url::parse(url).map_err(|e| RobotsError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut matcher = DefaultMatcher::default();
        Ok(matcher.one_agent_allowed_by_robots(&self.content, &self.user_agent, parsed.as_str()))
    }
}
