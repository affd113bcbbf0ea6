use crate::robots::RobotsOracle;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Run-level configuration (TOML)
///
/// Every section and key has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub sites: SitesConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of articles saved per site
    #[serde(rename = "max-articles")]
    pub max_articles: usize,

    /// Run sites concurrently (one task per site) instead of one after another
    pub concurrent: bool,

    /// Upper bound on sites crawled at the same time (defaults to the number of sites)
    #[serde(rename = "max-concurrent-sites")]
    pub max_concurrent_sites: Option<usize>,

    /// Timeout for a single page or robots.txt fetch (seconds)
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// How long a concurrent run waits for all sites before reporting stragglers (seconds)
    #[serde(rename = "run-timeout-secs")]
    pub run_timeout_secs: u64,

    /// Abort the whole run when a site fails instead of isolating the failure
    #[serde(rename = "fail-fast")]
    pub fail_fast: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_articles: 25,
            concurrent: true,
            max_concurrent_sites: None,
            fetch_timeout_secs: 10,
            run_timeout_secs: 300,
            fail_fast: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also the product token robots.txt rules are matched against
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "NewsMapGathererBot".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://github.com/newsmap/gatherer".to_string(),
            contact_email: "crawler@newsmap.example.org".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// How articles are written
    pub format: OutputFormat,

    /// Directory article files and batch files are written to
    #[serde(rename = "article-dir")]
    pub article_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jsonl,
            article_dir: "data/articles".to_string(),
        }
    }
}

/// Where site definitions are loaded from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SitesConfig {
    /// Directory of `*.json` site definitions
    #[serde(rename = "config-dir")]
    pub config_dir: String,
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            config_dir: "configs/newsConfigs".to_string(),
        }
    }
}

/// Article output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One pretty-printed `<id>.json` file per article
    Json,
    /// One compact JSON line per article, appended to a batch file
    Jsonl,
    /// Columnar batch file (reserved, not supported yet)
    Parquet,
}

impl OutputFormat {
    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => ".json",
            OutputFormat::Jsonl => ".jsonl",
            OutputFormat::Parquet => ".parquet",
        }
    }

    /// Returns true for formats that write all of a site's articles into one file
    pub fn is_batch(&self) -> bool {
        matches!(self, OutputFormat::Jsonl | OutputFormat::Parquet)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Parquet => "parquet",
        };
        f.write_str(name)
    }
}

/// One site definition as written in its JSON file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDefinition {
    pub base_url: String,
    #[serde(default)]
    pub topic_selectors: Vec<String>,
    #[serde(default)]
    pub article_selectors: Vec<String>,
    #[serde(default)]
    pub article_title: String,
    #[serde(default)]
    pub article_time: String,
    #[serde(default)]
    pub article_body: String,
    #[serde(default)]
    pub max_depth: u32,
}

/// A site ready to crawl: its definition plus the resolved robots oracle
///
/// Read-only once built. `robots: None` means no rules could be resolved, and every URL
/// is then treated as disallowed.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: Url,
    pub topic_selectors: Vec<String>,
    pub article_selectors: Vec<String>,
    pub article_title: String,
    pub article_time: String,
    pub article_body: String,
    pub max_depth: u32,
    pub robots: Option<Arc<dyn RobotsOracle>>,
}

impl SiteConfig {
    /// Builds a site from a definition whose `base_url` has already been validated
    pub fn new(
        definition: SiteDefinition,
        base_url: Url,
        robots: Option<Arc<dyn RobotsOracle>>,
    ) -> Self {
        Self {
            base_url,
            topic_selectors: definition.topic_selectors,
            article_selectors: definition.article_selectors,
            article_title: definition.article_title,
            article_time: definition.article_time,
            article_body: definition.article_body,
            max_depth: definition.max_depth,
            robots,
        }
    }

    /// Host name articles from this site are attributed to
    pub fn source(&self) -> String {
        crate::url::source_name(&self.base_url)
    }

    /// Checks a URL against the site's robots oracle
    ///
    /// Fails closed: a missing oracle or an oracle error both mean "disallowed".
    pub fn is_allowed(&self, url: &str) -> bool {
        let Some(robots) = &self.robots else {
            tracing::warn!("No robots rules loaded for {}", self.base_url);
            return false;
        };

        match robots.is_allowed(url) {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!("Robots check failed for {} ({})", url, e);
                false
            }
        }
    }
}
