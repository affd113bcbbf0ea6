//! In-memory doubles shared by the unit tests

use crate::article::Article;
use crate::config::{SiteConfig, SiteDefinition};
use crate::crawler::{FetchResult, PageFetcher};
use crate::output::{ArticleSink, OutputError, OutputResult};
use crate::robots::{RobotsError, RobotsOracle, RobotsRules};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Serves canned responses and records every URL it was asked for
///
/// URLs without a canned response answer HTTP 404.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, FetchResult>,
    fetched: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, url: &str, result: FetchResult) -> Self {
        self.responses.insert(url.to_string(), result);
        self
    }

    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_body(url, html, "text/html; charset=utf-8")
    }

    pub fn with_text(self, url: &str, body: &str) -> Self {
        self.with_body(url, body, "text/plain")
    }

    pub fn with_body(self, url: &str, body: &str, content_type: &str) -> Self {
        let result = FetchResult::Success {
            final_url: url.to_string(),
            status_code: 200,
            content_type: content_type.to_string(),
            body: body.to_string(),
        };
        self.with_response(url, result)
    }

    pub fn with_network_error(self, url: &str) -> Self {
        let result = FetchResult::NetworkError {
            error: "Connection refused".to_string(),
        };
        self.with_response(url, result)
    }

    /// Delays every response, for timeout tests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every URL fetched so far, in request order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetched
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.fetched.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .get(url)
            .cloned()
            .unwrap_or(FetchResult::HttpError { status_code: 404 })
    }
}

/// Keeps written articles in memory; clones share the same storage
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    articles: Arc<Mutex<Vec<Article>>>,
    finish_calls: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn articles(&self) -> Vec<Article> {
        self.articles.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.articles().into_iter().map(|a| a.url).collect()
    }

    pub fn finish_calls(&self) -> usize {
        *self.finish_calls.lock().unwrap()
    }
}

impl ArticleSink for MemorySink {
    fn write(&mut self, article: &Article) -> OutputResult<()> {
        self.articles.lock().unwrap().push(article.clone());
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        *self.finish_calls.lock().unwrap() += 1;
        Ok(())
    }
}

/// Rejects writes, like a full disk
#[derive(Debug, Clone, Default)]
pub struct FailingSink {
    accepts: usize,
    finish_calls: Arc<Mutex<usize>>,
}

impl FailingSink {
    /// A sink that takes `accepts` articles before failing
    pub fn after(accepts: usize) -> Self {
        Self {
            accepts,
            ..Self::default()
        }
    }

    pub fn finish_calls(&self) -> usize {
        *self.finish_calls.lock().unwrap()
    }
}

impl ArticleSink for FailingSink {
    fn write(&mut self, _article: &Article) -> OutputResult<()> {
        if self.accepts > 0 {
            self.accepts -= 1;
            return Ok(());
        }
        Err(OutputError::Write("disk full".to_string()))
    }

    fn finish(&mut self) -> OutputResult<()> {
        *self.finish_calls.lock().unwrap() += 1;
        Ok(())
    }
}

/// Robots oracle whose every lookup fails
#[derive(Debug)]
pub struct BrokenRobots;

impl RobotsOracle for BrokenRobots {
    fn is_allowed(&self, url: &str) -> Result<bool, RobotsError> {
        Err(RobotsError::Fetch {
            url: url.to_string(),
            message: "robots service unavailable".to_string(),
        })
    }
}

/// A site rooted at `base_url` with allow-all robots rules
///
/// Articles use `h1.headline` for the title, `.byline` for the time and `div.story p`
/// for the body; links are `a.story` (articles) and `a.topic` (topics).
pub fn site(base_url: &str) -> SiteConfig {
    let definition = SiteDefinition {
        base_url: base_url.to_string(),
        topic_selectors: vec!["a.topic".to_string()],
        article_selectors: vec!["a.story".to_string()],
        article_title: "h1.headline".to_string(),
        article_time: ".byline".to_string(),
        article_body: "div.story p".to_string(),
        max_depth: 0,
    };
    let robots: Arc<dyn RobotsOracle> = Arc::new(RobotsRules::from_content(
        "User-agent: *\nAllow: /",
        "TestBot",
    ));

    SiteConfig::new(definition, Url::parse(base_url).unwrap(), Some(robots))
}

/// Same as `site` but with the given robots.txt content
pub fn site_with_robots(base_url: &str, robots_txt: &str) -> SiteConfig {
    let mut site = site(base_url);
    site.robots = Some(Arc::new(RobotsRules::from_content(robots_txt, "TestBot")));
    site
}
