//! Site walker - depth-bounded, budget-bounded traversal of one site
//!
//! A walker owns everything about one site's crawl: its visited set and budget counter,
//! its output sink, and an explicit frontier of `(url, depth)` pairs. The frontier is a
//! stack, so topics are explored depth-first in the order their links appear, and every
//! page has its article links drained before any of its topic links are followed.

use crate::article::build_article;
use crate::config::SiteConfig;
use crate::crawler::{links_for_selectors, Document, FetchResult, PageFetcher};
use crate::output::ArticleSink;
use crate::state::CrawlState;
use crate::GathererError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Why a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The article budget was used up
    BudgetReached,
    /// The frontier emptied, but only after dropping topics beyond `maxDepth`
    DepthLimited,
    /// Every reachable page was visited
    FrontierExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StopReason::BudgetReached => "budget reached",
            StopReason::DepthLimited => "depth limited",
            StopReason::FrontierExhausted => "frontier exhausted",
        };
        f.write_str(label)
    }
}

/// Counters for a finished walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkReport {
    /// Host of the walked site
    pub site: String,
    pub articles_saved: usize,
    /// Fetch attempts, successful or not
    pub pages_fetched: usize,
    /// URLs skipped because robots.txt disallowed them (or could not be consulted)
    pub urls_disallowed: usize,
    /// Fetches that failed or returned something other than HTML
    pub fetch_failures: usize,
    pub stop_reason: StopReason,
}

/// A walk abandoned part way through
///
/// Articles saved before the failure stay in the sink's output, so their count is kept.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct WalkError {
    pub articles_saved: usize,
    pub source: GathererError,
}

/// A page that was fetched and may be parsed
struct FetchedPage {
    final_url: Url,
    body: String,
}

/// Crawls a single site
pub struct Walker {
    site: Arc<SiteConfig>,
    fetcher: Arc<dyn PageFetcher>,
    sink: Box<dyn ArticleSink>,
    state: CrawlState,
    pages_fetched: usize,
    urls_disallowed: usize,
    fetch_failures: usize,
}

impl Walker {
    /// Creates a walker
    ///
    /// # Arguments
    ///
    /// * `site` - The site to crawl
    /// * `fetcher` - Fetches every page the walker visits
    /// * `sink` - Receives every saved article; finished when the walk ends
    /// * `budget` - Maximum number of articles to save
    pub fn new(
        site: Arc<SiteConfig>,
        fetcher: Arc<dyn PageFetcher>,
        sink: Box<dyn ArticleSink>,
        budget: usize,
    ) -> Self {
        Self {
            site,
            fetcher,
            sink,
            state: CrawlState::new(budget),
            pages_fetched: 0,
            urls_disallowed: 0,
            fetch_failures: 0,
        }
    }

    /// Host name of the walked site
    pub fn site_name(&self) -> String {
        self.site.source()
    }

    /// Walks the site until the budget is reached or the frontier is empty
    ///
    /// The sink is finished exactly once before this returns, whatever the outcome.
    ///
    /// # Returns
    ///
    /// * `Ok(WalkReport)` - The walk ended normally
    /// * `Err(WalkError)` - An article could not be written; the walk was abandoned
    pub async fn run(mut self) -> Result<WalkReport, WalkError> {
        tracing::info!(
            "Starting walk of {} (max depth {}, budget {})",
            self.site.base_url,
            self.site.max_depth,
            self.state.remaining()
        );

        let walked = self.walk().await;
        let finished = self.sink.finish();

        let stop_reason = match walked {
            Ok(reason) => reason,
            Err(e) => {
                if let Err(finish_err) = finished {
                    tracing::error!("Failed to close output for {}: {}", self.site_name(), finish_err);
                }
                tracing::error!("Walk of {} aborted: {}", self.site_name(), e);
                return Err(self.abandon(e));
            }
        };
        if let Err(e) = finished {
            return Err(self.abandon(e.into()));
        }

        let report = WalkReport {
            site: self.site_name(),
            articles_saved: self.state.articles_saved(),
            pages_fetched: self.pages_fetched,
            urls_disallowed: self.urls_disallowed,
            fetch_failures: self.fetch_failures,
            stop_reason,
        };

        tracing::info!(
            "Finished walk of {}: {} articles saved, {} pages fetched ({})",
            report.site,
            report.articles_saved,
            report.pages_fetched,
            report.stop_reason
        );

        Ok(report)
    }

    fn abandon(&self, source: GathererError) -> WalkError {
        WalkError {
            articles_saved: self.state.articles_saved(),
            source,
        }
    }

    async fn walk(&mut self) -> Result<StopReason, GathererError> {
        let mut frontier: Vec<(String, u32)> = vec![(self.site.base_url.to_string(), 0)];
        let mut depth_limited = false;

        while let Some((url, depth)) = frontier.pop() {
            if depth > self.site.max_depth {
                tracing::trace!("Depth {} exceeds limit, dropping {}", depth, url);
                depth_limited = true;
                continue;
            }

            if self.state.budget_reached() {
                return Ok(StopReason::BudgetReached);
            }

            let Some(page) = self.visit(&url).await else {
                continue;
            };

            // Html is not Send: parse, collect links and drop it before the next await
            let (article_links, topic_links) = {
                let document = Document::parse(&page.body, page.final_url);
                (
                    links_for_selectors(&document, &self.site.article_selectors),
                    links_for_selectors(&document, &self.site.topic_selectors),
                )
            };

            tracing::debug!(
                "{} at depth {}: {} article links, {} topic links",
                url,
                depth,
                article_links.len(),
                topic_links.len()
            );

            for link in article_links {
                self.save_article(&link).await?;

                if self.state.budget_reached() {
                    tracing::info!("Article budget reached for {}", self.site_name());
                    return Ok(StopReason::BudgetReached);
                }
            }

            // Reverse so the first topic link is popped first
            for link in topic_links.into_iter().rev() {
                if !self.state.is_visited(&link) {
                    frontier.push((link, depth + 1));
                }
            }
        }

        if depth_limited {
            Ok(StopReason::DepthLimited)
        } else {
            Ok(StopReason::FrontierExhausted)
        }
    }

    /// Fetches an article page and hands the article to the sink
    ///
    /// Only a sink failure is an error; anything else just saves nothing.
    async fn save_article(&mut self, url: &str) -> Result<(), GathererError> {
        let Some(page) = self.visit(url).await else {
            return Ok(());
        };

        let article = {
            let document = Document::parse(&page.body, page.final_url);
            build_article(&document, url, &self.site)
        };

        self.sink.write(&article)?;
        self.state.record_saved();
        tracing::info!(
            "Saved article {} ({}/{})",
            url,
            self.state.articles_saved(),
            self.state.articles_saved() + self.state.remaining()
        );

        Ok(())
    }

    /// Runs the dedup, robots and fetch checks for one URL
    ///
    /// The URL is marked visited before robots is consulted, so a disallowed or failed
    /// URL is never attempted again during this walk.
    async fn visit(&mut self, url: &str) -> Option<FetchedPage> {
        if !self.state.mark_visited(url) {
            tracing::trace!("Already visited {}", url);
            return None;
        }

        if !self.site.is_allowed(url) {
            tracing::warn!("Disallowed by robots.txt: {}", url);
            self.urls_disallowed += 1;
            return None;
        }

        self.pages_fetched += 1;
        let result = self.fetcher.fetch(url).await;
        let is_html = result.is_html();

        match result {
            FetchResult::Success {
                final_url,
                content_type,
                body,
                ..
            } => {
                if !is_html {
                    tracing::warn!("Skipping {}: not HTML ({})", url, content_type);
                    self.fetch_failures += 1;
                    return None;
                }

                match Url::parse(&final_url).or_else(|_| Url::parse(url)) {
                    Ok(final_url) => Some(FetchedPage { final_url, body }),
                    Err(e) => {
                        tracing::warn!("Skipping {}: unusable URL ({})", url, e);
                        self.fetch_failures += 1;
                        None
                    }
                }
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Failed to fetch {}: HTTP {}", url, status_code);
                self.fetch_failures += 1;
                None
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                self.fetch_failures += 1;
                None
            }
        }
    }
}
