//! Crawl coordinator - runs one walker per site
//!
//! This module turns the loaded site list into walkers and drives them:
//! - Computing the run timestamp once and opening every site's sink up front
//! - Running walkers one after another, or as one task per site behind a semaphore
//! - Bounding a concurrent run by an overall deadline and reporting stragglers
//! - Collecting a per-site outcome for the run summary

use crate::config::{CrawlerConfig, RunConfig, SiteConfig};
use crate::crawler::walker::{WalkError, WalkReport, Walker};
use crate::crawler::PageFetcher;
use crate::output::open_sink;
use crate::url::batch_suffix;
use crate::GathererError;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::Instrument;

/// How one site's walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    /// The walker returned normally
    Completed(WalkReport),
    /// The walker hit a fatal error (or its task panicked)
    Failed {
        /// Articles written before the failure
        articles_saved: usize,
        message: String,
    },
    /// The walker was still running when the run deadline passed
    TimedOut,
}

impl fmt::Display for SiteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteOutcome::Completed(_) => f.write_str("completed"),
            SiteOutcome::Failed { .. } => f.write_str("failed"),
            SiteOutcome::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Outcome of one site, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub site: String,
    pub outcome: SiteOutcome,
}

/// Result of a whole run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Timestamp shared by every site's output
    pub run_started: DateTime<Utc>,
    pub elapsed: Duration,
    pub sites: Vec<SiteReport>,
}

impl RunSummary {
    /// Articles saved across all sites, failed ones included
    pub fn total_articles(&self) -> usize {
        self.sites
            .iter()
            .filter_map(|s| match &s.outcome {
                SiteOutcome::Completed(report) => Some(report.articles_saved),
                SiteOutcome::Failed { articles_saved, .. } => Some(*articles_saved),
                SiteOutcome::TimedOut => None,
            })
            .sum()
    }

    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, SiteOutcome::Completed(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SiteOutcome::Failed { .. }))
    }

    pub fn timed_out(&self) -> usize {
        self.count(|o| matches!(o, SiteOutcome::TimedOut))
    }

    fn count(&self, predicate: impl Fn(&SiteOutcome) -> bool) -> usize {
        self.sites.iter().filter(|s| predicate(&s.outcome)).count()
    }
}

/// Claims `base` as a batch suffix, or `base_2`, `base_3`, ... when it is already taken
///
/// Several definitions may share a host, and each needs its own batch file.
fn unique_suffix(base: String, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 2;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}_{}", base, n);
        n += 1;
    }
    candidate
}

/// Main crawl coordinator
pub struct Coordinator {
    walkers: Vec<Walker>,
    concurrent: bool,
    max_concurrent_sites: usize,
    run_timeout: Duration,
    fail_fast: bool,
    run_started: DateTime<Utc>,
}

impl Coordinator {
    /// Creates a coordinator with one walker per site
    ///
    /// The run timestamp is taken here, before any walker exists, and every sink is
    /// opened here. A sink that cannot be opened fails the whole run.
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `sites` - The loaded sites, in crawl order
    /// * `fetcher` - Shared by every walker
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(GathererError)` - No sites, or a sink could not be opened
    pub fn new(
        config: &RunConfig,
        sites: Vec<SiteConfig>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, GathererError> {
        if sites.is_empty() {
            return Err(GathererError::NoSites);
        }

        let run_started = Utc::now();
        // Concurrent sites each get their own batch file
        let suffixed = config.crawler.concurrent && sites.len() > 1;

        let mut taken = HashSet::new();
        let mut walkers = Vec::with_capacity(sites.len());
        for site in sites {
            let suffix =
                suffixed.then(|| unique_suffix(batch_suffix(&site.base_url), &mut taken));
            let sink = open_sink(&config.output, run_started, suffix.as_deref())?;
            walkers.push(Walker::new(
                Arc::new(site),
                Arc::clone(&fetcher),
                sink,
                config.crawler.max_articles,
            ));
        }

        Self::from_walkers(&config.crawler, walkers, run_started)
    }

    /// Creates a coordinator from already-built walkers
    pub fn from_walkers(
        config: &CrawlerConfig,
        walkers: Vec<Walker>,
        run_started: DateTime<Utc>,
    ) -> Result<Self, GathererError> {
        if walkers.is_empty() {
            return Err(GathererError::NoSites);
        }

        let max_concurrent_sites = config
            .max_concurrent_sites
            .unwrap_or(walkers.len())
            .max(1);

        Ok(Self {
            walkers,
            concurrent: config.concurrent,
            max_concurrent_sites,
            run_timeout: Duration::from_secs(config.run_timeout_secs),
            fail_fast: config.fail_fast,
            run_started,
        })
    }

    /// Overrides how long a concurrent run waits for its sites
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Returns the timestamp shared by every site's output
    pub fn run_started(&self) -> DateTime<Utc> {
        self.run_started
    }

    /// Runs every walker and collects per-site outcomes
    ///
    /// A failed site does not stop the others unless fail-fast is configured. In
    /// concurrent mode, sites still running at the deadline are reported as timed out and
    /// left to finish in the background; their in-flight fetches are not cancelled.
    pub async fn run(self) -> Result<RunSummary, GathererError> {
        let started = std::time::Instant::now();
        let run_started = self.run_started;

        tracing::info!(
            "Starting run of {} sites ({})",
            self.walkers.len(),
            if self.concurrent {
                "concurrent"
            } else {
                "sequential"
            }
        );

        let sites = if self.concurrent {
            self.run_concurrent().await?
        } else {
            self.run_sequential().await?
        };

        let summary = RunSummary {
            run_started,
            elapsed: started.elapsed(),
            sites,
        };

        tracing::info!(
            "Run finished in {:?}: {} completed, {} failed, {} timed out, {} articles saved",
            summary.elapsed,
            summary.completed(),
            summary.failed(),
            summary.timed_out(),
            summary.total_articles()
        );

        Ok(summary)
    }

    async fn run_sequential(self) -> Result<Vec<SiteReport>, GathererError> {
        let mut reports = Vec::with_capacity(self.walkers.len());

        for walker in self.walkers {
            let site = walker.site_name();
            let span = tracing::info_span!("site", host = %site);

            let outcome = match walker.run().instrument(span).await {
                Ok(report) => SiteOutcome::Completed(report),
                Err(e) => {
                    tracing::error!("Site {} failed: {}", site, e);
                    if self.fail_fast {
                        return Err(GathererError::SiteFailed {
                            site,
                            message: e.to_string(),
                        });
                    }
                    SiteOutcome::Failed {
                        articles_saved: e.articles_saved,
                        message: e.to_string(),
                    }
                }
            };

            reports.push(SiteReport { site, outcome });
        }

        Ok(reports)
    }

    async fn run_concurrent(self) -> Result<Vec<SiteReport>, GathererError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_sites));
        let deadline = tokio::time::Instant::now() + self.run_timeout;

        let mut handles = Vec::with_capacity(self.walkers.len());
        for walker in self.walkers {
            let site = walker.site_name();
            let span = tracing::info_span!("site", host = %site);
            let semaphore = Arc::clone(&semaphore);

            let handle = tokio::spawn(
                async move {
                    let _permit = semaphore.acquire_owned().await.map_err(|e| WalkError {
                        articles_saved: 0,
                        source: GathererError::WorkerPool(e.to_string()),
                    })?;
                    walker.run().await
                }
                .instrument(span),
            );
            handles.push((site, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (site, handle) in handles {
            // On timeout the handle is dropped, which detaches the task without aborting it
            let outcome = match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(Ok(report))) => SiteOutcome::Completed(report),
                Ok(Ok(Err(e))) => {
                    tracing::error!("Site {} failed: {}", site, e);
                    SiteOutcome::Failed {
                        articles_saved: e.articles_saved,
                        message: e.to_string(),
                    }
                }
                Ok(Err(e)) => {
                    tracing::error!("Site {} task panicked: {}", site, e);
                    SiteOutcome::Failed {
                        articles_saved: 0,
                        message: format!("task panicked: {}", e),
                    }
                }
                Err(_) => {
                    tracing::warn!(
                        "Site {} did not finish within {:?}; leaving it running",
                        site,
                        self.run_timeout
                    );
                    SiteOutcome::TimedOut
                }
            };
            reports.push(SiteReport { site, outcome });
        }

        if self.fail_fast {
            if let Some(failed) = reports.iter().find_map(|r| match &r.outcome {
                SiteOutcome::Failed { message, .. } => Some((r.site.clone(), message.clone())),
                _ => None,
            }) {
                return Err(GathererError::SiteFailed {
                    site: failed.0,
                    message: failed.1,
                });
            }
        }

        Ok(reports)
    }
}
