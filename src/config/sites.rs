//! Site loading
//!
//! Turns the definition files in the site directory into crawlable `SiteConfig`s. Every
//! site gets its robots.txt resolved here, once; a site whose definition is invalid or
//! whose robots.txt cannot be fetched is dropped with a logged error.

use crate::config::parser::{list_site_files, load_site_definition};
use crate::config::types::SiteConfig;
use crate::crawler::PageFetcher;
use crate::robots::{fetch_robots, RobotsOracle};
use crate::ConfigError;
use std::path::Path;
use std::sync::Arc;

/// Loads every usable site from a directory
///
/// # Arguments
///
/// * `dir` - Directory of `*.json` site definitions
/// * `fetcher` - Used to download each site's robots.txt
/// * `robots_agent` - Product token robots.txt rules are evaluated for
///
/// # Returns
///
/// * `Ok(Vec<SiteConfig>)` - The sites that loaded, in file name order (possibly none)
/// * `Err(ConfigError)` - The directory itself could not be read
pub async fn load_sites(
    dir: &Path,
    fetcher: &dyn PageFetcher,
    robots_agent: &str,
) -> Result<Vec<SiteConfig>, ConfigError> {
    let files = list_site_files(dir)?;
    tracing::info!("Found {} site definitions in {}", files.len(), dir.display());

    let mut sites = Vec::with_capacity(files.len());
    for path in files {
        let (definition, base_url) = match load_site_definition(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        let rules = match fetch_robots(fetcher, &base_url, robots_agent).await {
            Ok(rules) => rules,
            Err(e) => {
                tracing::error!(
                    "Skipping {} ({}): robots.txt unavailable: {}",
                    path.display(),
                    base_url,
                    e
                );
                continue;
            }
        };

        tracing::info!("Loaded site {} from {}", base_url, path.display());
        let robots: Arc<dyn RobotsOracle> = Arc::new(rules);
        sites.push(SiteConfig::new(definition, base_url, Some(robots)));
    }

    Ok(sites)
}
