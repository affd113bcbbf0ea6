//! NewsMap Gatherer main entry point
//!
//! This is the command-line interface for the NewsMap news crawler.

use anyhow::Context;
use clap::Parser;
use newsmap_gatherer::config::{
    load_config, load_sites, validate, OutputFormat, RunConfig, SiteConfig,
};
use newsmap_gatherer::crawler::{user_agent_string, Coordinator, HttpFetcher, PageFetcher};
use newsmap_gatherer::output::print_run_summary;
use newsmap_gatherer::ConfigError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status when no site could be loaded
const EXIT_NO_SITES: u8 = 2;

/// NewsMap Gatherer: a polite news crawler
///
/// Crawls the news sites described by the JSON definitions in the site directory,
/// following topic links down to each site's depth limit and saving up to a fixed
/// number of articles per site, while respecting robots.txt.
#[derive(Parser, Debug)]
#[command(name = "newsmap-gatherer")]
#[command(version)]
#[command(about = "A polite, config-driven news crawler", long_about = None)]
struct Cli {
    /// Path to TOML run configuration (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of articles saved per site
    #[arg(long, value_name = "N")]
    max_articles: Option<usize>,

    /// Crawl sites one after another instead of concurrently
    #[arg(long)]
    sequential: bool,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Directory of site definition files
    #[arg(long, value_name = "DIR")]
    sites_dir: Option<PathBuf>,

    /// Directory articles are written to
    #[arg(long, value_name = "DIR")]
    article_dir: Option<PathBuf>,

    /// Load configuration and sites, then show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let fetcher = Arc::new(
        HttpFetcher::new(
            &config.user_agent,
            Duration::from_secs(config.crawler.fetch_timeout_secs),
        )
        .context("Failed to build HTTP client")?,
    );

    let sites_dir = Path::new(&config.sites.config_dir);
    tracing::info!("Loading site definitions from: {}", sites_dir.display());
    let sites = match load_sites(sites_dir, fetcher.as_ref(), &config.user_agent.crawler_name).await
    {
        Ok(sites) => sites,
        Err(ConfigError::MissingDirectory(dir)) => {
            tracing::error!("Site directory not found: {}", dir);
            return Ok(ExitCode::from(EXIT_NO_SITES));
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to read site directory {}", sites_dir.display())
            })
        }
    };

    if sites.is_empty() {
        tracing::error!("No site configurations could be loaded; nothing to crawl");
        return Ok(ExitCode::from(EXIT_NO_SITES));
    }

    if cli.dry_run {
        handle_dry_run(&config, &sites);
        return Ok(ExitCode::SUCCESS);
    }

    handle_crawl(&config, sites, fetcher).await?;
    Ok(ExitCode::SUCCESS)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("newsmap_gatherer=info,warn"),
            1 => EnvFilter::new("newsmap_gatherer=debug,info"),
            2 => EnvFilter::new("newsmap_gatherer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the run configuration and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?
        }
        None => RunConfig::default(),
    };

    if let Some(max_articles) = cli.max_articles {
        config.crawler.max_articles = max_articles;
    }
    if cli.sequential {
        config.crawler.concurrent = false;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(dir) = &cli.sites_dir {
        config.sites.config_dir = dir.to_string_lossy().to_string();
    }
    if let Some(dir) = &cli.article_dir {
        config.output.article_dir = dir.to_string_lossy().to_string();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &RunConfig, sites: &[SiteConfig]) {
    println!("=== NewsMap Gatherer Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max articles per site: {}", config.crawler.max_articles);
    println!(
        "  Mode: {}",
        if config.crawler.concurrent {
            "concurrent"
        } else {
            "sequential"
        }
    );
    if config.crawler.concurrent {
        println!(
            "  Max concurrent sites: {}",
            config.crawler.max_concurrent_sites.unwrap_or(sites.len())
        );
        println!("  Run timeout: {}s", config.crawler.run_timeout_secs);
    }
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  Fail fast: {}", config.crawler.fail_fast);

    println!("\nUser Agent:");
    println!("  {}", user_agent_string(&config.user_agent));

    println!("\nOutput:");
    println!("  Format: {}", config.output.format);
    println!("  Directory: {}", config.output.article_dir);

    println!("\nSites ({}):", sites.len());
    for site in sites {
        println!(
            "  - {} (max depth {}, {} topic selectors, {} article selectors)",
            site.base_url,
            site.max_depth,
            site.topic_selectors.len(),
            site.article_selectors.len()
        );
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} sites for up to {} articles",
        sites.len(),
        sites.len() * config.crawler.max_articles
    );
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &RunConfig,
    sites: Vec<SiteConfig>,
    fetcher: Arc<HttpFetcher>,
) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} sites, up to {} articles each",
        sites.len(),
        config.crawler.max_articles
    );

    let fetcher: Arc<dyn PageFetcher> = fetcher;
    let coordinator =
        Coordinator::new(config, sites, fetcher).context("Failed to set up the crawl")?;

    match coordinator.run().await {
        Ok(summary) => {
            print_run_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
