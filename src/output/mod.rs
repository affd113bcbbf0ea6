//! Output module for writing articles and reporting runs
//!
//! This module handles:
//! - The `ArticleSink` capability a walker hands every saved article to
//! - Per-article JSON files and per-site JSONL batch files
//! - Batch file naming from the shared run timestamp
//! - Printing the per-site run summary

mod json;
mod jsonl;
mod summary;

pub use json::JsonFileSink;
pub use jsonl::JsonlBatchSink;
pub use summary::{format_run_summary, print_run_summary};

use crate::article::Article;
use crate::config::{OutputConfig, OutputFormat};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Format of the run timestamp embedded in batch file names (`2025Y11M14D_08h05m09s`)
pub const RUN_STAMP_FORMAT: &str = "%YY%mM%dD_%Hh%Mm%Ss";

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize article: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output format '{0}' is not supported")]
    UnsupportedFormat(OutputFormat),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for the articles one walker saves
///
/// A sink belongs to exactly one walker. `finish` is called once when the walker stops,
/// whatever the reason; writes after that are errors.
pub trait ArticleSink: Send {
    /// Persists one article
    fn write(&mut self, article: &Article) -> OutputResult<()>;

    /// Flushes and releases the underlying resource
    fn finish(&mut self) -> OutputResult<()>;
}

/// Builds the batch file name for one site
///
/// # Arguments
///
/// * `run_started` - The run timestamp shared by every site in the run
/// * `format` - The batch output format (decides the extension)
/// * `domain_suffix` - Present when several sites write batch files concurrently
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use newsmap_gatherer::config::OutputFormat;
/// use newsmap_gatherer::output::batch_file_name;
///
/// let started = Utc.with_ymd_and_hms(2025, 11, 14, 8, 5, 9).unwrap();
/// assert_eq!(
///     batch_file_name(started, OutputFormat::Jsonl, Some("www.bbc.com")),
///     "articles_2025Y11M14D_08h05m09s_www.bbc.com.jsonl"
/// );
/// ```
pub fn batch_file_name(
    run_started: DateTime<Utc>,
    format: OutputFormat,
    domain_suffix: Option<&str>,
) -> String {
    let stamp = run_started.format(RUN_STAMP_FORMAT);
    match domain_suffix {
        Some(suffix) => format!("articles_{}_{}{}", stamp, suffix, format.extension()),
        None => format!("articles_{}{}", stamp, format.extension()),
    }
}

/// Opens the sink for one site according to the output configuration
///
/// Failing to open a sink is a setup failure: the caller treats it as fatal.
pub fn open_sink(
    config: &OutputConfig,
    run_started: DateTime<Utc>,
    domain_suffix: Option<&str>,
) -> OutputResult<Box<dyn ArticleSink>> {
    let dir = Path::new(&config.article_dir);

    match config.format {
        OutputFormat::Json => Ok(Box::new(JsonFileSink::create(dir)?)),
        OutputFormat::Jsonl => {
            let path: PathBuf =
                dir.join(batch_file_name(run_started, config.format, domain_suffix));
            Ok(Box::new(JsonlBatchSink::create(&path)?))
        }
        OutputFormat::Parquet => Err(OutputError::UnsupportedFormat(config.format)),
    }
}
