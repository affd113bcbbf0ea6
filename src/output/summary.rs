//! Run summary output
//!
//! Renders the per-site outcome table printed at the end of every run.

use crate::crawler::{RunSummary, SiteOutcome};
use std::fmt::Write;

/// Formats the run summary as a plain-text table
///
/// # Arguments
///
/// * `summary` - The finished run
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Run Summary ===\n");
    let _ = writeln!(
        out,
        "Run started: {} UTC ({:.1}s)",
        summary.run_started.format("%Y-%m-%d %H:%M:%S"),
        summary.elapsed.as_secs_f64()
    );
    let _ = writeln!(out);

    let width = summary
        .sites
        .iter()
        .map(|s| s.site.len())
        .max()
        .unwrap_or(0)
        .max("Site".len());

    let _ = writeln!(
        out,
        "{:<width$}  {:<10}  {:>8}  {:>5}  {:>10}  {:>8}  {}",
        "Site",
        "Outcome",
        "Articles",
        "Pages",
        "Disallowed",
        "Failures",
        "Stop reason",
        width = width
    );

    for site in &summary.sites {
        match &site.outcome {
            SiteOutcome::Completed(report) => {
                let _ = writeln!(
                    out,
                    "{:<width$}  {:<10}  {:>8}  {:>5}  {:>10}  {:>8}  {}",
                    site.site,
                    site.outcome.to_string(),
                    report.articles_saved,
                    report.pages_fetched,
                    report.urls_disallowed,
                    report.fetch_failures,
                    report.stop_reason,
                    width = width
                );
            }
            SiteOutcome::Failed {
                articles_saved,
                message,
            } => {
                let _ = writeln!(
                    out,
                    "{:<width$}  {:<10}  {:>8}  {:>5}  {:>10}  {:>8}  {}",
                    site.site,
                    site.outcome.to_string(),
                    articles_saved,
                    "-",
                    "-",
                    "-",
                    message,
                    width = width
                );
            }
            SiteOutcome::TimedOut => {
                let _ = writeln!(
                    out,
                    "{:<width$}  {:<10}  {:>8}  {:>5}  {:>10}  {:>8}  {}",
                    site.site,
                    site.outcome.to_string(),
                    "-",
                    "-",
                    "-",
                    "-",
                    "still running at deadline",
                    width = width
                );
            }
        }
    }

    let _ = writeln!(out);
    let _ = write!(
        out,
        "Total: {} articles from {} sites ({} completed, {} failed, {} timed out)",
        summary.total_articles(),
        summary.sites.len(),
        summary.completed(),
        summary.failed(),
        summary.timed_out()
    );

    out
}

/// Prints the run summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    println!("{}", format_run_summary(summary));
}
