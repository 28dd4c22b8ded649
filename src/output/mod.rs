//! Output module for presenting crawl results
//!
//! This module handles:
//! - Rendering a [`CrawlReport`] as human-readable text
//! - Rendering it as JSON for other tools
//! - Summary statistics (see [`stats`])

pub mod stats;

pub use stats::{format_statistics, print_statistics, CrawlStatistics};

use crate::crawler::CrawlReport;
use crate::state::StopReason;
use std::collections::HashSet;
use std::time::Duration;

/// Width of the separator lines in text output
const RULE_WIDTH: usize = 80;

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders a report in the requested format
pub fn render_report(report: &CrawlReport, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format_text_report(report)),
        OutputFormat::Json => format_json_report(report),
    }
}

/// Formats a report as plain text
///
/// Pages are listed in the order they were recorded, each with its links
/// sorted. Failed pages show their error. Totals and the elapsed time close
/// the output.
pub fn format_text_report(report: &CrawlReport) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str("\nCrawl Results:\n");
    out.push_str(&rule);
    out.push('\n');

    if report.is_empty() {
        out.push_str("No pages were crawled.\n");
    }

    for page in &report.pages {
        out.push_str(&format!("\nPage: {}\n", page.url));

        if let Some(final_url) = &page.final_url {
            out.push_str(&format!("Redirected to: {}\n", final_url));
        }
        if let Some(error) = &page.error {
            out.push_str(&format!("Error: {}\n", error));
        }

        if page.links.is_empty() {
            out.push_str("No links found on this page.\n");
        } else {
            let mut links: Vec<&str> = page.links.iter().map(|link| link.as_str()).collect();
            links.sort_unstable();

            out.push_str("Links found:\n");
            for link in links {
                out.push_str(&format!("  - {}\n", link));
            }
        }
    }

    let unique_links: HashSet<&str> = report
        .pages
        .iter()
        .flat_map(|page| page.links.iter().map(|link| link.as_str()))
        .collect();

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!("Total pages crawled: {}\n", report.pages_crawled()));
    out.push_str(&format!("Failed pages: {}\n", report.failed().count()));
    out.push_str(&format!("Unique links found: {}\n", unique_links.len()));
    out.push_str(&format!("Stopped: {}\n", describe_stop(report.stop_reason)));
    out.push_str(&format!(
        "Total crawling time: {}\n",
        format_elapsed(report.elapsed)
    ));

    out
}

/// Formats a report as pretty-printed JSON
pub fn format_json_report(report: &CrawlReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Formats a duration as `Xm Ys`, or `Ys` under a minute
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (minutes, seconds) = (total / 60, total % 60);

    if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn describe_stop(reason: StopReason) -> &'static str {
    match reason {
        StopReason::Drained => "all reachable pages visited",
        StopReason::MaxPages => "max pages limit reached",
        StopReason::Interrupted => "interrupted by user",
    }
}
