//! Statistics derived from a crawl report
//!
//! This module summarizes a [`CrawlReport`]: page outcomes, failures by
//! class and how many of the discovered links stay on the crawled host.

use crate::crawler::CrawlReport;
use crate::url::DomainScope;
use std::collections::{BTreeMap, HashSet};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Number of pages fetched
    pub total_pages: usize,

    /// Pages processed without error
    pub succeeded: usize,

    /// Failed pages keyed by error kind
    pub failures_by_kind: BTreeMap<&'static str, usize>,

    /// Links reported across all pages, counting repeats
    pub total_links: usize,

    /// Distinct links reported across all pages
    pub unique_links: usize,

    /// Distinct links on the crawled host
    pub internal_links: usize,

    /// Distinct links on any other host
    pub external_links: usize,
}

impl CrawlStatistics {
    /// Computes the statistics for a report
    pub fn from_report(report: &CrawlReport) -> Self {
        let scope = DomainScope::from_target(&report.seed);
        let mut stats = Self {
            total_pages: report.pages_crawled(),
            ..Self::default()
        };

        let mut unique = HashSet::new();
        for page in &report.pages {
            match &page.error {
                None => stats.succeeded += 1,
                Some(error) => *stats.failures_by_kind.entry(error.kind()).or_insert(0) += 1,
            }

            stats.total_links += page.links.len();
            unique.extend(page.links.iter());
        }

        stats.unique_links = unique.len();
        stats.internal_links = unique
            .iter()
            .filter(|link| scope.contains(link.as_url()))
            .count();
        stats.external_links = stats.unique_links - stats.internal_links;

        stats
    }

    pub fn failed(&self) -> usize {
        self.failures_by_kind.values().sum()
    }
}

/// Formats statistics as an indented text block
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== Crawl Statistics ===\n\n");

    out.push_str("Pages:\n");
    out.push_str(&format!("  Total pages crawled: {}\n", stats.total_pages));
    out.push_str(&format!("  Succeeded: {}\n", stats.succeeded));
    out.push_str(&format!("  Failed: {}\n", stats.failed()));
    out.push('\n');

    if !stats.failures_by_kind.is_empty() {
        out.push_str("Failures by Kind:\n");
        let mut counts: Vec<_> = stats.failures_by_kind.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in counts {
            out.push_str(&format!("  {}: {}\n", kind, count));
        }
        out.push('\n');
    }

    out.push_str("Links:\n");
    out.push_str(&format!("  Total links found: {}\n", stats.total_links));
    out.push_str(&format!("  Unique links: {}\n", stats.unique_links));
    out.push_str(&format!("  Same host: {}\n", stats.internal_links));
    out.push_str(&format!("  Other hosts: {}\n", stats.external_links));

    let success_rate = if stats.total_pages > 0 {
        (stats.succeeded as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    out.push_str(&format!(
        "\nSuccess Rate: {:.1}% ({} / {} pages successfully processed)\n",
        success_rate, stats.succeeded, stats.total_pages
    ));

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
