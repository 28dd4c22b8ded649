//! Crawler module for web page fetching and processing
//!
//! This module contains the crawl engine:
//! - HTTP fetching behind the [`Fetcher`] capability
//! - HTML link extraction behind the [`LinkExtractor`] capability
//! - The shared visited registry, work queue and concurrency limiter
//! - Workers and the coordinator that runs them

mod coordinator;
mod fetcher;
mod limiter;
mod parser;
mod queue;
#[cfg(test)]
mod testing;
mod visited;
mod worker;

pub use coordinator::{crawl_site, crawl_site_with_progress, Coordinator, CrawlReport, ProgressFn};
pub use fetcher::{
    build_http_client, classify_status, FetchError, FetchResponse, Fetcher, ReqwestFetcher,
};
pub use limiter::{ConcurrencyLimiter, FetchPermit};
pub use parser::{extract_links, HtmlLinkExtractor, LinkExtractor};
pub use queue::{InFlight, WorkQueue};
pub use visited::VisitedRegistry;
pub use worker::{PageError, PageResult};
