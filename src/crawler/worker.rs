//! Crawl workers
//!
//! Each worker loops: pop a target, take a fetch permit, fetch, extract and
//! filter links, reserve and enqueue the new in-scope ones, and report a
//! [`PageResult`] to the coordinator. Workers keep no state between
//! iterations; everything shared lives in [`CrawlState`].

use crate::crawler::coordinator::CrawlState;
use crate::crawler::fetcher::{FetchError, FetchResponse, Fetcher};
use crate::crawler::parser::LinkExtractor;
use crate::url::CrawlTarget;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Classified failure of a single page
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageError {
    #[error("fetch failed: {0}")]
    Fetch(FetchError),

    #[error("not an HTML page (content type: {content_type})")]
    ContentMismatch { content_type: String },

    #[error("redirected off-site to {final_url}")]
    OffDomainRedirect { final_url: String },
}

impl PageError {
    /// Short machine-readable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(e) => e.kind(),
            Self::ContentMismatch { .. } => "content_mismatch",
            Self::OffDomainRedirect { .. } => "off_domain_redirect",
        }
    }
}

/// Outcome of crawling one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    /// The requested target
    pub url: CrawlTarget,

    /// Where redirects ended, when different from `url`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<CrawlTarget>,

    /// HTTP status of the final response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Every distinct link found on the page, in document order, including
    /// off-site links that are never fetched
    pub links: Vec<CrawlTarget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PageError>,
}

impl PageResult {
    /// A page whose fetch failed outright
    pub fn failed(url: CrawlTarget, error: PageError) -> Self {
        Self {
            url,
            final_url: None,
            status: None,
            links: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Distinct links in first-seen order
#[derive(Default)]
struct LinkList {
    seen: HashSet<CrawlTarget>,
    links: Vec<CrawlTarget>,
}

impl LinkList {
    fn insert(&mut self, link: CrawlTarget) -> bool {
        if self.seen.insert(link.clone()) {
            self.links.push(link);
            true
        } else {
            false
        }
    }
}

/// One concurrently scheduled execution unit
pub(crate) struct Worker<F, E> {
    id: usize,
    state: Arc<CrawlState>,
    fetcher: Arc<F>,
    extractor: Arc<E>,
    results: UnboundedSender<PageResult>,
}

impl<F, E> Worker<F, E>
where
    F: Fetcher,
    E: LinkExtractor,
{
    pub(crate) fn new(
        id: usize,
        state: Arc<CrawlState>,
        fetcher: Arc<F>,
        extractor: Arc<E>,
        results: UnboundedSender<PageResult>,
    ) -> Self {
        Self {
            id,
            state,
            fetcher,
            extractor,
            results,
        }
    }

    /// Runs until the queue drains or a stop is requested
    ///
    /// Returns the number of pages this worker fetched.
    pub(crate) async fn run(self) -> usize {
        let mut fetched = 0;
        tracing::trace!("Worker {} started", self.id);

        while let Some(item) = self.next_item().await {
            let Some(permit) = self.state.limiter.acquire().await else {
                self.state.abandon(item.target());
                break;
            };

            // Stop may have fired while waiting for the permit
            if self.state.stop.is_cancelled() {
                tracing::debug!("Worker {} stopping before fetching {}", self.id, item.target());
                self.state.abandon(item.target());
                break;
            }

            if !self.state.claim_page() {
                tracing::debug!("Worker {}: page budget exhausted", self.id);
                self.state.abandon(item.target());
                break;
            }

            let target = item.target();
            tracing::debug!("Worker {} fetching {}", self.id, target);
            let outcome = self.fetcher.fetch(target.request_url()).await;
            drop(permit);

            let result = self.handle_outcome(target, outcome);
            fetched += 1;

            if self.results.send(result).is_err() {
                tracing::warn!("Coordinator gone, worker {} exiting", self.id);
                break;
            }

            // `item` drops here, after its children were queued and its result sent
        }

        tracing::trace!("Worker {} exiting after {} pages", self.id, fetched);
        fetched
    }

    async fn next_item(&self) -> Option<crate::crawler::queue::InFlight<'_>> {
        if self.state.stop.is_cancelled() {
            return None;
        }
        self.state.queue.pop().await
    }

    /// Turns a fetch outcome into a page result, scheduling new targets
    fn handle_outcome(
        &self,
        target: &CrawlTarget,
        outcome: Result<FetchResponse, FetchError>,
    ) -> PageResult {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", target, e);
                return PageResult::failed(target.clone(), PageError::Fetch(e));
            }
        };

        let scope = &self.state.scope;
        let mut links = LinkList::default();

        let final_url = scope
            .canonicalize_link(response.final_url.as_str())
            .filter(|final_url| final_url != target);

        let mut result = PageResult {
            url: target.clone(),
            final_url: final_url.clone(),
            status: Some(response.status),
            links: Vec::new(),
            error: None,
        };

        // A redirect target is a discovered link like any other
        if let Some(final_url) = final_url {
            links.insert(final_url.clone());

            if !scope.contains(final_url.as_url()) {
                tracing::debug!("{} redirected off-site to {}", target, final_url);
                result.error = Some(PageError::OffDomainRedirect {
                    final_url: final_url.to_string(),
                });
                result.links = links.links;
                return result;
            }

            self.schedule(final_url);
        }

        if !response.is_html() {
            let content_type = response.content_type.clone().unwrap_or_default();
            tracing::debug!("Non-HTML content at {} ({})", target, content_type);
            result.error = Some(PageError::ContentMismatch { content_type });
            result.links = links.links;
            return result;
        }

        for raw in self.extractor.extract(&response.body, &response.final_url) {
            let Some(link) = scope.canonicalize_link(&raw) else {
                continue;
            };

            if links.insert(link.clone()) && scope.contains(link.as_url()) {
                self.schedule(link);
            }
        }

        tracing::debug!("Processed {}: found {} links", target, links.links.len());
        result.links = links.links;
        result
    }

    /// Reserves and enqueues an in-scope target if nobody did before
    fn schedule(&self, target: CrawlTarget) {
        if self.state.visited.try_reserve(&target) {
            tracing::trace!("Queueing {}", target);
            self.state.queue.push(target);
        }
    }
}
