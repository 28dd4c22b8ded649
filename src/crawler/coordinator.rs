//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns one crawl invocation:
//! - Seeding the visited registry and work queue
//! - Spawning the worker pool
//! - Collecting page results (it is their only writer)
//! - Watching the three stop conditions: drain, max pages and interrupt
//! - Draining in-flight work and producing the final [`CrawlReport`]

use crate::config::{validate, Config, CrawlerConfig};
use crate::crawler::fetcher::{Fetcher, ReqwestFetcher};
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::queue::WorkQueue;
use crate::crawler::visited::VisitedRegistry;
use crate::crawler::worker::{PageResult, Worker};
use crate::state::{CrawlPhase, StopReason};
use crate::url::{parse_seed, CrawlTarget, DomainScope};
use crate::CrawlError;
use serde::{Serialize, Serializer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// State shared by the coordinator and every worker of one crawl
pub(crate) struct CrawlState {
    pub(crate) scope: DomainScope,
    pub(crate) visited: VisitedRegistry,
    pub(crate) queue: WorkQueue,
    pub(crate) limiter: ConcurrencyLimiter,
    pub(crate) stop: CancellationToken,
    pages_started: AtomicUsize,
    abandoned: AtomicUsize,
    max_pages: usize,
}

impl CrawlState {
    pub(crate) fn new(
        scope: DomainScope,
        concurrency: usize,
        max_pages: usize,
        stop: CancellationToken,
    ) -> Self {
        Self {
            scope,
            visited: VisitedRegistry::new(),
            queue: WorkQueue::new(stop.clone()),
            limiter: ConcurrencyLimiter::new(concurrency),
            stop,
            pages_started: AtomicUsize::new(0),
            abandoned: AtomicUsize::new(0),
            max_pages,
        }
    }

    /// Claims one page of the max-pages budget
    ///
    /// Returns false once `max_pages` fetches have been started.
    pub(crate) fn claim_page(&self) -> bool {
        self.pages_started
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |started| {
                (started < self.max_pages).then_some(started + 1)
            })
            .is_ok()
    }

    /// Records a popped target that a worker gave up on without fetching
    pub(crate) fn abandon(&self, target: &CrawlTarget) {
        tracing::trace!("Abandoning {}", target);
        self.abandoned.fetch_add(1, Ordering::SeqCst);
    }

    /// True when no target was left unfetched, either queued or abandoned
    fn nothing_left(&self) -> bool {
        self.queue.pending_len() == 0 && self.abandoned.load(Ordering::SeqCst) == 0
    }
}

/// Callback invoked with each recorded page and the running page count
pub type ProgressFn = dyn Fn(&PageResult, usize) + Send + Sync;

/// Final outcome of a crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: CrawlTarget,
    pub stop_reason: StopReason,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// One entry per fetched page, in the order results were recorded
    pub pages: Vec<PageResult>,
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl CrawlReport {
    pub fn pages_crawled(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages that carry an error
    pub fn failed(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|page| !page.is_success())
    }

    /// Looks up the result recorded for a URL
    pub fn page(&self, url: &str) -> Option<&PageResult> {
        self.pages.iter().find(|page| page.url.as_str() == url)
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F, E = HtmlLinkExtractor> {
    seed: CrawlTarget,
    scope: DomainScope,
    config: CrawlerConfig,
    fetcher: Arc<F>,
    extractor: Arc<E>,
    progress: Option<Arc<ProgressFn>>,
    phase: CrawlPhase,
}

impl<F> Coordinator<F, HtmlLinkExtractor>
where
    F: Fetcher + 'static,
{
    /// Creates a coordinator scoped to the seed's host
    pub fn new(seed: CrawlTarget, config: CrawlerConfig, fetcher: F) -> Self {
        Self {
            scope: DomainScope::from_target(&seed),
            seed,
            config,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(HtmlLinkExtractor),
            progress: None,
            phase: CrawlPhase::Idle,
        }
    }
}

impl<F, E> Coordinator<F, E>
where
    F: Fetcher + 'static,
    E: LinkExtractor + 'static,
{
    /// Replaces the link extractor
    pub fn with_extractor<X: LinkExtractor + 'static>(self, extractor: X) -> Coordinator<F, X> {
        Coordinator {
            seed: self.seed,
            scope: self.scope,
            config: self.config,
            fetcher: self.fetcher,
            extractor: Arc::new(extractor),
            progress: self.progress,
            phase: self.phase,
        }
    }

    /// Calls `progress` for every page as soon as its result is recorded
    pub fn with_progress<P>(mut self, progress: P) -> Self
    where
        P: Fn(&PageResult, usize) + Send + Sync + 'static,
    {
        let progress: Arc<ProgressFn> = Arc::new(progress);
        self.progress = Some(progress);
        self
    }

    /// Overrides the host boundary derived from the seed
    pub fn with_scope(mut self, scope: DomainScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn seed(&self) -> &CrawlTarget {
        &self.seed
    }

    fn transition(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::debug!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
    }

    fn begin_draining(&mut self, state: &CrawlState) {
        self.transition(CrawlPhase::Draining);
        state.queue.close();
    }

    /// Runs one crawl to completion
    ///
    /// Cancelling `interrupt` stops the crawl early; pages already being
    /// fetched still finish and are part of the report. Each call is a fresh
    /// crawl with its own visited set.
    pub async fn run(&mut self, interrupt: CancellationToken) -> CrawlReport {
        let started = Instant::now();
        self.phase = CrawlPhase::Idle;
        self.transition(CrawlPhase::Seeding);

        let state = Arc::new(CrawlState::new(
            self.scope.clone(),
            self.config.concurrency,
            self.config.max_pages,
            interrupt.child_token(),
        ));

        let seed = match self.scope.admit(self.seed.clone()) {
            Ok(seed) => seed,
            Err(e) => {
                tracing::warn!("Nothing to crawl: {}", e);
                self.transition(CrawlPhase::Terminated);
                return CrawlReport {
                    seed: self.seed.clone(),
                    stop_reason: StopReason::Drained,
                    elapsed: started.elapsed(),
                    pages: Vec::new(),
                };
            }
        };

        state.visited.try_reserve(&seed);
        state.queue.push(seed);

        self.transition(CrawlPhase::Running);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let workers: Vec<JoinHandle<usize>> = (0..self.config.worker_count())
            .map(|id| {
                let worker = Worker::new(
                    id,
                    state.clone(),
                    self.fetcher.clone(),
                    self.extractor.clone(),
                    tx.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();
        // The channel closes once every worker has exited
        drop(tx);

        tracing::info!(
            "Crawling {} with {} workers, {} concurrent fetches",
            self.scope.host(),
            workers.len(),
            self.config.concurrency
        );

        let mut pages = Vec::new();
        let mut stop_reason = None;

        loop {
            tokio::select! {
                biased;

                _ = interrupt.cancelled(), if stop_reason.is_none() => {
                    tracing::info!("Interrupted, waiting for in-flight pages");
                    stop_reason = Some(StopReason::Interrupted);
                    self.begin_draining(&state);
                }

                received = rx.recv() => {
                    let Some(result) = received else { break };
                    match result.status {
                        Some(status) => tracing::debug!("Crawled {} ({})", result.url, status),
                        None => tracing::debug!("Crawled {} (no response)", result.url),
                    }
                    if let Some(progress) = &self.progress {
                        progress(&result, pages.len() + 1);
                    }
                    pages.push(result);

                    if pages.len() % 10 == 0 {
                        let rate = pages.len() as f64 / started.elapsed().as_secs_f64();
                        tracing::info!(
                            "Progress: {} pages crawled, {} queued, {:.2} pages/sec",
                            pages.len(),
                            state.queue.pending_len(),
                            rate
                        );
                    }

                    if stop_reason.is_none() && pages.len() >= self.config.max_pages {
                        tracing::info!("Reached max pages limit ({})", self.config.max_pages);
                        stop_reason = Some(StopReason::MaxPages);
                        self.begin_draining(&state);
                    }
                }

                _ = state.queue.wait_drained(), if stop_reason.is_none() => {
                    tracing::debug!("Queue drained, crawl complete");
                    stop_reason = Some(StopReason::Drained);
                    self.begin_draining(&state);
                }
            }
        }

        // Workers exited on their own without any stop condition firing
        let stop_reason = match stop_reason {
            Some(reason) => reason,
            None => {
                self.begin_draining(&state);
                StopReason::Drained
            }
        };

        let mut fetched = 0;
        for handle in workers {
            match handle.await {
                Ok(count) => fetched += count,
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }

        // The budget ran out exactly as the site did
        let stop_reason = if stop_reason == StopReason::MaxPages && state.nothing_left() {
            tracing::debug!("Max pages reached with nothing left to crawl");
            StopReason::Drained
        } else {
            stop_reason
        };

        self.transition(CrawlPhase::Terminated);

        let elapsed = started.elapsed();
        tracing::info!(
            "Crawl finished ({}): {} pages in {:.2}s",
            stop_reason,
            pages.len(),
            elapsed.as_secs_f64()
        );
        tracing::debug!("Workers fetched {} pages in total", fetched);

        CrawlReport {
            seed: self.seed.clone(),
            stop_reason,
            elapsed,
            pages,
        }
    }
}

/// Crawls every page reachable on the seed's host
///
/// This is the main entry point. It validates the configuration, parses the
/// seed, builds the HTTP fetcher and runs a [`Coordinator`] until the site is
/// exhausted, `max_pages` is reached or `interrupt` is cancelled.
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran; per-page failures are inside the report
/// * `Err(CrawlError)` - The crawl could not start
pub async fn crawl_site(
    seed: &str,
    config: &Config,
    interrupt: CancellationToken,
) -> Result<CrawlReport, CrawlError> {
    crawl_site_with_progress(seed, config, interrupt, |_, _| {}).await
}

/// Like [`crawl_site`], reporting every recorded page to `progress`
pub async fn crawl_site_with_progress<P>(
    seed: &str,
    config: &Config,
    interrupt: CancellationToken,
    progress: P,
) -> Result<CrawlReport, CrawlError>
where
    P: Fn(&PageResult, usize) + Send + Sync + 'static,
{
    validate(config)?;
    let seed = parse_seed(seed)?;
    let fetcher = ReqwestFetcher::new(&config.http)?;

    tracing::info!("Starting crawl of {}", seed);

    let mut coordinator =
        Coordinator::new(seed, config.crawler.clone(), fetcher).with_progress(progress);
    Ok(coordinator.run(interrupt).await)
}
