//! In-memory site used by the engine tests

use crate::crawler::fetcher::{FetchError, FetchResponse, Fetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug, Clone)]
pub(crate) enum FakePage {
    Html(String),
    Binary(&'static str),
    Redirect { to: String, html: String },
    Fail(FetchError),
}

pub(crate) fn page(html: &str) -> FakePage {
    FakePage::Html(html.to_string())
}

/// Fetcher serving a fixed map of URL to page
///
/// Unknown URLs answer 404. Clones share the fetch log.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSite {
    pages: HashMap<String, FakePage>,
    fetched: Arc<Mutex<Vec<String>>>,
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    delay: Option<Duration>,
    cancel_on: Option<(String, CancellationToken)>,
}

impl FakeSite {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Cancels `token` while `url` is being fetched
    pub(crate) fn cancel_on(mut self, url: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((url.to_string(), token));
        self
    }

    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }

    pub(crate) fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

fn html_response(final_url: Url, content_type: &str, body: &str) -> FetchResponse {
    FetchResponse {
        final_url,
        status: 200,
        content_type: Some(content_type.to_string()),
        body: body.as_bytes().to_vec(),
    }
}

#[async_trait]
impl Fetcher for FakeSite {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let key = url.as_str().to_string();
        self.fetched.lock().unwrap().push(key.clone());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some((trigger, token)) = &self.cancel_on {
            if *trigger == key {
                token.cancel();
            }
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        match self.pages.get(&key) {
            None => Err(FetchError::HttpStatus(404)),
            Some(FakePage::Html(body)) => Ok(html_response(url.clone(), "text/html", body)),
            Some(FakePage::Binary(content_type)) => Ok(html_response(url.clone(), content_type, "")),
            Some(FakePage::Redirect { to, html }) => {
                let final_url = Url::parse(to).unwrap();
                Ok(html_response(final_url, "text/html; charset=utf-8", html))
            }
            Some(FakePage::Fail(e)) => Err(e.clone()),
        }
    }
}
