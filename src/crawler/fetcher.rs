//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with browser-like headers and a request timeout
//! - Following redirects (the final URL is reported back to the engine)
//! - Classifying failures into timeout, connection, HTTP status and other

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// Upper bound for establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Successful response of a fetch
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, if present
    pub content_type: Option<String>,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Returns true if the response declares an HTML body
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false)
    }
}

/// Classified fetch failure
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Short machine-readable name of the failure class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connection(_) => "connection",
            Self::HttpStatus(_) => "http_status",
            Self::Other(_) => "other",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if e.is_redirect() {
            Self::Other(format!("redirect error: {}", e))
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Capability to fetch a page
///
/// Implementations handle redirects and timeouts themselves; the engine only
/// sees the final outcome.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::HttpConfig;
/// use sitewalk::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.timeout();

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(CONNECT_TIMEOUT))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Maps a response status to the crawl outcome
///
/// Only 200 carries content worth parsing. Other 2xx codes are technically
/// successful but are not suitable for crawling.
pub fn classify_status(status: StatusCode) -> Result<(), FetchError> {
    if status == StatusCode::OK {
        return Ok(());
    }

    if status.is_success() {
        tracing::warn!(
            "Received HTTP {}, successful but not suitable for crawling",
            status.as_u16()
        );
    }

    Err(FetchError::HttpStatus(status.as_u16()))
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
    accept: String,
    accept_language: String,
}

impl ReqwestFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            accept: config.accept.clone(),
            accept_language: config.accept_language.clone(),
        })
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, self.accept.as_str())
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .send()
            .await
            .map_err(|e| {
                let error = FetchError::from(e);
                tracing::warn!("Request error while fetching {}: {}", url, error);
                error
            })?;

        let status = response.status();
        if let Err(e) = classify_status(status) {
            tracing::warn!("Failed to fetch {}: {}", url, e);
            return Err(e);
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(FetchError::from)?.to_vec();

        tracing::trace!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchResponse {
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
