use serde::Deserialize;
use std::time::Duration;

/// Default number of concurrent fetches
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default maximum number of pages recorded per crawl
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Browser-like user agent, some sites refuse obvious bots outright
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Main configuration structure for Sitewalk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
}

/// Crawl engine configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of simultaneous in-flight fetches
    pub concurrency: usize,

    /// Number of workers pulling from the queue (defaults to `concurrency`)
    pub workers: Option<usize>,

    /// Maximum number of pages recorded before the crawl drains
    pub max_pages: usize,
}

impl CrawlerConfig {
    /// Returns the effective worker count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or(self.concurrency)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            workers: None,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Accept header sent with every request
    pub accept: String,

    /// Accept-Language header sent with every request
    pub accept_language: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
