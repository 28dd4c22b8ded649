//! Sitewalk: a concurrent single-host web crawler
//!
//! Given a seed URL, this crate visits every page reachable on the same host,
//! recording each page alongside the links discovered on it. Concurrency is
//! bounded, per-page failures are recorded rather than fatal, and partial
//! results survive a max-pages cutoff or a user interrupt.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitewalk operations
///
/// Only failures that prevent a crawl from starting end up here. Failures of
/// individual pages are recorded on their [`crawler::PageResult`] instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL '{0}' is missing a protocol")]
    MissingProtocol(String),

    #[error("Unsupported URL scheme '{0}', only 'http' and 'https' are supported")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("URL {url} is outside of host {host}")]
    OutOfDomain { url: String, host: String },
}

/// Result type alias for Sitewalk operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    crawl_site, crawl_site_with_progress, CrawlReport, Coordinator, PageError, PageResult,
};
pub use state::{CrawlPhase, StopReason};
pub use crate::url::{normalize_url, parse_seed, CrawlTarget, DomainScope};
