//! URL handling module for Sitewalk
//!
//! This module provides the [`CrawlTarget`] type, URL normalization, seed
//! parsing and the host boundary ([`DomainScope`]) that keeps a crawl on a
//! single site.

mod domain;
mod normalize;
mod seed;
mod target;

// Re-export main types and functions
pub use domain::DomainScope;
pub use normalize::{normalize_url, SUPPORTED_SCHEMES};
pub use seed::{parse_seed, DEFAULT_SCHEME};
pub use target::CrawlTarget;
