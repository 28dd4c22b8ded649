//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: The coordinator's lifecycle (idle, seeding, running, draining, terminated)
//! - `StopReason`: Which termination path ended the crawl

mod phase;

// Re-export main types
pub use phase::{CrawlPhase, StopReason};
