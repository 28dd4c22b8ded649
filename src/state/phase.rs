//! Crawl lifecycle definitions
//!
//! A crawl moves strictly forward through these phases; the coordinator
//! refuses any other transition.
use serde::Serialize;
use std::fmt;

/// Represents the current phase of one crawl invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlPhase {
    /// Coordinator created, nothing scheduled yet
    Idle,

    /// Seed is being normalized, reserved and queued
    Seeding,

    /// Workers are pulling pages from the queue
    Running,

    /// A stop condition fired; waiting for in-flight work to finish
    Draining,

    /// All workers exited and the result set is final
    Terminated,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// Seeding may jump straight to Terminated when there is nothing to crawl.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Seeding)
                | (Self::Seeding, Self::Running)
                | (Self::Seeding, Self::Terminated)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Terminated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Queue empty and nothing in flight
    Drained,

    /// The max-pages limit was reached
    MaxPages,

    /// The caller signalled an interrupt
    Interrupted,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drained => "drained",
            Self::MaxPages => "max_pages",
            Self::Interrupted => "interrupted",
        }
    }

    /// Returns true if the crawl ended before the site was exhausted
    pub fn is_early(&self) -> bool {
        !matches!(self, Self::Drained)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
