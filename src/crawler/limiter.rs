//! Concurrency limiter
//!
//! A counting permit pool bounding the number of simultaneous fetches. A
//! permit is released when it is dropped, so it cannot leak on an error path.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Permit pool sized to the configured fetch concurrency
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max: usize,
}

/// Scoped permit for one fetch
#[derive(Debug)]
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    pub fn new(max: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
        }
    }

    /// Waits for a free permit
    ///
    /// Only the calling worker is suspended while all permits are held.
    /// Returns None if the pool has been closed.
    pub async fn acquire(&self) -> Option<FetchPermit> {
        let permit = self.semaphore.clone().acquire_owned().await.ok()?;
        Some(FetchPermit { _permit: permit })
    }

    /// Number of permits currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Total number of permits
    pub fn max(&self) -> usize {
        self.max
    }
}
