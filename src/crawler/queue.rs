//! Work queue with drain detection
//!
//! An unbounded FIFO of targets plus a count of items that workers have popped
//! but not finished. The queue is drained when it is empty and nothing is in
//! flight; because new targets are only pushed while processing a popped one,
//! a drained queue can never refill and every waiting worker is released.
//!
//! The mutex guarding the state is held only for the push/pop/complete
//! bookkeeping itself, never across an await.

use crate::url::CrawlTarget;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<CrawlTarget>,
    in_flight: usize,
}

impl QueueState {
    fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_flight == 0
    }
}

/// Unbounded FIFO of pending targets shared by all workers
#[derive(Debug)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    changed: Notify,
    stop: CancellationToken,
}

/// A target popped from the queue and not yet fully processed
///
/// Dropping the guard marks the item complete, so the in-flight count is
/// decremented on every exit path of the worker, including early returns.
#[derive(Debug)]
pub struct InFlight<'a> {
    target: CrawlTarget,
    queue: &'a WorkQueue,
}

impl InFlight<'_> {
    pub fn target(&self) -> &CrawlTarget {
        &self.target
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.queue.complete();
    }
}

impl WorkQueue {
    /// Creates an empty queue that closes when `stop` is cancelled
    pub fn new(stop: CancellationToken) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            changed: Notify::new(),
            stop,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a target onto the back of the queue
    ///
    /// Never blocks. Returns false without enqueuing once the queue is closed.
    pub fn push(&self, target: CrawlTarget) -> bool {
        if self.stop.is_cancelled() {
            tracing::trace!("Queue closed, dropping {}", target);
            return false;
        }

        self.lock().pending.push_back(target);
        self.changed.notify_waiters();
        true
    }

    /// Pops the next target, waiting until one is available
    ///
    /// Returns None once the queue is drained or closed. A successful pop
    /// counts as in flight until the returned guard is dropped.
    pub async fn pop(&self) -> Option<InFlight<'_>> {
        loop {
            // Registered before the state check so a push in between is not missed
            let notified = self.changed.notified();

            if self.stop.is_cancelled() {
                return None;
            }

            {
                let mut state = self.lock();
                if let Some(target) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Some(InFlight {
                        target,
                        queue: self,
                    });
                }
                if state.in_flight == 0 {
                    return None;
                }
            }

            tokio::select! {
                _ = notified => {}
                _ = self.stop.cancelled() => return None,
            }
        }
    }

    /// Marks one popped item as fully processed
    fn complete(&self) {
        let drained = {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.is_drained()
        };

        if drained {
            tracing::debug!("Work queue drained");
            self.changed.notify_waiters();
        }
    }

    /// Closes the queue: pending and future pops return None
    pub fn close(&self) {
        self.stop.cancel();
        self.changed.notify_waiters();
    }

    /// Returns true when the queue is empty and nothing is in flight
    pub fn is_drained(&self) -> bool {
        self.lock().is_drained()
    }

    /// Resolves once the queue is drained
    ///
    /// The condition is re-checked every time the in-flight count reaches
    /// zero, so this is the natural-completion watcher for the coordinator.
    pub async fn wait_drained(&self) {
        loop {
            let notified = self.changed.notified();
            if self.is_drained() {
                return;
            }
            notified.await;
        }
    }

    /// Number of targets waiting to be popped
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Number of targets popped but not completed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}
