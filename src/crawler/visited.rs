//! Visited registry
//!
//! Tracks every target that has been scheduled during one crawl. The only
//! mutating operation is [`VisitedRegistry::try_reserve`], a single atomic
//! check-and-insert, so two workers discovering the same link can never both
//! enqueue it.

use crate::url::CrawlTarget;
use dashmap::DashSet;

/// Set of targets already enqueued (not necessarily fetched yet)
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    reserved: DashSet<CrawlTarget>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a target for fetching
    ///
    /// Returns true iff this call performed the insertion, i.e. the caller won
    /// the right to enqueue the target. Every later call for an equal target
    /// returns false.
    pub fn try_reserve(&self, target: &CrawlTarget) -> bool {
        self.reserved.insert(target.clone())
    }

    /// Number of targets reserved so far
    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::normalize_url;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn target(url: &str) -> CrawlTarget {
        normalize_url(url).unwrap()
    }

    #[test]
    fn test_first_reservation_wins() {
        let registry = VisitedRegistry::new();
        assert!(registry.try_reserve(&target("https://example.com/a")));
        assert!(!registry.try_reserve(&target("https://example.com/a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_equivalent_targets_share_a_reservation() {
        let registry = VisitedRegistry::new();
        assert!(registry.try_reserve(&target("https://example.com/a/")));
        assert!(!registry.try_reserve(&target("https://example.com/a#top")));
    }

    #[test]
    fn test_distinct_targets() {
        let registry = VisitedRegistry::new();
        assert!(registry.try_reserve(&target("https://example.com/a")));
        assert!(registry.try_reserve(&target("https://example.com/b")));
        assert!(registry.try_reserve(&target("https://example.com/a?x=1")));
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reservations_single_winner() {
        let registry = Arc::new(VisitedRegistry::new());
        let winners = Arc::new(AtomicUsize::new(0));
        let contested = target("https://example.com/contested");

        let mut handles = Vec::new();
        for _ in 0..64 {
            let registry = registry.clone();
            let winners = winners.clone();
            let contested = contested.clone();
            handles.push(tokio::spawn(async move {
                if registry.try_reserve(&contested) {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn exactly_one_thread_wins_each_target(
            paths in proptest::collection::vec("[a-c]{1,2}", 1..12),
            threads in 2usize..8,
        ) {
            let registry = Arc::new(VisitedRegistry::new());
            let wins = Arc::new(AtomicUsize::new(0));

            std::thread::scope(|scope| {
                for _ in 0..threads {
                    let registry = registry.clone();
                    let wins = wins.clone();
                    let paths = &paths;
                    scope.spawn(move || {
                        for path in paths {
                            let t = target(&format!("https://example.com/{}", path));
                            if registry.try_reserve(&t) {
                                wins.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                    });
                }
            });

            let distinct: std::collections::HashSet<_> = paths.iter().collect();
            prop_assert_eq!(wins.load(Ordering::SeqCst), distinct.len());
            prop_assert_eq!(registry.len(), distinct.len());
        }
    }
}
