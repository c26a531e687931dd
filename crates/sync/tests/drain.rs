//! Convergence, stall-abort, and safety-limit behavior of `drain`.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use vitrine_sync::{
    drain, DrainReport, RemovableCollection, SyncError, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT,
};

/// In-memory collection with a configurable per-removal effect, mimicking a
/// remote cart where deletions sometimes fail to land.
struct MockCart {
    size: AtomicUsize,
    removals: AtomicUsize,
    /// Whether the n-th `remove_first` call (0-based) actually takes effect.
    effective: Box<dyn Fn(usize) -> bool + Send + Sync>,
}

impl MockCart {
    fn new(size: usize) -> Self {
        Self::with_effect(size, |_| true)
    }

    fn with_effect(size: usize, effective: impl Fn(usize) -> bool + Send + Sync + 'static) -> Self {
        Self {
            size: AtomicUsize::new(size),
            removals: AtomicUsize::new(0),
            effective: Box::new(effective),
        }
    }

    fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemovableCollection for MockCart {
    async fn size(&self) -> vitrine_sync::Result<usize> {
        Ok(self.size.load(Ordering::SeqCst))
    }

    async fn remove_first(&self) -> vitrine_sync::Result<()> {
        let n = self.removals.fetch_add(1, Ordering::SeqCst);
        if (self.effective)(n) && self.size.load(Ordering::SeqCst) > 0 {
            self.size.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Collection whose size cannot even be observed.
struct UnreachableCart;

#[async_trait]
impl RemovableCollection for UnreachableCart {
    async fn size(&self) -> vitrine_sync::Result<usize> {
        Err(SyncError::Session("cart table unreachable".into()))
    }

    async fn remove_first(&self) -> vitrine_sync::Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn drains_to_empty_in_size_attempts() {
    let cart = MockCart::new(3);
    let report = drain(&cart, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT)
        .await
        .unwrap();

    assert_eq!(report, DrainReport::Drained);
    assert_eq!(cart.removals(), 3);
    assert_eq!(cart.size().await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn empty_collection_is_already_drained() {
    let cart = MockCart::new(0);
    let report = drain(&cart, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT)
        .await
        .unwrap();

    assert_eq!(report, DrainReport::Drained);
    assert_eq!(cart.removals(), 0);
}

#[tokio::test(start_paused = true)]
async fn second_removal_never_landing_stalls_at_one() {
    // First removal works (2 -> 1), every later one is swallowed.
    let cart = MockCart::with_effect(2, |n| n == 0);
    let report = drain(&cart, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT)
        .await
        .unwrap();

    assert_eq!(report, DrainReport::StalledAt { size: 1 });
}

#[tokio::test(start_paused = true)]
async fn never_landing_removals_abort_after_stall_limit() {
    let cart = MockCart::with_effect(4, |_| false);
    let report = drain(&cart, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT)
        .await
        .unwrap();

    assert_eq!(report, DrainReport::StalledAt { size: 4 });
    // Exactly stall_limit attempts, never an unbounded loop.
    assert_eq!(cart.removals(), DEFAULT_STALL_LIMIT as usize);
}

#[tokio::test(start_paused = true)]
async fn oversized_collection_is_refused_untouched() {
    let cart = MockCart::new(15);
    let report = drain(&cart, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT)
        .await
        .unwrap();

    assert_eq!(
        report,
        DrainReport::SkippedTooLarge {
            size: 15,
            safety_limit: DEFAULT_SAFETY_LIMIT
        }
    );
    assert_eq!(cart.removals(), 0);
    assert_eq!(cart.size().await.unwrap(), 15);
}

#[tokio::test(start_paused = true)]
async fn exhausted_budget_reports_residual_size() {
    // Every other removal is swallowed: progress keeps resetting the stall
    // counter, so the attempt budget (size + 2) runs out first.
    let cart = MockCart::with_effect(3, |n| n % 2 == 1);
    let report = drain(&cart, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT)
        .await
        .unwrap();

    assert_eq!(report, DrainReport::IncompleteAt { size: 1 });
    assert_eq!(cart.removals(), 5);
}

#[tokio::test(start_paused = true)]
async fn session_failure_propagates_as_error() {
    let err = drain(&UnreachableCart, DEFAULT_SAFETY_LIMIT, DEFAULT_STALL_LIMIT)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Session(_)));
}
