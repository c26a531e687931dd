//! Bounded convergence retry: empty a remote collection whose size settles
//! asynchronously and may fail to decrease.

use tracing::{debug, warn};

use crate::channel::RemovableCollection;
use crate::error::Result;

/// Collections larger than this are refused outright. Protects state leaked
/// from a prior logical session from being destroyed by accident.
pub const DEFAULT_SAFETY_LIMIT: usize = 10;

/// Consecutive non-progress attempts tolerated before aborting.
pub const DEFAULT_STALL_LIMIT: u32 = 2;

/// Outcome of a [`drain`] run.
///
/// Partial failure is a reported value, never an error: "the collection was
/// not fully cleared" is an expected, testable condition the caller asserts
/// on, not a malfunction of the drain itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainReport {
    /// The collection reached size zero.
    Drained,
    /// The collection exceeded the safety limit; nothing was removed.
    SkippedTooLarge { size: usize, safety_limit: usize },
    /// Removal stopped making progress for `stall_limit` consecutive
    /// attempts.
    StalledAt { size: usize },
    /// The attempt budget ran out with items remaining.
    IncompleteAt { size: usize },
}

impl DrainReport {
    pub fn is_drained(&self) -> bool {
        matches!(self, DrainReport::Drained)
    }
}

/// Repeatedly remove the first element of `collection` until it is empty.
///
/// The loop re-measures size after every attempt (with a settle wait in
/// between, since removals are not reflected immediately) and terminates when
/// the collection is empty, when `stall_limit` consecutive attempts make no
/// progress, or when the attempt budget of `initial size + 2` is exhausted,
/// whichever comes first. The slack of two tolerates one stall without
/// failing outright.
///
/// Session-level failures (a size query or removal that cannot be performed
/// at all) propagate as errors.
pub async fn drain<C>(collection: &C, safety_limit: usize, stall_limit: u32) -> Result<DrainReport>
where
    C: RemovableCollection + ?Sized,
{
    let initial = collection.size().await?;
    if initial > safety_limit {
        warn!(size = initial, safety_limit, "collection exceeds safety limit, refusing to drain");
        return Ok(DrainReport::SkippedTooLarge {
            size: initial,
            safety_limit,
        });
    }
    if initial == 0 {
        return Ok(DrainReport::Drained);
    }

    let mut budget = initial + 2;
    let mut consecutive_stalls: u32 = 0;
    let mut size = initial;

    while size > 0 && budget > 0 {
        let size_before = collection.size().await?;
        collection.remove_first().await?;
        collection.settle().await;
        let size_after = collection.size().await?;

        if size_after >= size_before {
            consecutive_stalls += 1;
            debug!(size_before, size_after, consecutive_stalls, "removal made no progress");
            if consecutive_stalls >= stall_limit {
                warn!(size = size_after, "drain stalled");
                return Ok(DrainReport::StalledAt { size: size_after });
            }
        } else {
            consecutive_stalls = 0;
        }

        size = size_after;
        budget -= 1;
    }

    // Re-query once more so the report reflects the remote state rather than
    // loop bookkeeping.
    let final_size = collection.size().await?;
    if final_size > 0 {
        warn!(remaining = final_size, "drain incomplete");
        return Ok(DrainReport::IncompleteAt { size: final_size });
    }
    debug!(removed = initial, "collection drained");
    Ok(DrainReport::Drained)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_predicates() {
        assert!(DrainReport::Drained.is_drained());
        assert!(!DrainReport::StalledAt { size: 1 }.is_drained());
        assert!(!DrainReport::IncompleteAt { size: 3 }.is_drained());
    }
}
