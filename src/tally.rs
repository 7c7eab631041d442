//! Process-wide outcome counters shared by all workers of one run.
//!
//! Each worker combines its local counts exactly once, so contention is
//! bounded by the worker count regardless of the sample count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::worker::WorkerResult;

pub trait Tally: Send + Sync {
    /// Fold one worker's final counts into the tally.
    fn combine(&self, result: &WorkerResult);

    fn totals(&self) -> WorkerResult;
}

#[derive(Debug, Default)]
pub struct AtomicTally {
    true_count: AtomicU64,
    false_count: AtomicU64,
}

impl Tally for AtomicTally {
    fn combine(&self, result: &WorkerResult) {
        // Relaxed: the join barrier orders these before the final read.
        self.true_count.fetch_add(result.true_count, Ordering::Relaxed);
        self.false_count.fetch_add(result.false_count, Ordering::Relaxed);
    }

    fn totals(&self) -> WorkerResult {
        WorkerResult::new(
            self.true_count.load(Ordering::Relaxed),
            self.false_count.load(Ordering::Relaxed),
        )
    }
}

/// Mutex-guarded variant; same result, one lock acquisition per worker.
#[derive(Debug, Default)]
pub struct LockedTally {
    counts: Mutex<WorkerResult>,
}

impl Tally for LockedTally {
    fn combine(&self, result: &WorkerResult) {
        // A poisoned lock only means another worker panicked mid-add of two
        // plain integers; the run is already failing, keep the counts.
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.true_count += result.true_count;
        counts.false_count += result.false_count;
    }

    fn totals(&self) -> WorkerResult {
        *self.counts.lock().unwrap_or_else(|e| e.into_inner())
    }
}
