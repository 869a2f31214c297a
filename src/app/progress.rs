//! Advisory batch progress counter.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide `(current, total)` pair for the running batch.
///
/// Updated only by the orchestrator after it collects completed tasks;
/// readers may observe stale or skipped intermediate values. The counter
/// is advisory UI feedback, not part of the correctness contract.
#[derive(Debug, Default)]
pub struct Progress {
    current: AtomicUsize,
    total: AtomicUsize,
}

impl Progress {
    /// Create an idle counter at `(0, 0)`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new batch of `total` tasks.
    pub fn begin(&self, total: usize) {
        self.current.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Record that `current` tasks have completed.
    pub fn update(&self, current: usize) {
        self.current.store(current, Ordering::Relaxed);
    }

    /// Force the counter to `(total, total)`.
    pub fn finish(&self) {
        self.current
            .store(self.total.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Read the current `(current, total)` pair.
    #[must_use]
    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.current.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}
