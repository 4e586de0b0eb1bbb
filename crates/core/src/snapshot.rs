//! Latest snapshot cell
//!
//! Written only by the update loop, read by anyone. The stored value is an
//! `Arc` swapped in one step, so a reader sees either the previous snapshot
//! or the new one in full.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Most recently sampled snapshot
pub struct LatestSnapshot<T> {
    slot: RwLock<Option<Arc<T>>>,
    samples: AtomicU64,
}

impl<T> LatestSnapshot<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
            samples: AtomicU64::new(0),
        }
    }

    /// Replace the stored snapshot
    ///
    /// Returns the sample number (1 for the first stored snapshot).
    pub fn store(&self, snapshot: T) -> u64 {
        let snapshot = Arc::new(snapshot);
        // Drop the previous value after releasing the lock
        let _previous = self.slot.write().replace(snapshot);
        self.samples.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// The latest snapshot, or `None` before the first sample
    pub fn latest(&self) -> Option<Arc<T>> {
        self.slot.read().clone()
    }

    /// Number of snapshots stored so far
    pub fn sample_count(&self) -> u64 {
        self.samples.load(Ordering::Acquire)
    }
}

impl<T> Default for LatestSnapshot<T> {
    fn default() -> Self {
        Self::new()
    }
}
