//! Live progress aggregation shared across concurrent query tasks.
//!
//! A single [`ProgressTracker`] per session holds the mutable
//! [`ResearchProgress`] behind a mutex. Concurrent executors publish
//! partial updates; each merge synchronously notifies the registered
//! observer with a snapshot. Counter advancement goes through guarded
//! read-modify-write methods so the monotonic invariants hold under
//! parallel execution.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

/// Point-in-time progress of a research session.
///
/// `current_query` is best-effort: under concurrency it reflects the last
/// merge to land and is not causally ordered against the counters in the
/// same snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchProgress {
    /// Depth currently being executed (1-based).
    pub current_depth: usize,
    /// The session's depth bound, fixed at start.
    pub total_depth: usize,
    /// Query text of the most recently dispatched item.
    pub current_query: Option<String>,
    /// Total items discovered so far (seeds plus follow-ups).
    pub total_queries: usize,
    /// Items that have settled, success or failure.
    pub completed_queries: usize,
}

/// Partial progress update; absent fields leave the current value unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProgressUpdate {
    /// New current depth.
    pub current_depth: Option<usize>,
    /// New current query text.
    pub current_query: Option<String>,
}

/// Observer invoked synchronously with a snapshot after every merge.
pub type ProgressObserver = Box<dyn Fn(&ResearchProgress) + Send + Sync>;

/// Guarded holder of the session's shared progress state.
pub struct ProgressTracker {
    inner: Mutex<ResearchProgress>,
    observer: Option<ProgressObserver>,
}

impl ProgressTracker {
    /// Creates a tracker for a session with the given depth bound and
    /// seed frontier size.
    #[must_use]
    pub fn new(total_depth: usize, total_queries: usize, observer: Option<ProgressObserver>) -> Self {
        Self {
            inner: Mutex::new(ResearchProgress {
                current_depth: 1,
                total_depth,
                current_query: None,
                total_queries,
                completed_queries: 0,
            }),
            observer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResearchProgress> {
        // A poisoned lock only means a panicking task held it; the
        // counters inside remain valid.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merges the provided fields into the shared progress and notifies
    /// the observer. Fields left `None` are unchanged; last merge wins
    /// per field.
    ///
    /// The observer runs while the tracker is locked, so notifications
    /// are totally ordered; observers must not call back into the
    /// tracker.
    pub fn report(&self, update: ProgressUpdate) {
        let mut progress = self.lock();
        if let Some(depth) = update.current_depth {
            progress.current_depth = depth;
        }
        if let Some(query) = update.current_query {
            progress.current_query = Some(query);
        }
        self.notify(&progress);
    }

    /// Records one settled item (success or failure).
    pub fn complete_one(&self) {
        let mut progress = self.lock();
        progress.completed_queries += 1;
        debug_assert!(progress.completed_queries <= progress.total_queries);
        self.notify(&progress);
    }

    /// Records `n` newly discovered items.
    pub fn extend_total(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut progress = self.lock();
        progress.total_queries += n;
        self.notify(&progress);
    }

    /// Returns a snapshot of the current progress.
    #[must_use]
    pub fn snapshot(&self) -> ResearchProgress {
        self.lock().clone()
    }

    fn notify(&self, snapshot: &ResearchProgress) {
        if let Some(ref observer) = self.observer {
            observer(snapshot);
        }
    }
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("progress", &self.snapshot())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
