//! Bounded-concurrency admission for query execution.
//!
//! Caps how many query items are simultaneously awaiting their external
//! calls. Admission is FIFO (tokio's semaphore is fair), and a failing
//! task releases its permit like any other; one item's failure never
//! affects admission of its siblings.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::error::ResearchError;

/// FIFO concurrency cap over asynchronous tasks.
///
/// An explicit instance is passed into the orchestration call so tests
/// and callers can hold independent limiters; there is no process-wide
/// singleton.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    /// Creates a limiter admitting at most `limit` concurrent tasks.
    ///
    /// `limit` must be at least 1; the config layer validates this before
    /// a limiter is constructed.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit.max(1))),
        }
    }

    /// Runs `task` once a slot is free, holding the slot until the task
    /// completes (successfully or not).
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Orchestration`] if the limiter was closed
    /// (cannot happen during a normal session).
    pub async fn run<T>(&self, task: impl Future<Output = T>) -> Result<T, ResearchError> {
        let _permit = Arc::clone(&self.semaphore).acquire_owned().await.map_err(
            |e| ResearchError::Orchestration {
                message: format!("semaphore acquire failed: {e}"),
            },
        )?;
        Ok(task.await)
    }
}
