//! Bounded immediate retry for fallible async operations.
//!
//! Wraps the reasoning step of the query executor: up to `max_attempts`
//! invocations with no delay between them, returning the first success or
//! re-raising the final failure. Earlier failures are only logged.

use tracing::warn;

use crate::error::ResearchError;

/// Bounded immediate-retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// Creates a policy allowing up to `max_attempts` invocations.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Config`] if `max_attempts` is zero.
    pub fn new(max_attempts: u32) -> Result<Self, ResearchError> {
        if max_attempts == 0 {
            return Err(ResearchError::Config {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        Ok(Self { max_attempts })
    }

    /// The configured attempt bound.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Invokes `op` until it succeeds or the attempt bound is exhausted.
    ///
    /// Returns the first successful result immediately. On failure of the
    /// final attempt, re-raises that failure's error; earlier errors are
    /// logged and discarded. There is no delay between attempts.
    ///
    /// # Errors
    ///
    /// The error of the final failed attempt.
    pub async fn attempt<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ResearchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ResearchError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    warn!(label, attempt, max_attempts = self.max_attempts, %error, "attempt failed");
                    if attempt >= self.max_attempts {
                        return Err(error);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
