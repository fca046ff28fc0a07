//! Bounded exponential backoff for transient failures.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

/// Retry settings shared by page fetches and batch writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound of the delay between two attempts.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Run `operation` until it succeeds, fails with an error `is_retryable`
    /// rejects, or the attempts are exhausted. The last error is returned.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        is_retryable: impl Fn(&E) -> bool,
        mut attempt_fn: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.initial_delay;
        let mut attempt = 1;

        loop {
            match attempt_fn().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(operation, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if !is_retryable(&e) {
                        debug!(operation, error = %e, "Non-retryable error encountered");
                        return Err(e);
                    }
                    if attempt >= max_attempts {
                        warn!(operation, attempts = attempt, error = %e, "Giving up after retries");
                        return Err(e);
                    }

                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.max_delay);
                    attempt += 1;
                }
            }
        }
    }
}
