//! Bounded retry for rate-limited remote calls.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::SyncResult;

/// Retry policy applied around every remote call.
///
/// Only rate-limit errors are retried. The wait between attempts is the
/// server's `Retry-After` hint, or `default_wait` when the hint is missing,
/// capped at `max_wait`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait used when the server gave no hint.
    pub default_wait: Duration,
    /// Upper bound on any single wait.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            default_wait: Duration::from_secs(10),
            max_wait: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and default wait.
    #[must_use]
    pub fn new(max_attempts: u32, default_wait: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            default_wait,
            ..Self::default()
        }
    }

    /// Wait before the next attempt after a rate-limit response.
    #[must_use]
    pub fn wait_for(&self, retry_after_secs: Option<u64>) -> Duration {
        retry_after_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_wait)
            .min(self.max_wait)
    }

    /// Run `f` until it succeeds, fails with a non-rate-limit error, or the
    /// attempt budget is spent.
    ///
    /// On exhaustion the last `RateLimited` error is returned unchanged, so
    /// callers see the last wait hint the server sent.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut f: F) -> SyncResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SyncResult<T>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            operation = operation_name,
                            attempt, "Operation succeeded after rate limiting"
                        );
                    }
                    return Ok(value);
                }
                Err(error) if error.is_rate_limited() => {
                    if attempt >= self.max_attempts {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            retry_after_secs = ?error.retry_after_secs(),
                            "Rate limit retry budget exhausted"
                        );
                        return Err(error);
                    }

                    let delay = self.wait_for(error.retry_after_secs());
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_secs = delay.as_secs(),
                        "Rate limit hit, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
