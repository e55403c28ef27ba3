//! Fixed-delay retry policy applied around fetch-and-format operations.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{MarketError, MarketResult};

/// Retry configuration: attempt count, fixed inter-attempt delay, and
/// whether not-found failures retry at all.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    /// The provider cannot tell a transient miss from a delisted
    /// symbol, so retrying not-found is a judgment call; kept
    /// configurable rather than guessed.
    pub retry_not_found: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_secs(1),
            retry_not_found: true,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, delay: Duration, retry_not_found: bool) -> Self {
        Self {
            max_attempts,
            delay,
            retry_not_found,
        }
    }

    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            retry_not_found: false,
        }
    }

    /// Short delay variant for tests.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_millis(1),
            retry_not_found: true,
        }
    }

    const fn is_retryable(&self, error: &MarketError) -> bool {
        match error {
            MarketError::NotFound(_) => self.retry_not_found,
            MarketError::Provider(_) | MarketError::EmptyProfile(_) => true,
        }
    }

    /// Runs `operation` up to `max_attempts` times, sleeping the fixed
    /// delay between attempts.
    ///
    /// # Errors
    /// Returns the last error once attempts are exhausted, or the
    /// first non-retryable error immediately.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> MarketResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = MarketResult<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            debug!(operation = operation_name, attempt, max = self.max_attempts, "attempt");
            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if !self.is_retryable(&err) {
                        debug!(operation = operation_name, error = %err, "not retryable");
                        return Err(err);
                    }
                    warn!(
                        operation = operation_name,
                        attempt,
                        max = self.max_attempts,
                        error = %err,
                        "attempt failed"
                    );
                    last_error = Some(err);
                    if attempt < self.max_attempts {
                        sleep(self.delay).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| MarketError::Provider("retry exhausted with no error".to_string())))
    }
}
