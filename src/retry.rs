//! Retry policy for NCBI requests
//!
//! Transient failures (timeouts, 5xx, 429) are retried with exponential
//! backoff. Anything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

/// Errors that know whether another attempt could succeed
pub trait RetryableError {
    fn is_retryable(&self) -> bool;

    /// Short human-readable cause, used in logs
    fn retry_reason(&self) -> &str;
}

/// Backoff settings for [`with_retry`]
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: usize,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Randomize delays to avoid synchronized retries
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never retry
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delay sequence: initial, 2x initial, 4x initial, ... capped at `max_delay`
    fn delays(&self) -> Vec<Duration> {
        // ExponentialBackoff yields base^n * factor, so base 2 with factor
        // initial/2 starts the sequence at `initial_delay`.
        let factor = (self.initial_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .map(|delay| if self.use_jitter { jitter(delay) } else { delay })
            .take(self.max_retries)
            .collect()
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the retry budget is spent.
pub async fn with_retry<T, E, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    let mut attempt = 0usize;
    let result = RetryIf::start(
        config.delays(),
        || {
            attempt += 1;
            debug!(attempt, operation = operation_name, "Attempting operation");
            operation()
        },
        |err: &E| {
            if err.is_retryable() {
                warn!(
                    operation = operation_name,
                    reason = err.retry_reason(),
                    error = %err,
                    "Transient failure, retrying"
                );
                true
            } else {
                debug!(
                    operation = operation_name,
                    reason = err.retry_reason(),
                    "Non-retryable failure"
                );
                false
            }
        },
    )
    .await;

    if let Err(err) = &result {
        warn!(operation = operation_name, error = %err, "Operation failed");
    }

    result
}
