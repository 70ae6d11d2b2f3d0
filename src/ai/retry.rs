use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;

/// Exponential backoff: `retries` extra attempts, the wait doubling after each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.retries, config.initial_delay())
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, initial_delay: Duration) -> Self {
        Self { retries, initial_delay }
    }

    /// Run `op`, retrying every failure until the budget is spent.
    /// The last error is returned unchanged.
    pub async fn run<T, E, F, Fut>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_when(op, |_| true).await
    }

    /// Like `run`, but only errors accepted by `retryable` are retried
    pub async fn run_when<T, E, F, Fut, P>(&self, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut remaining = self.retries;
        let mut delay = self.initial_delay;
        let mut attempt = 1u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if remaining == 0 || !retryable(&err) => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        "attempt {} failed: {}; retrying in {:?} ({} left)",
                        attempt,
                        err,
                        delay,
                        remaining
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    remaining -= 1;
                    attempt += 1;
                }
            }
        }
    }
}
