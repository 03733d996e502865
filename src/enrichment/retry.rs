//! Jittered retry for runner lookups.
//!
//! Each failed attempt sleeps for a uniformly random delay between the
//! configured bounds. Without `max_attempts` a lookup is retried until it
//! gets a response, which suits an offline batch run.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use super::domain::EnrichmentError;
use crate::config::RetryConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            min_delay: Duration::from_millis(config.min_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.min_delay_ms)),
            max_attempts: config.max_attempts,
        }
    }

    /// Random delay in `[min_delay, max_delay]`.
    pub fn jitter(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min..=max))
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }

    /// Run `operation` until it succeeds or fails with a non-retryable error.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, EnrichmentError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EnrichmentError>>,
    {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    if self.exhausted(attempts) {
                        return Err(EnrichmentError::RetriesExhausted {
                            attempts,
                            last: e.to_string(),
                        });
                    }
                    let delay = self.jitter();
                    tracing::debug!(label, attempts, ?delay, error = %e, "Retrying lookup");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
