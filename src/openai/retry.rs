//! Retry logic with exponential backoff for assistant service calls

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::core::AssistantError;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: usize,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Never retries, useful for tests that count calls
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

/// Runs `operation` until it succeeds, fails with a non-transient
/// error, or runs out of attempts.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, AssistantError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AssistantError>>,
{
    let mut attempts = 0;
    let mut backoff = config.initial_backoff;

    loop {
        attempts += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => {
                if attempts >= config.max_attempts {
                    warn!(
                        "{} failed after {} attempts: {}",
                        operation_name, attempts, err
                    );
                    return Err(err);
                }

                warn!(
                    "{} attempt {}/{} failed: {}. Retrying in {:?}...",
                    operation_name, attempts, config.max_attempts, err, backoff
                );

                sleep(backoff).await;

                backoff = Duration::from_secs_f64(
                    (backoff.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_backoff.as_secs_f64()),
                );
            }
        }
    }
}
