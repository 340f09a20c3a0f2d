//! Retry with exponential backoff and jitter.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    ResilienceError, ResilienceResult,
    cancellation::CancellationContext,
    config::{ConfigResult, ResilienceConfig},
};

/// Configuration for [`retry`]: how many attempts, how long to wait between
/// them, and how aggressively the wait grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on the computed delay, regardless of backoff growth.
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
    /// Fraction of the computed delay randomized away, in `[0.0, 1.0]`.
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter_fraction: 0.2,
        }
    }
}

impl RetryConfig {
    /// Computes the delay before attempt number `attempt` (1-indexed: the
    /// delay awaited before the *second* attempt is `delay_for(1)`).
    #[must_use]
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let growth = self.backoff_multiplier.powi(exponent);
        let raw_ms = (self.base_delay.as_millis() as f64 * growth).min(self.max_delay.as_millis() as f64);

        let jitter_span = raw_ms * self.jitter_fraction;
        let jittered_ms = if jitter_span > 0.0 {
            raw_ms - jitter_span + fastrand::f64() * (2.0 * jitter_span)
        } else {
            raw_ms
        };

        Duration::from_millis(jittered_ms.max(0.0) as u64)
    }
}

impl ResilienceConfig for RetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        use crate::core::config::ConfigError;

        if self.max_attempts == 0 {
            return Err(ConfigError::validation("max_attempts must be greater than zero"));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(ConfigError::validation("backoff_multiplier must be at least 1.0"));
        }
        if !(0.0..=1.0).contains(&self.jitter_fraction) {
            return Err(ConfigError::validation("jitter_fraction must be between 0.0 and 1.0"));
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::validation("max_delay must be at least base_delay"));
        }
        Ok(())
    }

    fn default_config() -> Self {
        Self::default()
    }

    fn merge(&mut self, other: Self) {
        self.max_attempts = self.max_attempts.max(other.max_attempts);
        self.base_delay = self.base_delay.max(other.base_delay);
        self.max_delay = self.max_delay.max(other.max_delay);
    }
}

/// Decides, given an error, whether another attempt should be made.
pub trait RetryPolicy<E> {
    /// Returns `true` if `error` is worth retrying.
    fn should_retry(&self, error: &E) -> bool;
}

/// Retries on any error. The default policy for callers that don't need
/// finer-grained classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryAlways;

impl<E> RetryPolicy<E> for RetryAlways {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// Runs `operation` up to `config.max_attempts` times, sleeping with
/// exponential backoff and jitter between attempts, until it succeeds, the
/// policy rejects an error as non-retryable, or attempts are exhausted.
pub async fn retry<T, E, F, Fut>(
    config: &RetryConfig,
    policy: &impl RetryPolicy<E>,
    operation: F,
) -> ResilienceResult<T>
where
    E: std::error::Error + Send + Sync + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_cancellable(config, policy, &CancellationContext::new(), operation).await
}

/// Like [`retry`], but checks `cancellation` before each attempt and aborts
/// early with [`ResilienceError::Cancelled`] if it has been signalled.
pub async fn retry_cancellable<T, E, F, Fut>(
    config: &RetryConfig,
    policy: &impl RetryPolicy<E>,
    cancellation: &CancellationContext,
    mut operation: F,
) -> ResilienceResult<T>
where
    E: std::error::Error + Send + Sync + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1usize;
    loop {
        if cancellation.is_cancelled() {
            return Err(ResilienceError::Cancelled);
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let retryable = policy.should_retry(&error);
                if !retryable || attempt >= config.max_attempts {
                    warn!(attempt, max_attempts = config.max_attempts, %error, "retry exhausted");
                    return Err(ResilienceError::RetriesExhausted {
                        attempts: attempt,
                        last_error: Box::new(error),
                    });
                }

                let delay = config.delay_for(attempt);
                debug!(attempt, ?delay, %error, "retrying after failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

impl fmt::Display for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RetryConfig(max_attempts={}, base_delay={:?}, multiplier={})",
            self.max_attempts, self.base_delay, self.backoff_multiplier
        )
    }
}
