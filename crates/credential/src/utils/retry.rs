//! Retry policy for storage and provider operations.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff policy for retrying a fallible async operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_multiplier: f64,
    /// Upper bound on the delay between attempts.
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait before attempt number `attempt` (0-indexed, 0 = first retry).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}

/// Runs `operation` until it succeeds or `policy`'s attempt budget is exhausted.
pub async fn retry_with_policy<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(err);
                }
                tokio::time::sleep(policy.delay_for(attempt - 1)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_until_success() {
        let policy = RetryPolicy { max_attempts: 5, initial_delay: Duration::from_millis(1), backoff_multiplier: 1.0, max_delay: Duration::from_millis(5) };
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry_with_policy(&policy, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 { Err("not yet") } else { Ok(n) }
        }).await;
        assert_eq!(result, Ok(2));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy { max_attempts: 2, initial_delay: Duration::from_millis(1), backoff_multiplier: 1.0, max_delay: Duration::from_millis(5) };
        let result: Result<(), &str> = retry_with_policy(&policy, || async { Err("always fails") }).await;
        assert_eq!(result, Err("always fails"));
    }
}
