//! Cooperative cancellation for in-flight pattern operations.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::ResilienceError;
use super::result::ResilienceResult;

/// Cheaply cloneable cancellation flag threaded through a pattern's `execute`.
///
/// Checked once before the operation starts; patterns that need to observe
/// cancellation mid-flight (e.g. during a sleep) should poll [`Self::is_cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancellationContext {
    cancelled: Arc<AtomicBool>,
}

impl CancellationContext {
    /// Creates a context that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if [`Self::cancel`] has been called on this context or a clone of it.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Marks this context (and every clone sharing its flag) as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Runs `operation` unless the context was already cancelled.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> ResilienceResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ResilienceResult<T>>,
    {
        if self.is_cancelled() {
            return Err(ResilienceError::Cancelled);
        }
        operation().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn uncancelled_context_runs_operation() {
        let ctx = CancellationContext::new();
        let result = ctx.execute(|| async { Ok::<_, ResilienceError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let ctx = CancellationContext::new();
        ctx.cancel();
        let result = ctx.execute(|| async { Ok::<_, ResilienceError>(42) }).await;
        assert!(matches!(result, Err(ResilienceError::Cancelled)));
    }

    #[test]
    fn clone_shares_cancellation_flag() {
        let ctx = CancellationContext::new();
        let clone = ctx.clone();
        clone.cancel();
        assert!(ctx.is_cancelled());
    }
}
