//! Distributed locking abstraction, used to serialize rotation across manager instances.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while acquiring or holding a distributed lock.
#[derive(Debug, Clone, Error)]
pub enum LockError {
    #[error("lock is held by another owner")]
    Contended,
    #[error("lock was lost before release (e.g. lease expired)")]
    Lost,
    #[error("lock backend error: {0}")]
    Backend(String),
}

/// A held lock, released either explicitly or on drop.
#[async_trait]
pub trait LockGuard: Send {
    /// Releases the lock, returning an error if the release itself failed
    /// (e.g. the lock had already expired).
    async fn release(self) -> Result<(), LockError>;
}

/// Distributed mutual exclusion, used to serialize credential rotation
/// across multiple manager instances.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Guard type returned on successful acquisition.
    type Guard: LockGuard;

    /// Acquires the lock for `key`, blocking until it is free or the
    /// implementation's own timeout elapses.
    async fn acquire(&self, key: &str, ttl: Duration) -> Result<Self::Guard, LockError>;

    /// Attempts to acquire the lock for `key` without blocking.
    async fn try_acquire(&self, key: &str, ttl: Duration) -> Result<Option<Self::Guard>, LockError>;
}
