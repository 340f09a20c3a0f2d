//! Core traits for credentials, storage, and distributed locking.

mod credential;
mod lock;
mod storage;
pub mod testable;

pub mod rotation;

pub use credential::Credential;
pub use lock::{DistributedLock, LockError, LockGuard};
pub use rotation::RotatableCredential;
pub use storage::{StateStore, StateVersion, StorageProvider};
pub use testable::TestableCredential;
