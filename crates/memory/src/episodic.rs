//! Episodic memory: one run's history, retained for hours to days.
//!
//! Holds a workflow's conversation turns, tool calls, and node outputs
//! long enough to support a follow-up execution referencing "what we just
//! did" without needing the full working-memory context reloaded.
//!
//! The natural backend here is a fast external KV store; none is in this
//! workspace's dependency graph (no `redis`/`sled`/`rocksdb`), so this tier
//! runs on the same in-process map `working`/`procedural` use, same as
//! `nebula-execution`'s `ExecutionRepo` falls back to in-memory storage
//! when no external store is configured.

use std::time::Duration;

use crate::tier::{InMemoryTier, TierLimits};

/// Default retention for episodic entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Construct the episodic-memory tier.
#[must_use]
pub fn episodic_tier() -> InMemoryTier {
    InMemoryTier::new(TierLimits::ttl(DEFAULT_TTL))
}
