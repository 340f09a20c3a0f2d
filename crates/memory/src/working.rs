//! Working memory: ephemeral, in-process, capped at a short TTL.
//!
//! Scratch space for a single execution — intermediate reasoning, the
//! current turn's tool results, anything that should vanish once the
//! workflow run that produced it finishes.

use std::time::Duration;

use crate::tier::{InMemoryTier, TierLimits};

/// Entries older than this are dropped regardless of what TTL was asked
/// for — working memory is never allowed to become durable.
pub const MAX_TTL: Duration = Duration::from_secs(30 * 60);

/// Construct the working-memory tier.
#[must_use]
pub fn working_tier() -> InMemoryTier {
    InMemoryTier::new(TierLimits::ttl(MAX_TTL))
}
