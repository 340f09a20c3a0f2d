//! Procedural memory: durable, keyed by task signature, for patterns a
//! workflow learned about how to accomplish a recurring kind of task
//! (which tool worked, what parameters it needed) rather than any single
//! run's transient state.

use crate::tier::{InMemoryTier, TierLimits};

/// Construct the procedural-memory tier. Entries never expire on their
/// own; callers evict explicitly via `delete`/`clear` when a learned
/// pattern is superseded.
#[must_use]
pub fn procedural_tier() -> InMemoryTier {
    InMemoryTier::new(TierLimits::durable())
}

/// Derive the stable key a learned pattern is stored under from a task's
/// signature — its kind plus the shape of its input, so two calls with the
/// same intent land on the same row regardless of incidental parameter
/// values.
#[must_use]
pub fn task_signature(task_kind: &str, input_shape: &str) -> String {
    format!("{task_kind}:{input_shape}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_for_same_inputs() {
        assert_eq!(
            task_signature("http_call", "{method,url}"),
            task_signature("http_call", "{method,url}")
        );
    }
}
