//! Resource caps for a sandboxed code node (spec §4.8/§5: CPU/RSS/wall
//! limits, network denied by default, filesystem restricted to a tempdir).

use std::time::Duration;

/// OS-enforced resource caps applied to a single sandboxed snippet run.
#[derive(Debug, Clone)]
pub struct SandboxLimits {
    /// Maximum CPU seconds the process may consume (`RLIMIT_CPU` on Linux).
    pub cpu_seconds: u64,
    /// Maximum resident/address-space size in bytes (`RLIMIT_AS` on Linux).
    pub max_rss_bytes: u64,
    /// Wall-clock budget; the process is killed if it runs longer.
    pub wall_clock: Duration,
    /// Whether the snippet is allowed outbound network access.
    ///
    /// Denied by default. A `code` node only gets this set when its
    /// [`ActionMetadata`](nebula_action::ActionMetadata) declares the
    /// `requires_external_io` capability and the caller's granted
    /// capabilities permit it.
    pub allow_network: bool,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            cpu_seconds: 10,
            max_rss_bytes: 256 * 1024 * 1024,
            wall_clock: Duration::from_secs(30),
            allow_network: false,
        }
    }
}
