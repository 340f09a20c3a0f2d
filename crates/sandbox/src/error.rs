//! Sandbox-local error type, mapped to [`nebula_action::ActionError`] at the
//! [`SandboxRunner`](nebula_ports::SandboxRunner) boundary.

use std::time::Duration;

use nebula_action::ActionError;

/// Errors raised while preparing or running a sandboxed code snippet.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The node's `language` has no registered interpreter command.
    #[error("unsupported sandbox language `{0}`")]
    UnsupportedLanguage(String),

    /// Failed to create the per-execution tempdir or write the snippet file.
    #[error("sandbox workdir setup failed: {0}")]
    Workdir(#[source] std::io::Error),

    /// The interpreter process could not be spawned.
    #[error("failed to spawn sandbox process: {0}")]
    Spawn(#[source] std::io::Error),

    /// The process exceeded its wall-clock budget and was killed.
    #[error("sandbox wall-clock limit exceeded ({limit:?})")]
    WallClockExceeded {
        /// The configured wall-clock limit.
        limit: Duration,
    },

    /// The process exited with a non-zero status.
    #[error("sandbox process exited with status {code:?}: {stderr}")]
    NonZeroExit {
        /// Process exit code, if the process wasn't killed by a signal.
        code: Option<i32>,
        /// Captured stderr, truncated to a reasonable length for errors.
        stderr: String,
    },

    /// stdout wasn't valid JSON.
    #[error("sandbox stdout was not valid JSON: {0}")]
    InvalidOutput(#[source] serde_json::Error),

    /// Failed to apply an OS-level resource limit before exec.
    #[error("failed to apply resource limit: {0}")]
    ResourceLimit(String),
}

impl From<SandboxError> for ActionError {
    fn from(err: SandboxError) -> Self {
        match err {
            SandboxError::WallClockExceeded { limit } => ActionError::fatal_with_details(
                err.to_string(),
                serde_json::json!({ "wall_limit_secs": limit.as_secs() }),
            ),
            SandboxError::NonZeroExit { code, stderr } => ActionError::fatal_with_details(
                "sandboxed code exited non-zero",
                serde_json::json!({ "code": code, "stderr": stderr }),
            ),
            SandboxError::UnsupportedLanguage(_) => ActionError::validation(err.to_string()),
            other => ActionError::fatal(other.to_string()),
        }
    }
}
