//! [`SandboxRunner`] implementation: runs a `code` node's snippet as a
//! short-lived child process, capped by [`SandboxLimits`].
//!
//! Isolation is layered, matching what's actually enforceable on the
//! platform:
//! - wall-clock via [`tokio::time::timeout`] on every platform,
//! - CPU seconds and address space via `setrlimit` (Linux only, applied
//!   in the child's `pre_exec` hook before `execve`),
//! - filesystem confined to the snippet's own tempdir via Landlock
//!   (Linux only, best-effort — falls back to no enforcement on kernels
//!   without Landlock support rather than refusing to run).
//!
//! Network access is denied by omission: the child's environment carries
//! none of the parent's proxy/credential variables, and nothing grants it
//! a socket capability. There's no Linux network namespace here, so a
//! snippet that hardcodes an IP and bypasses getenv-based proxying is not
//! actually blocked on this driver — tracked as a known gap, not claimed
//! as enforced isolation.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use nebula_action::result::ActionResult;
use nebula_action::{ActionError, ActionMetadata, SandboxedContext};
use nebula_ports::SandboxRunner;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::SandboxLimits;
use crate::error::SandboxError;

/// Maps a `code` node's `language` to an interpreter invocation.
///
/// `source` is passed as a single `-c`/`-e` argument rather than written
/// to an executable file — simpler, and avoids needing exec permission
/// inside the restricted tempdir.
fn interpreter_command(language: &str, source: &str) -> Result<Command, SandboxError> {
    let (program, flag) = match language {
        "python" | "python3" => ("python3", "-c"),
        "javascript" | "node" => ("node", "-e"),
        "bash" | "shell" => ("bash", "-c"),
        other => return Err(SandboxError::UnsupportedLanguage(other.to_owned())),
    };
    let mut cmd = Command::new(program);
    cmd.arg(flag).arg(source);
    Ok(cmd)
}

/// Runs `code` node snippets out-of-process, under [`SandboxLimits`].
pub struct CodeSandbox {
    limits: SandboxLimits,
}

impl CodeSandbox {
    /// Build a sandbox with the given resource caps.
    pub fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }
}

impl Default for CodeSandbox {
    fn default() -> Self {
        Self::new(SandboxLimits::default())
    }
}

#[async_trait]
impl SandboxRunner for CodeSandbox {
    async fn execute(
        &self,
        context: SandboxedContext,
        metadata: &ActionMetadata,
        input: serde_json::Value,
    ) -> Result<ActionResult<serde_json::Value>, ActionError> {
        context.check_cancelled()?;

        let language = metadata.key.strip_prefix("code.").unwrap_or(&metadata.key);
        let source = input
            .get("source")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ActionError::validation("code node input missing `source`"))?;
        let snippet_input = input.get("input").cloned().unwrap_or(serde_json::Value::Null);

        let workdir = tempfile::tempdir().map_err(SandboxError::Workdir)?;
        apply_filesystem_confinement(workdir.path());

        let mut cmd = interpreter_command(language, source)?;
        cmd.current_dir(workdir.path())
            .env_clear()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        apply_resource_limits(&mut cmd, &self.limits);

        let mut child = cmd.spawn().map_err(SandboxError::Spawn)?;

        if let Some(mut stdin) = child.stdin.take() {
            let payload = serde_json::to_vec(&snippet_input).unwrap_or_default();
            // Best-effort: a snippet that never reads stdin closes the pipe
            // early, which is not itself a sandbox failure.
            let _ = stdin.write_all(&payload).await;
            drop(stdin);
        }

        let wall = self.limits.wall_clock;
        let output = tokio::time::timeout(wall, child.wait_with_output())
            .await
            .map_err(|_| SandboxError::WallClockExceeded { limit: wall })?
            .map_err(SandboxError::Spawn)?;

        if !output.status.success() {
            return Err(SandboxError::NonZeroExit {
                code: output.status.code(),
                stderr: truncate(&String::from_utf8_lossy(&output.stderr), 4096),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value = match serde_json::from_str::<serde_json::Value>(stdout.trim()) {
            Ok(v) => v,
            Err(_) => serde_json::json!({ "stdout": stdout.trim() }),
        };

        Ok(ActionResult::success(value))
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_owned()
    } else {
        format!("{}…", &s[..max])
    }
}

#[cfg(target_os = "linux")]
fn apply_resource_limits(cmd: &mut Command, limits: &SandboxLimits) {
    use std::os::unix::process::CommandExt;

    use nix::sys::resource::{Resource, setrlimit};

    let cpu_seconds = limits.cpu_seconds;
    let max_rss = limits.max_rss_bytes;

    // SAFETY: `pre_exec` runs in the forked child before `execve`, with no
    // other threads present; `setrlimit` is async-signal-safe.
    unsafe {
        cmd.pre_exec(move || {
            setrlimit(Resource::RLIMIT_CPU, cpu_seconds, cpu_seconds)
                .map_err(|e| std::io::Error::from_raw_os_error(e as i32))?;
            setrlimit(Resource::RLIMIT_AS, max_rss, max_rss)
                .map_err(|e| std::io::Error::from_raw_os_error(e as i32))?;
            Ok(())
        });
    }
}

#[cfg(not(target_os = "linux"))]
fn apply_resource_limits(_cmd: &mut Command, limits: &SandboxLimits) {
    tracing::warn!(
        cpu_seconds = limits.cpu_seconds,
        "RLIMIT enforcement unavailable on this platform; running unconfined"
    );
}

#[cfg(target_os = "linux")]
fn apply_filesystem_confinement(workdir: &Path) {
    use landlock::{ABI, Access, AccessFs, PathBeneath, PathFd, Ruleset, RulesetAttr, RulesetCreatedAttr};

    let abi = ABI::V2;
    let result = (|| -> Result<(), Box<dyn std::error::Error>> {
        Ruleset::default()
            .handle_access(AccessFs::from_all(abi))?
            .create()?
            .add_rule(PathBeneath::new(PathFd::new(workdir)?, AccessFs::from_all(abi)))?
            .restrict_self()?;
        Ok(())
    })();

    if let Err(err) = result {
        tracing::warn!(%err, "landlock confinement unavailable; running without filesystem restriction");
    }
}

#[cfg(not(target_os = "linux"))]
fn apply_filesystem_confinement(_workdir: &Path) {
    tracing::warn!("filesystem confinement unavailable on this platform; running unconfined");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_language_rejected() {
        let err = interpreter_command("cobol", "ok").unwrap_err();
        assert!(matches!(err, SandboxError::UnsupportedLanguage(lang) if lang == "cobol"));
    }

    #[test]
    fn known_languages_map_to_interpreters() {
        assert!(interpreter_command("python", "1+1").is_ok());
        assert!(interpreter_command("node", "1+1").is_ok());
        assert!(interpreter_command("bash", "echo hi").is_ok());
    }
}
