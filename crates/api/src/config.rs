//! Process-wide configuration, read from `NEBULA_*` environment variables
//! with typed defaults — the ambient config layer spec.md §6 describes
//! ("Token ceiling, max parallel, sandbox limits, semantic TTL, embedding
//! model id, vector dimension, storage backend URIs. All have documented
//! defaults.").
//!
//! Follows `nebula-log::Config::from_env`'s pattern (plain `std::env::var`
//! parsing, no config-framework dependency) rather than introducing a new
//! crate for a handful of scalar knobs.

use std::time::Duration;

use nebula_action::ExecutionBudget;
use nebula_memory::SemanticMemory;
use nebula_sandbox::SandboxLimits;
use nebula_workflow::CompilerLimits;

/// Typed, env-sourced configuration for everything this crate wires
/// together: the compiler's budget limits, the engine's execution budget,
/// the sandbox's resource caps, and the memory subsystem's vector/TTL
/// knobs.
#[derive(Debug, Clone)]
pub struct NebulaConfig {
    /// `NEBULA_MAX_PARALLEL` — width of the engine's per-level semaphore.
    /// Default `5` (spec §4.6).
    pub max_parallel: usize,
    /// `NEBULA_TOKEN_CEILING` — running ceiling on summed LLM
    /// `usage.total_tokens` across an execution. Unset (`None`) means
    /// unbounded.
    pub token_ceiling: Option<u64>,
    /// `NEBULA_DEPTH_CEILING` — max number of dependency levels a compiled
    /// graph may have. Unset means unbounded.
    pub depth_ceiling: Option<u32>,
    /// `NEBULA_MAX_LOOP_ITERATIONS` — compiler-time cap on a `loop` node's
    /// declared `max_iterations`. Default `10_000`.
    pub max_loop_iterations: u32,
    /// `NEBULA_MAX_PARALLEL_BRANCHES` — compiler-time cap on a `parallel`
    /// node's branch count. Default `64`.
    pub max_parallel_branches: usize,
    /// `NEBULA_SANDBOX_CPU_SECONDS` — code-node CPU cap. Default `10`.
    pub sandbox_cpu_seconds: u64,
    /// `NEBULA_SANDBOX_MAX_RSS_MB` — code-node memory cap in MiB. Default
    /// `256`.
    pub sandbox_max_rss_mb: u64,
    /// `NEBULA_SANDBOX_WALL_SECONDS` — code-node wall-clock cap. Default
    /// `30`.
    pub sandbox_wall_seconds: u64,
    /// `NEBULA_SEMANTIC_TTL_DAYS` — semantic memory decay horizon. Default
    /// `90`.
    pub semantic_ttl_days: i64,
    /// `NEBULA_VECTOR_DIMENSION` — fixed embedding width the semantic
    /// store enforces on every `upsert`/`query`. Default `1536` (matches
    /// common embedding-model output width).
    pub vector_dimension: usize,
    /// `NEBULA_EMBEDDING_MODEL` — identifier recorded on every semantic
    /// memory entry's `model_version` field. Default
    /// `"text-embedding-3-small"`.
    pub embedding_model_id: String,
    /// `NEBULA_STORAGE_URI` — connection string for a durable execution
    /// store / episodic KV backend, when one is configured. Unset means
    /// the in-memory fallback is used (see `nebula-execution`,
    /// `nebula-memory`).
    pub storage_backend_uri: Option<String>,
}

impl Default for NebulaConfig {
    fn default() -> Self {
        Self {
            max_parallel: 5,
            token_ceiling: None,
            depth_ceiling: None,
            max_loop_iterations: 10_000,
            max_parallel_branches: 64,
            sandbox_cpu_seconds: 10,
            sandbox_max_rss_mb: 256,
            sandbox_wall_seconds: 30,
            semantic_ttl_days: 90,
            vector_dimension: 1536,
            embedding_model_id: "text-embedding-3-small".to_owned(),
            storage_backend_uri: None,
        }
    }
}

impl NebulaConfig {
    /// Build a config from `NEBULA_*` environment variables, falling back
    /// to [`NebulaConfig::default`] field-by-field for anything unset or
    /// unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_parallel: env_parsed("NEBULA_MAX_PARALLEL").unwrap_or(defaults.max_parallel),
            token_ceiling: env_parsed("NEBULA_TOKEN_CEILING").or(defaults.token_ceiling),
            depth_ceiling: env_parsed("NEBULA_DEPTH_CEILING").or(defaults.depth_ceiling),
            max_loop_iterations: env_parsed("NEBULA_MAX_LOOP_ITERATIONS")
                .unwrap_or(defaults.max_loop_iterations),
            max_parallel_branches: env_parsed("NEBULA_MAX_PARALLEL_BRANCHES")
                .unwrap_or(defaults.max_parallel_branches),
            sandbox_cpu_seconds: env_parsed("NEBULA_SANDBOX_CPU_SECONDS")
                .unwrap_or(defaults.sandbox_cpu_seconds),
            sandbox_max_rss_mb: env_parsed("NEBULA_SANDBOX_MAX_RSS_MB")
                .unwrap_or(defaults.sandbox_max_rss_mb),
            sandbox_wall_seconds: env_parsed("NEBULA_SANDBOX_WALL_SECONDS")
                .unwrap_or(defaults.sandbox_wall_seconds),
            semantic_ttl_days: env_parsed("NEBULA_SEMANTIC_TTL_DAYS")
                .unwrap_or(defaults.semantic_ttl_days),
            vector_dimension: env_parsed("NEBULA_VECTOR_DIMENSION")
                .unwrap_or(defaults.vector_dimension),
            embedding_model_id: std::env::var("NEBULA_EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model_id),
            storage_backend_uri: std::env::var("NEBULA_STORAGE_URI").ok(),
        }
    }

    /// Project this config onto the compiler's budget limits (C3 phase 6).
    #[must_use]
    pub fn compiler_limits(&self) -> CompilerLimits {
        CompilerLimits {
            max_loop_iterations: self.max_loop_iterations,
            max_parallel_branches: self.max_parallel_branches,
            depth_ceiling: self.depth_ceiling,
        }
    }

    /// Project this config onto an execution's resource budget (C6
    /// guards). Callers that need per-execution overrides (a stricter
    /// wall-time for one run, say) should clone the result and adjust it
    /// rather than mutate this shared config.
    #[must_use]
    pub fn execution_budget(&self) -> ExecutionBudget {
        ExecutionBudget {
            max_total_tokens: self.token_ceiling,
            ..ExecutionBudget::default()
        }
    }

    /// Project this config onto a code node's sandbox resource caps (C8).
    #[must_use]
    pub fn sandbox_limits(&self) -> SandboxLimits {
        SandboxLimits {
            cpu_seconds: self.sandbox_cpu_seconds,
            max_rss_bytes: self.sandbox_max_rss_mb * 1024 * 1024,
            wall_clock: Duration::from_secs(self.sandbox_wall_seconds),
            allow_network: false,
        }
    }

    /// Build a fresh semantic memory store sized and TTL'd from this
    /// config (C9). Each caller that needs its own store (a test, a
    /// single-tenant deployment) gets an independent instance; nothing
    /// here is process-wide.
    #[must_use]
    pub fn semantic_memory(&self) -> SemanticMemory {
        SemanticMemory::new(self.vector_dimension, self.semantic_ttl_days)
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative_and_documented() {
        let cfg = NebulaConfig::default();
        assert_eq!(cfg.max_parallel, 5);
        assert!(cfg.token_ceiling.is_none());
        assert!(cfg.depth_ceiling.is_none());
        assert_eq!(cfg.vector_dimension, 1536);
    }

    #[test]
    fn compiler_limits_projection_carries_depth_ceiling() {
        let cfg = NebulaConfig {
            depth_ceiling: Some(4),
            ..NebulaConfig::default()
        };
        assert_eq!(cfg.compiler_limits().depth_ceiling, Some(4));
    }

    #[test]
    fn sandbox_limits_projection_converts_mb_to_bytes() {
        let cfg = NebulaConfig {
            sandbox_max_rss_mb: 512,
            ..NebulaConfig::default()
        };
        assert_eq!(cfg.sandbox_limits().max_rss_bytes, 512 * 1024 * 1024);
    }

    #[tokio::test]
    async fn semantic_memory_projection_uses_configured_dimension() {
        use nebula_core::id::{OrganizationId, UserId};
        use nebula_memory::{MemoryIdentity, MemoryScope, VectorIndex};

        let cfg = NebulaConfig {
            vector_dimension: 3,
            ..NebulaConfig::default()
        };
        let store = cfg.semantic_memory();
        let identity = MemoryIdentity::new(OrganizationId::v4(), UserId::v4());
        let err = store
            .upsert(&identity, MemoryScope::Kb, "k", vec![1.0, 2.0], "test-model")
            .await;
        assert!(err.is_err());
    }

    #[test]
    fn env_override_wins_over_default() {
        // SAFETY-equivalent: std::env::set_var in a single-threaded test;
        // cleaned up immediately after the assertion.
        std::env::set_var("NEBULA_MAX_PARALLEL", "12");
        let cfg = NebulaConfig::from_env();
        std::env::remove_var("NEBULA_MAX_PARALLEL");
        assert_eq!(cfg.max_parallel, 12);
    }
}
