//! LLM provider port.
//!
//! Defines the interface the engine's `llm` node executor calls against.
//! Concrete wire formats (OpenAI, Anthropic, ...) are external collaborators
//! — this crate only specifies the contract the core consumes: render a
//! prompt, get back text plus token usage, classify failures as retryable
//! or permanent.

use async_trait::async_trait;
use serde_json::Value;

/// A single completion request sent to a provider.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// Model identifier understood by the provider (e.g. `"gpt-4o"`).
    pub model: String,
    /// The fully-rendered prompt text (templates already resolved).
    pub prompt: String,
    /// Provider-specific parameters (temperature, max_tokens, ...), passed
    /// through verbatim.
    pub params: Value,
}

/// Token accounting for a single completion, used by the engine's token
/// ceiling guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u64,
    /// Tokens consumed by the completion.
    pub completion_tokens: u64,
}

impl TokenUsage {
    /// Total tokens (`prompt_tokens + completion_tokens`).
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A completed response from a provider.
#[derive(Debug, Clone)]
pub struct PromptResponse {
    /// The model's text completion.
    pub text: String,
    /// Token usage for this call, when the provider reports it.
    pub usage: TokenUsage,
}

/// Failure classification a provider reports back to the engine.
///
/// The engine's retry loop only retries [`ProviderError::Transient`];
/// [`ProviderError::Permanent`] fails the node immediately. This is the
/// conservative allowlist spec.md §9 calls for: timeout, 5xx, and explicit
/// rate-limit responses are transient, everything else is permanent.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Transient failure (timeout, 5xx, rate-limit) — the engine may retry.
    #[error("transient provider error: {0}")]
    Transient(String),
    /// Permanent failure (invalid request, auth, content policy) — never
    /// retried.
    #[error("permanent provider error: {0}")]
    Permanent(String),
}

impl ProviderError {
    /// Whether the engine's retry loop should retry this error.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Port trait implemented by concrete LLM provider adapters.
///
/// One instance is registered per `(provider)` key in the engine's
/// `llm_operator` registry space; the `llm` node executor resolves the
/// provider named in [`NodeKind::Llm`](nebula_workflow::NodeKind::Llm) and
/// calls [`complete`](Self::complete).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run a single completion request.
    async fn complete(&self, request: PromptRequest) -> Result<PromptResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_retriable() {
        assert!(ProviderError::Transient("timeout".into()).is_retriable());
    }

    #[test]
    fn permanent_is_not_retriable() {
        assert!(!ProviderError::Permanent("bad request".into()).is_retriable());
    }

    #[test]
    fn total_tokens_sums_both_fields() {
        let usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 5,
        };
        assert_eq!(usage.total_tokens(), 15);
    }
}
