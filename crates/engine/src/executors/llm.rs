//! `llm` node dispatch: resolve the prompt/params, invoke the registered
//! [`LlmProvider`], fold token usage into the output and the execution's
//! running token budget.

use std::sync::Arc;

use nebula_action::result::ActionResult;
use nebula_ports::LlmProvider;
use nebula_workflow::{NodeDefinition, NodeKind, RegistrySpace};
use serde_json::json;

use super::ExecutorCtx;
use crate::error::EngineError;

/// Concrete, `Any`-downcastable handle wrapping a boxed [`LlmProvider`].
///
/// [`nebula_workflow::Registry`] factories produce `Arc<dyn Any>`; `dyn
/// LlmProvider` itself isn't `Any`, so providers are registered as
/// `Arc::new(LlmProviderHandle(provider))` and recovered with a single
/// `downcast::<LlmProviderHandle>()` here.
pub struct LlmProviderHandle(pub Arc<dyn LlmProvider>);

pub(super) async fn execute(
    node: &NodeDefinition,
    input: serde_json::Value,
    ctx: &ExecutorCtx,
) -> Result<ActionResult<serde_json::Value>, EngineError> {
    let NodeKind::Llm {
        provider,
        model,
        prompt,
        params,
    } = &node.kind
    else {
        unreachable!("dispatch only routes Llm nodes here");
    };

    let registry = ctx
        .registry
        .as_ref()
        .ok_or(EngineError::ProviderNotConfigured { node_id: node.id })?;

    let mut all_params = params.clone();
    all_params.insert("__prompt".to_owned(), prompt.clone());
    let resolved = ctx
        .resolver
        .resolve(node.id, &all_params, &input, ctx.outputs)?
        .unwrap_or(json!({}));
    let rendered_prompt = resolved
        .get("__prompt")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_owned();

    let handle = registry
        .resolve(RegistrySpace::LlmOperator, provider)
        .map_err(|e| EngineError::NodeFailed {
            node_id: node.id,
            error: e.to_string(),
        })?
        .downcast::<LlmProviderHandle>()
        .map_err(|_| EngineError::NodeFailed {
            node_id: node.id,
            error: format!("`{provider}` is not a registered LLM provider handle"),
        })?;

    let request = nebula_ports::PromptRequest {
        model: model.clone(),
        prompt: rendered_prompt,
        params: resolved,
    };

    let response = handle.0.complete(request).await.map_err(|e| EngineError::ProviderFailed {
        node_id: node.id,
        retriable: e.is_retriable(),
        error: e.to_string(),
    })?;

    ctx.charge_tokens(response.usage.total_tokens())?;

    Ok(ActionResult::success(json!({
        "text": response.text,
        // Alias of `text`: downstream templates address an LLM node's
        // reply as `{{ <node>.response }}`, matching the default output
        // schema the compiler assigns unset `llm` nodes.
        "response": response.text,
        "usage": {
            "prompt_tokens": response.usage.prompt_tokens,
            "completion_tokens": response.usage.completion_tokens,
        },
    })))
}
