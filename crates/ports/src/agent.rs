//! Agent brain port.
//!
//! Fixes spec.md §4.7/§9's one agent shape: `think(ctx) -> AgentAction`
//! where `AgentAction` is either a tool call or a completion signal.
//! Agents with a differently-shaped `think`/`decide` pair in their origin
//! system need a wrapper adapter implementing this trait, not a change to
//! the core.

use async_trait::async_trait;
use serde_json::Value;

/// What an agent decided to do after one `think` step.
#[derive(Debug, Clone)]
pub enum AgentAction {
    /// Invoke a tool and observe its result before thinking again.
    Tool {
        /// Registry key of the tool to invoke. Must be present in the
        /// node's `allowed_tools` — the engine enforces this on every
        /// step, not just the first.
        tool: String,
        /// Input passed to the tool.
        inputs: Value,
    },
    /// The agent is finished; `output` is the final node output.
    Done {
        /// The agent's final answer.
        output: Value,
    },
}

/// Port trait implemented by concrete agent brains (planner/reasoner
/// implementations). Registered in the engine's `agent` registry space.
#[async_trait]
pub trait AgentBrain: Send + Sync {
    /// Produce the next action given the running transcript/context.
    ///
    /// `context` carries the initial goal, prior tool observations, and
    /// whatever scratchpad state the brain accumulated; it is opaque JSON
    /// so different brains can shape it differently.
    async fn think(&self, context: &Value) -> Result<AgentAction, String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_variants_are_constructible() {
        let done = AgentAction::Done {
            output: serde_json::json!({"ok": true}),
        };
        assert!(matches!(done, AgentAction::Done { .. }));

        let tool = AgentAction::Tool {
            tool: "search".into(),
            inputs: serde_json::json!({"q": "rust"}),
        };
        assert!(matches!(tool, AgentAction::Tool { .. }));
    }
}
