#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula API
//!
//! The in-process operations surface a transport (HTTP, JSON-RPC, a CLI)
//! would sit in front of: blueprint CRUD with version locking, and
//! starting/inspecting executions. It ties together the registry
//! (`nebula-workflow`), the compiler (`nebula-workflow::compiler`), the
//! engine (`nebula-engine`), and the execution store port
//! (`nebula-ports::ExecutionRepo`) behind one narrow surface.
//!
//! What this crate deliberately does NOT do: speak HTTP, WebSocket, or any
//! other wire protocol, handle authentication, or rate-limit. Those are
//! out of scope — a caller builds a transport on top of this crate, not
//! inside it.

mod blueprint;
mod config;
mod error;
mod execution;

pub use blueprint::{BlueprintRecord, BlueprintStore, InMemoryBlueprintStore, NEW_BLUEPRINT};
pub use config::NebulaConfig;
pub use error::ApiError;
pub use execution::ExecutionService;

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use nebula_action::capability::IsolationLevel;
    use nebula_action::context::ActionContext;
    use nebula_action::error::ActionError;
    use nebula_action::handler::InternalHandler;
    use nebula_action::metadata::ActionMetadata;
    use nebula_action::result::ActionResult;
    use nebula_action::ExecutionBudget;
    use nebula_core::id::{ActionId, WorkflowId};
    use nebula_core::Version;
    use nebula_engine::WorkflowEngine;
    use nebula_execution_inprocess::InMemoryExecutionRepo;
    use nebula_runtime::registry::ActionRegistry;
    use nebula_runtime::{ActionRuntime, DataPassingPolicy};
    use nebula_sandbox_inprocess::{ActionExecutor, InProcessSandbox};
    use nebula_telemetry::event::EventBus;
    use nebula_telemetry::metrics::MetricsRegistry;
    use nebula_workflow::{NodeDefinition, WorkflowConfig, WorkflowDefinition};

    use super::*;

    struct EchoHandler {
        meta: ActionMetadata,
    }

    #[async_trait::async_trait]
    impl InternalHandler for EchoHandler {
        async fn execute(
            &self,
            input: serde_json::Value,
            _ctx: ActionContext,
        ) -> Result<ActionResult<serde_json::Value>, ActionError> {
            Ok(ActionResult::success(input))
        }

        fn metadata(&self) -> &ActionMetadata {
            &self.meta
        }
    }

    fn make_workflow(action_id: ActionId) -> WorkflowDefinition {
        let now = chrono::Utc::now();
        let node = NodeDefinition::new(nebula_core::id::NodeId::v4(), "echo", action_id);
        WorkflowDefinition {
            id: WorkflowId::v4(),
            name: "test".into(),
            description: None,
            version: Version::new(0, 1, 0),
            nodes: vec![node],
            connections: vec![],
            variables: HashMap::new(),
            config: WorkflowConfig::default(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn make_engine(action_id: ActionId) -> WorkflowEngine {
        let registry = Arc::new(ActionRegistry::new());
        registry.register(Arc::new(EchoHandler {
            meta: ActionMetadata::new("echo", "Echo", "echoes input")
                .with_isolation(IsolationLevel::None),
        }));

        let executor: ActionExecutor =
            Arc::new(|_ctx, _meta, input| Box::pin(async move { Ok(ActionResult::success(input)) }));
        let sandbox = Arc::new(InProcessSandbox::new(executor));
        let event_bus = Arc::new(EventBus::new(64));
        let metrics = Arc::new(MetricsRegistry::new());
        let runtime = Arc::new(ActionRuntime::new(
            registry,
            sandbox,
            DataPassingPolicy::default(),
            event_bus.clone(),
            metrics.clone(),
        ));

        let mut engine = WorkflowEngine::new(runtime, event_bus, metrics);
        engine.map_action(action_id, "echo");
        engine
    }

    #[tokio::test]
    async fn blueprint_create_then_update_requires_matching_lock() {
        let store = InMemoryBlueprintStore::new();
        let action_id = ActionId::v4();
        let workflow = make_workflow(action_id);
        let id = workflow.id;

        let created = store.put(id, NEW_BLUEPRINT, workflow.clone()).await.unwrap();
        assert_eq!(created.version_lock, 1);

        let err = store.put(id, NEW_BLUEPRINT, workflow.clone()).await.unwrap_err();
        assert!(matches!(err, ApiError::VersionConflict { .. }));

        let updated = store.put(id, 1, workflow).await.unwrap();
        assert_eq!(updated.version_lock, 2);
    }

    #[tokio::test]
    async fn execution_service_runs_and_reports_status() {
        let action_id = ActionId::v4();
        let engine = Arc::new(make_engine(action_id));
        let repo = Arc::new(InMemoryExecutionRepo::new());
        let service = ExecutionService::new(engine, repo);

        let workflow = make_workflow(action_id);
        let execution_id = service
            .start(&workflow, serde_json::json!("hi"), ExecutionBudget::default())
            .await
            .unwrap();

        let status = service.status(execution_id).await.unwrap();
        assert_eq!(status["success"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn status_of_unknown_execution_is_not_found() {
        let action_id = ActionId::v4();
        let engine = Arc::new(make_engine(action_id));
        let repo = Arc::new(InMemoryExecutionRepo::new());
        let service = ExecutionService::new(engine, repo);

        let err = service.status(nebula_core::id::ExecutionId::v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::ExecutionNotFound(_)));
    }
}
