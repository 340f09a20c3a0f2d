//! Error type unifying the crates this facade wires together.

use nebula_core::id::WorkflowId;

/// Errors returned by [`crate::blueprint::BlueprintStore`] and
/// [`crate::execution::ExecutionService`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No blueprint exists under the given ID.
    #[error("blueprint not found: {0}")]
    BlueprintNotFound(WorkflowId),

    /// An update's `X-Version-Lock`-equivalent didn't match the stored
    /// version — someone else mutated the blueprint first.
    #[error("version conflict on blueprint {id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Blueprint that was being updated.
        id: WorkflowId,
        /// Version the caller expected.
        expected: u64,
        /// Version actually stored.
        actual: u64,
    },

    /// No execution exists under the given ID.
    #[error("execution not found: {0}")]
    ExecutionNotFound(nebula_core::id::ExecutionId),

    /// The blueprint failed compiler validation.
    #[error(transparent)]
    Workflow(#[from] nebula_workflow::WorkflowError),

    /// The engine failed during execution.
    #[error(transparent)]
    Engine(#[from] nebula_engine::EngineError),

    /// The execution store's port returned an error.
    #[error(transparent)]
    Ports(#[from] nebula_ports::PortsError),
}
