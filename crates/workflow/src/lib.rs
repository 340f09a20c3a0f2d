//! Workflow definition, dependency graph, registry, and compiler for the
//! Nebula workflow engine.
//!
//! This crate owns the static shape of a workflow — [`WorkflowDefinition`],
//! its [`NodeDefinition`]s and their [`NodeKind`]s, the [`DependencyGraph`]
//! derived from their [`Connection`]s, the [`Registry`] of callables a
//! blueprint's nodes resolve against, and the [`compiler`] that validates a
//! blueprint end to end before the execution engine (`nebula-engine`) runs
//! it.

pub mod compiler;
pub mod context;
pub mod error;
pub mod graph;
pub mod node;
pub mod registry;
pub mod workflow;

pub use compiler::{CompiledGraph, CompilerLimits, PartialValidation, finalize, validate_partial};
pub use context::ParamValue;
pub use error::WorkflowError;
pub use graph::DependencyGraph;
pub use node::{HumanApproval, NodeDefinition, NodeKind, NodeRuntimeState, NodeState, RetryPolicy};
pub use registry::{Factory, Registry, RegistrySpace};
pub use workflow::{Connection, FailurePolicy, WorkflowConfig, WorkflowDefinition};

/// `serde(with = "...")` helper for `Duration` fields, encoded as
/// milliseconds. Mirrors `nebula-execution`'s `serde_duration_opt` helper,
/// minus the `Option` layer.
pub(crate) mod serde_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, s: S) -> Result<S::Ok, S::Error> {
        (duration.as_millis() as u64).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

/// `serde(with = "...")` helper for `Option<Duration>` fields, encoded as
/// milliseconds (or `null`). Lifted from `nebula-execution`'s own helper of
/// the same name.
pub(crate) mod serde_duration_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => (d.as_millis() as u64).serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let opt: Option<u64> = Option::deserialize(d)?;
        Ok(opt.map(Duration::from_millis))
    }
}
