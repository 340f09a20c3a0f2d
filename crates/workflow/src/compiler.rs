//! The workflow compiler (spec component C3): validates a blueprint in six
//! ordered phases and, if all pass, produces a [`CompiledGraph`] ready for
//! the execution engine.
//!
//! Phases run in order and each one short-circuits on its own failures
//! (a later phase assumes earlier ones held), but every error a phase
//! finds is collected before returning, so callers see the whole list of
//! problems in one blueprint rather than fixing them one at a time:
//!
//! 1. **Structural** — non-empty workflow, non-empty node names, no
//!    duplicate node IDs.
//! 2. **Registry resolution** — every `tool`/`code`/`agent`/`llm` node's
//!    import resolves in the [`Registry`].
//! 3. **Schema presence** — every `tool` node declares a non-empty
//!    `input_schema` and `output_schema`.
//! 4. **Graph construction** — connections form a DAG (no cycles, no
//!    dangling references).
//! 5. **Reference wiring** — every [`ParamValue::Reference`] points at an
//!    actual predecessor of the node that uses it, not just any node that
//!    happens to exist in the workflow; and for every edge where both
//!    endpoints declare schemas, the source's declared output is
//!    compatible with the destination's declared input.
//! 6. **Budget/limits** — loop iteration caps, parallel branch counts, and
//!    timeouts are within configured bounds.
//! 7. **Assembly** — build the [`CompiledGraph`] (dependency graph plus
//!    precomputed parallel levels) the engine executes against.

use nebula_schema::Schema;
use nebula_validator::core::error::ValidationError;

use crate::context::ParamValue;
use crate::error::WorkflowError;
use crate::graph::DependencyGraph;
use crate::node::{NodeDefinition, NodeKind};
use crate::registry::{Registry, RegistrySpace};
use crate::workflow::WorkflowDefinition;

/// Hard limits phase 5 enforces when the caller doesn't supply tighter
/// ones via [`CompilerLimits`].
#[derive(Debug, Clone, Copy)]
pub struct CompilerLimits {
    /// Maximum `max_iterations` a `loop` node may declare.
    pub max_loop_iterations: u32,
    /// Maximum number of branches a `parallel` node may fan out to.
    pub max_parallel_branches: usize,
    /// Maximum number of dependency levels a compiled graph may have.
    /// `None` means unbounded. Checked once the graph is built, before
    /// [`finalize`] returns a [`CompiledGraph`] — a blueprint whose
    /// longest chain exceeds this is rejected at compile time, never
    /// partially executed.
    pub depth_ceiling: Option<u32>,
}

impl Default for CompilerLimits {
    fn default() -> Self {
        Self {
            max_loop_iterations: 10_000,
            max_parallel_branches: 64,
            depth_ceiling: None,
        }
    }
}

/// The output of a fully successful compilation: the original definition
/// paired with its validated dependency graph and precomputed parallel
/// execution levels.
pub struct CompiledGraph {
    /// The workflow this graph was compiled from.
    pub workflow: WorkflowDefinition,
    /// The validated dependency graph.
    pub graph: DependencyGraph,
    /// Precomputed parallel execution levels.
    pub levels: Vec<Vec<nebula_core::id::NodeId>>,
}

/// Result of validating a partial (in-progress) blueprint: phases 1-2
/// only, since a partial blueprint's graph (phase 3+) may legitimately be
/// incomplete while still being edited.
pub struct PartialValidation {
    /// Errors found so far (empty means phases 1-2 both passed).
    pub errors: Vec<ValidationError>,
    /// Node IDs referenced by a [`ParamValue::Reference`] whose producing
    /// node doesn't exist yet — expected to be filled in before
    /// [`finalize`] is called.
    pub pending_outputs: Vec<nebula_core::id::NodeId>,
}

impl PartialValidation {
    /// Whether phases 1-2 passed with no errors.
    #[must_use]
    pub fn is_valid_so_far(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a blueprint that is still being edited: only phases 1-2 run
/// (structural + registry resolution). This never fails on dangling graph
/// references — those are expected mid-edit and are instead surfaced as
/// `pending_outputs` for the editor to highlight.
///
/// See [`finalize`] for the full six-phase validation run before
/// execution.
#[must_use]
pub fn validate_partial(workflow: &WorkflowDefinition, registry: &Registry) -> PartialValidation {
    let mut errors = phase1_structural(workflow);
    errors.extend(phase2_registry_resolution(workflow, registry));

    let known_ids: std::collections::HashSet<_> = workflow.nodes.iter().map(|n| n.id).collect();
    let mut pending_outputs = Vec::new();
    for node in &workflow.nodes {
        for param in node_params(node) {
            if let ParamValue::Reference { node_id, .. } = param {
                if !known_ids.contains(node_id) {
                    pending_outputs.push(*node_id);
                }
            }
        }
    }

    PartialValidation {
        errors,
        pending_outputs,
    }
}

/// Run all six compilation phases against a complete blueprint, producing
/// a [`CompiledGraph`] on success.
///
/// # Errors
///
/// Returns [`WorkflowError::CompilationFailed`] carrying every error found
/// across all phases that ran before the first hard stop (phase 3 must
/// succeed before phases 4-6 can meaningfully run, since they operate on
/// the constructed graph).
pub fn finalize(
    mut workflow: WorkflowDefinition,
    registry: &Registry,
    limits: CompilerLimits,
) -> Result<CompiledGraph, WorkflowError> {
    apply_default_llm_output_schema(&mut workflow);

    let mut errors = phase1_structural(&workflow);
    errors.extend(phase2_registry_resolution(&workflow, registry));
    errors.extend(phase3_schema_presence(&workflow));
    if !errors.is_empty() {
        return Err(WorkflowError::CompilationFailed(errors));
    }

    let graph = DependencyGraph::from_definition(&workflow).map_err(|e| match e {
        WorkflowError::CycleDetected(nodes) => WorkflowError::CompilationFailed(vec![
            ValidationError::custom(
                "cycle_detected",
                "",
                format!("dependency cycle involving {} node(s)", nodes.len()),
            ),
        ]),
        other => WorkflowError::CompilationFailed(vec![ValidationError::custom(
            "graph_error",
            "",
            other.to_string(),
        )]),
    })?;

    errors.extend(phase4_reference_wiring(&workflow, &graph));
    errors.extend(phase4_schema_compatibility(&workflow));
    errors.extend(phase5_budget_limits(&workflow, limits));
    if !errors.is_empty() {
        return Err(WorkflowError::CompilationFailed(errors));
    }

    let levels = graph
        .compute_levels()
        .map_err(|e| WorkflowError::CompilationFailed(vec![ValidationError::custom(
            "level_computation_failed",
            "",
            e.to_string(),
        )]))?;

    if let Some(ceiling) = limits.depth_ceiling {
        if levels.len() as u32 > ceiling {
            return Err(WorkflowError::CompilationFailed(vec![ValidationError::custom(
                "depth_ceiling_exceeded",
                "",
                format!(
                    "Depth ceiling exceeded: graph has {} level(s), ceiling is {ceiling}",
                    levels.len()
                ),
            )]));
        }
    }

    Ok(CompiledGraph {
        workflow,
        graph,
        levels,
    })
}

/// `llm` nodes with no declared `output_schema` get the shape the engine's
/// LLM executor actually produces (`text`/`response`/`usage`), so phase 4's
/// schema-compatibility check has something to compare a downstream
/// consumer's declared `input_schema` against instead of silently skipping
/// the edge.
fn apply_default_llm_output_schema(workflow: &mut WorkflowDefinition) {
    for node in &mut workflow.nodes {
        if matches!(node.kind, NodeKind::Llm { .. }) && node.output_schema.is_none() {
            node.output_schema = Some(
                Schema::object()
                    .with_property("text", Schema::string())
                    .with_property("response", Schema::string()),
            );
        }
    }
}

fn phase1_structural(workflow: &WorkflowDefinition) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if workflow.nodes.is_empty() {
        errors.push(ValidationError::required("nodes"));
        return errors;
    }

    let mut seen = std::collections::HashSet::new();
    for node in &workflow.nodes {
        if node.name.trim().is_empty() {
            errors.push(ValidationError::required(format!("nodes[{}].name", node.id)));
        }
        if !seen.insert(node.id) {
            errors.push(ValidationError::custom(
                "duplicate_node",
                format!("nodes[{}]", node.id),
                "duplicate node id",
            ));
        }
    }
    errors
}

fn phase2_registry_resolution(
    workflow: &WorkflowDefinition,
    registry: &Registry,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for node in &workflow.nodes {
        let (space, import) = match &node.kind {
            NodeKind::Llm { provider, .. } => (RegistrySpace::LlmOperator, Some(provider.clone())),
            NodeKind::Code { language, .. } => (RegistrySpace::Code, Some(language.clone())),
            NodeKind::Agent { agent_class, .. } => (RegistrySpace::Agent, Some(agent_class.clone())),
            NodeKind::Tool { .. } | NodeKind::Workflow { .. } => {
                continue; // resolved against the runtime's ActionRuntime / workflow store directly.
            }
            _ => continue,
        };
        if let Some(import) = import {
            if !registry.contains(space, &import) {
                errors.push(ValidationError::not_allowed(
                    format!("nodes[{}]", node.id),
                    format!("no `{space}` registered for `{import}`"),
                ));
            }
        }
    }
    errors
}

/// Every `tool` node must declare a non-empty `input_schema` and
/// `output_schema` (spec.md §3).
fn phase3_schema_presence(workflow: &WorkflowDefinition) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for node in &workflow.nodes {
        if matches!(node.kind, NodeKind::Tool { .. }) && !node.has_valid_tool_schemas() {
            errors.push(ValidationError::required(format!(
                "nodes[{}].input_schema/output_schema",
                node.id
            )));
        }
    }
    errors
}

/// For every edge where both endpoints declare schemas, the source's
/// declared output must be compatible with the destination's declared
/// input (primitive equality, or an object subset — spec.md §3/§4.3
/// phase 4).
fn phase4_schema_compatibility(workflow: &WorkflowDefinition) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for connection in &workflow.connections {
        let (Some(from), Some(to)) = (workflow.node(connection.from), workflow.node(connection.to)) else {
            continue;
        };
        let (Some(output), Some(input)) = (&from.output_schema, &to.input_schema) else {
            continue;
        };
        if !output.is_compatible_with(input) {
            errors.push(ValidationError::not_allowed(
                format!("nodes[{}]", to.id),
                format!(
                    "declared input_schema is not compatible with nodes[{}]'s output_schema",
                    from.id
                ),
            ));
        }
    }
    errors
}

fn phase4_reference_wiring(
    workflow: &WorkflowDefinition,
    graph: &DependencyGraph,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for node in &workflow.nodes {
        let predecessors = graph.predecessors(node.id);
        for param in node_params(node) {
            if let ParamValue::Reference { node_id, .. } = param {
                if !predecessors.contains(node_id) {
                    errors.push(ValidationError::not_allowed(
                        format!("nodes[{}]", node.id),
                        format!("references node `{node_id}`, which is not a direct predecessor"),
                    ));
                }
            }
        }
    }
    errors
}

fn phase5_budget_limits(
    workflow: &WorkflowDefinition,
    limits: CompilerLimits,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for node in &workflow.nodes {
        match &node.kind {
            NodeKind::Loop { max_iterations, .. } if *max_iterations > limits.max_loop_iterations => {
                errors.push(ValidationError::out_of_range(
                    format!("nodes[{}].max_iterations", node.id),
                    0.0,
                    f64::from(limits.max_loop_iterations),
                    f64::from(*max_iterations),
                ));
            }
            NodeKind::Parallel { branches } if branches.len() > limits.max_parallel_branches => {
                errors.push(ValidationError::out_of_range(
                    format!("nodes[{}].branches", node.id),
                    0.0,
                    limits.max_parallel_branches as f64,
                    branches.len() as f64,
                ));
            }
            _ => {}
        }
    }
    errors
}

/// Every [`ParamValue`] a node carries, regardless of kind.
fn node_params(node: &NodeDefinition) -> Vec<&ParamValue> {
    match &node.kind {
        NodeKind::Tool { params, .. }
        | NodeKind::Code { params, .. }
        | NodeKind::Agent { params, .. } => params.values().collect(),
        NodeKind::Llm { prompt, params, .. } => {
            let mut v: Vec<&ParamValue> = params.values().collect();
            v.push(prompt);
            v
        }
        NodeKind::Workflow { input_mapping, .. } => input_mapping.values().collect(),
        _ => Vec::new(),
    }
}
