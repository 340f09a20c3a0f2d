//! The unified node/action registry (spec component C1).
//!
//! Blueprints reference callables by a dotted import path scoped to one of
//! nine kind spaces — `tool`, `agent`, `workflow`, `llm_operator`, `code`,
//! `executor`, `monitor`, `prompt_template`, `chain` — mirroring a dynamic
//! `module:callable` import. Rust has no runtime dynamic-import mechanism,
//! so each space holds factories linked into the binary at compile time;
//! resolving an `import` string looks the factory up by key, the closest
//! idiomatic analogue of an import path that must already be valid at
//! process start.
//!
//! Manifest-declared plugins with `allow_dynamic: true` instead go through
//! [`nebula_plugin::PluginLoader`], which loads a `cdylib` exporting a
//! `create_plugin` symbol — the same FFI mechanism `nebula-plugin` already
//! implements, unchanged here.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use nebula_plugin::PluginRegistry;

use crate::error::WorkflowError;

/// A factory producing a type-erased, boxed instance of a registered
/// callable (an action, a chain step, a prompt template renderer, ...).
pub type Factory = Arc<dyn Fn() -> Arc<dyn Any + Send + Sync> + Send + Sync>;

/// A registered factory plus the import path it was bound under, kept so a
/// later `register()` call at the same `name` can tell a no-op
/// re-registration apart from a genuine collision.
#[derive(Clone)]
struct Entry {
    import_path: String,
    factory: Factory,
}

/// The nine callable kind spaces a blueprint's `import` path can resolve
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrySpace {
    /// Stateless tool actions.
    Tool,
    /// Autonomous agent definitions.
    Agent,
    /// Sub-workflows invocable from a `workflow` node.
    Workflow,
    /// LLM provider operators.
    LlmOperator,
    /// Sandboxed code snippets registered ahead of time.
    Code,
    /// Generic executors not covered by the other spaces.
    Executor,
    /// Monitoring probes.
    Monitor,
    /// Reusable prompt templates.
    PromptTemplate,
    /// Named reusable sub-chains of nodes.
    Chain,
}

impl RegistrySpace {
    /// All spaces, in the order spec §4.1 lists them.
    pub const ALL: [RegistrySpace; 9] = [
        Self::Tool,
        Self::Agent,
        Self::Workflow,
        Self::LlmOperator,
        Self::Code,
        Self::Executor,
        Self::Monitor,
        Self::PromptTemplate,
        Self::Chain,
    ];
}

impl fmt::Display for RegistrySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Tool => "tool",
            Self::Agent => "agent",
            Self::Workflow => "workflow",
            Self::LlmOperator => "llm_operator",
            Self::Code => "code",
            Self::Executor => "executor",
            Self::Monitor => "monitor",
            Self::PromptTemplate => "prompt_template",
            Self::Chain => "chain",
        };
        f.write_str(s)
    }
}

/// The registry facade: one factory map per [`RegistrySpace`], plus the
/// manifest-driven plugin registry for dynamically-loaded components.
pub struct Registry {
    spaces: DashMap<&'static str, DashMap<String, Entry>>,
    plugins: PluginRegistry,
}

impl Registry {
    /// Create an empty registry with all nine spaces pre-allocated.
    #[must_use]
    pub fn new() -> Self {
        let spaces = DashMap::new();
        for space in RegistrySpace::ALL {
            spaces.insert(space_key(space), DashMap::new());
        }
        Self {
            spaces,
            plugins: PluginRegistry::new(),
        }
    }

    /// Register a factory under `space` at `name` (e.g. `"openai"`),
    /// recording the `import_path` it was loaded from (e.g.
    /// `"nebula_llm::openai::Factory"`).
    ///
    /// Idempotent: registering the same `name`/`import_path` pair again is
    /// a no-op. Registering a different `import_path` under a `name` that
    /// already resolves elsewhere is a collision and returns
    /// [`WorkflowError::DuplicateRegistration`] unless `force` is set, in
    /// which case the existing factory is replaced.
    pub fn register(
        &self,
        space: RegistrySpace,
        name: impl Into<String>,
        import_path: impl Into<String>,
        factory: Factory,
        force: bool,
    ) -> Result<(), WorkflowError> {
        let name = name.into();
        let import_path = import_path.into();
        let map = self.spaces.get(space_key(space)).expect("all spaces pre-allocated");

        if let Some(existing) = map.get(&name) {
            if existing.import_path == import_path {
                return Ok(());
            }
            if !force {
                return Err(WorkflowError::DuplicateRegistration {
                    space: space.to_string(),
                    name,
                    existing_import_path: existing.import_path.clone(),
                });
            }
        }
        map.insert(name, Entry { import_path, factory });
        Ok(())
    }

    /// Register a factory under `space` at `name`, replacing whatever was
    /// previously bound there regardless of its `import_path`. The explicit
    /// `force=true` path of [`Registry::register`].
    pub fn register_or_replace(
        &self,
        space: RegistrySpace,
        name: impl Into<String>,
        import_path: impl Into<String>,
        factory: Factory,
    ) {
        self.register(space, name, import_path, factory, true)
            .expect("force=true registration cannot fail");
    }

    /// Resolve `name` within `space`, instantiating a fresh callable from
    /// its factory.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UnknownImport`] if no factory is
    /// registered under that name.
    pub fn resolve(
        &self,
        space: RegistrySpace,
        name: &str,
    ) -> Result<Arc<dyn Any + Send + Sync>, WorkflowError> {
        let factories = self.spaces.get(space_key(space)).expect("pre-allocated");
        let entry = factories
            .get(name)
            .ok_or_else(|| WorkflowError::UnknownImport {
                space: space.to_string(),
                import: name.to_owned(),
            })?;
        Ok((entry.factory)())
    }

    /// Whether `import` resolves within `space`.
    #[must_use]
    pub fn contains(&self, space: RegistrySpace, import: &str) -> bool {
        self.spaces
            .get(space_key(space))
            .is_some_and(|f| f.contains_key(import))
    }

    /// Access the manifest/dynamic-loading plugin registry directly, for
    /// `allow_dynamic` imports the compile-time spaces above cannot serve.
    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn space_key(space: RegistrySpace) -> &'static str {
    match space {
        RegistrySpace::Tool => "tool",
        RegistrySpace::Agent => "agent",
        RegistrySpace::Workflow => "workflow",
        RegistrySpace::LlmOperator => "llm_operator",
        RegistrySpace::Code => "code",
        RegistrySpace::Executor => "executor",
        RegistrySpace::Monitor => "monitor",
        RegistrySpace::PromptTemplate => "prompt_template",
        RegistrySpace::Chain => "chain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_factory(n: i32) -> Factory {
        Arc::new(move || Arc::new(n) as Arc<dyn Any + Send + Sync>)
    }

    #[test]
    fn register_and_resolve_roundtrip() {
        let registry = Registry::new();
        registry
            .register(RegistrySpace::Tool, "http.request", "pkg::http::Request", int_factory(42), false)
            .unwrap();
        assert!(registry.contains(RegistrySpace::Tool, "http.request"));
        let resolved = registry.resolve(RegistrySpace::Tool, "http.request").unwrap();
        assert_eq!(*resolved.downcast::<i32>().unwrap(), 42);
    }

    #[test]
    fn unknown_import_is_an_error() {
        let registry = Registry::new();
        let err = registry.resolve(RegistrySpace::Agent, "nope").unwrap_err();
        assert!(matches!(err, WorkflowError::UnknownImport { .. }));
    }

    #[test]
    fn spaces_are_isolated() {
        let registry = Registry::new();
        registry
            .register(RegistrySpace::Tool, "shared.name", "pkg::a", int_factory(1), false)
            .unwrap();
        assert!(!registry.contains(RegistrySpace::Agent, "shared.name"));
    }

    #[test]
    fn same_name_same_path_reregistration_is_a_no_op() {
        let registry = Registry::new();
        registry
            .register(RegistrySpace::Tool, "http.request", "pkg::http::Request", int_factory(1), false)
            .unwrap();
        registry
            .register(RegistrySpace::Tool, "http.request", "pkg::http::Request", int_factory(2), false)
            .unwrap();
        let resolved = registry.resolve(RegistrySpace::Tool, "http.request").unwrap();
        assert_eq!(*resolved.downcast::<i32>().unwrap(), 1);
    }

    #[test]
    fn same_name_different_path_without_force_errors() {
        let registry = Registry::new();
        registry
            .register(RegistrySpace::Tool, "http.request", "pkg::http::Request", int_factory(1), false)
            .unwrap();
        let err = registry
            .register(RegistrySpace::Tool, "http.request", "other_pkg::Request", int_factory(2), false)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateRegistration { .. }));

        let resolved = registry.resolve(RegistrySpace::Tool, "http.request").unwrap();
        assert_eq!(*resolved.downcast::<i32>().unwrap(), 1);
    }

    #[test]
    fn same_name_different_path_with_force_replaces() {
        let registry = Registry::new();
        registry
            .register(RegistrySpace::Tool, "http.request", "pkg::http::Request", int_factory(1), false)
            .unwrap();
        registry.register_or_replace(RegistrySpace::Tool, "http.request", "other_pkg::Request", int_factory(2));

        let resolved = registry.resolve(RegistrySpace::Tool, "http.request").unwrap();
        assert_eq!(*resolved.downcast::<i32>().unwrap(), 2);
    }
}
