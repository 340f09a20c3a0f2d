//! Runtime component collection a [`Plugin`](crate::Plugin) registers into.

use std::sync::Arc;

use nebula_action::handler::InternalHandler;

/// The actions and credential requirements a single [`Plugin`](crate::Plugin)
/// contributes to the workflow engine.
///
/// `Plugin::register` is handed a `&mut PluginComponents` and fills it in;
/// the host application then drains it into its own `ActionRegistry` (see
/// `nebula_runtime::registry::ActionRegistry`) and credential provisioning
/// layer.
#[derive(Default)]
pub struct PluginComponents {
    actions: Vec<Arc<dyn InternalHandler>>,
    /// Credential type keys (e.g. `"slack_oauth2"`) this plugin's actions
    /// depend on. Declarative only — resolving them is the host's job.
    required_credentials: Vec<String>,
}

impl std::fmt::Debug for PluginComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginComponents")
            .field("actions", &self.actions.len())
            .field("required_credentials", &self.required_credentials)
            .finish()
    }
}

impl PluginComponents {
    /// Create an empty component collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action handler.
    pub fn register_action(&mut self, handler: Arc<dyn InternalHandler>) -> &mut Self {
        self.actions.push(handler);
        self
    }

    /// Declare a credential type key this plugin's actions require.
    pub fn require_credential(&mut self, credential_type: impl Into<String>) -> &mut Self {
        self.required_credentials.push(credential_type.into());
        self
    }

    /// The registered action handlers.
    #[must_use]
    pub fn actions(&self) -> &[Arc<dyn InternalHandler>] {
        &self.actions
    }

    /// The declared credential type keys.
    #[must_use]
    pub fn required_credentials(&self) -> &[String] {
        &self.required_credentials
    }
}
