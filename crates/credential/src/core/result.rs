//! Outcomes of credential initialization flows.

/// Result of starting or resuming a credential's authentication flow.
///
/// Flows such as OAuth2 authorization-code or device-code require one or
/// more round trips with the user before a usable state exists; `Pending`
/// lets a credential describe that without blocking the caller.
#[derive(Debug, Clone)]
pub enum InitializeResult<S> {
    /// The flow finished; `state` can be used immediately.
    Complete(S),
    /// The flow needs further interactive steps before `state` is usable.
    Pending {
        /// Opaque token the caller presents to resume the flow.
        continuation: String,
        /// Human-readable instructions for completing the pending step.
        instructions: String,
    },
}

impl<S> InitializeResult<S> {
    /// Returns `true` if the flow is complete.
    pub fn is_complete(&self) -> bool {
        matches!(self, InitializeResult::Complete(_))
    }

    /// Returns the completed state, if any.
    pub fn into_state(self) -> Option<S> {
        match self {
            InitializeResult::Complete(state) => Some(state),
            InitializeResult::Pending { .. } => None,
        }
    }
}
