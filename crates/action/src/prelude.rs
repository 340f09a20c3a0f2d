//! Convenience re-exports for action authors.
//!
//! ```rust,ignore
//! use nebula_action::prelude::*;
//! ```

pub use crate::action::Action;
pub use crate::context::{ActionContext, ActionLogger, ActionMetrics, CredentialProvider, SecureString};
pub use crate::error::ActionError;
pub use crate::metadata::{ActionMetadata, ActionType, ExecutionMode};
pub use crate::output::NodeOutputData;
pub use crate::result::{ActionResult, BreakReason, BranchKey, WaitCondition};
pub use crate::types::ProcessAction;
pub use crate::types::StatefulAction;
pub use crate::types::TriggerAction;
