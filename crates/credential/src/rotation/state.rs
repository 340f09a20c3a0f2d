//! Rotation transaction state machine.

use serde::{Deserialize, Serialize};

use super::error::{RotationError, RotationResult};

/// Lifecycle state of a [`super::transaction::RotationTransaction`].
///
/// ```text
/// Pending -> Creating -> Validating -> Committing -> Committed
///    \          \            \             /
///     `--------------------- RolledBack ---'
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationState {
    /// Transaction created, no work started yet.
    Pending,
    /// New credential version is being created.
    Creating,
    /// New credential version is being tested before commit.
    Validating,
    /// Swapping the active credential to the new version.
    Committing,
    /// Terminal: rotation succeeded.
    Committed,
    /// Terminal: rotation was abandoned and the old credential stays active.
    RolledBack,
}

impl RotationState {
    /// Validates and returns the transition to `new_state`, or an error
    /// describing why it isn't allowed from the current state.
    pub fn transition_to(&self, new_state: RotationState) -> RotationResult<RotationState> {
        use RotationState::*;
        let allowed = matches!(
            (self, &new_state),
            (Pending, Creating)
                | (Creating, Validating)
                | (Validating, Committing)
                | (Committing, Committed)
                | (Pending | Creating | Validating | Committing, RolledBack)
        );

        if allowed {
            Ok(new_state)
        } else {
            Err(RotationError::InvalidStateTransition {
                from: format!("{self:?}"),
                to: format!("{new_state:?}"),
            })
        }
    }

    /// Returns `true` for `Committed` and `RolledBack`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RotationState::Committed | RotationState::RolledBack)
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, RotationState::Committed)
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, RotationState::RolledBack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_forward_path() {
        assert_eq!(RotationState::Pending.transition_to(RotationState::Creating).unwrap(), RotationState::Creating);
        assert_eq!(RotationState::Creating.transition_to(RotationState::Validating).unwrap(), RotationState::Validating);
        assert_eq!(RotationState::Validating.transition_to(RotationState::Committing).unwrap(), RotationState::Committing);
        assert_eq!(RotationState::Committing.transition_to(RotationState::Committed).unwrap(), RotationState::Committed);
    }

    #[test]
    fn rollback_allowed_from_any_nonterminal_state() {
        assert!(RotationState::Pending.transition_to(RotationState::RolledBack).is_ok());
        assert!(RotationState::Validating.transition_to(RotationState::RolledBack).is_ok());
    }

    #[test]
    fn cannot_skip_states() {
        assert!(RotationState::Pending.transition_to(RotationState::Committed).is_err());
    }

    #[test]
    fn terminal_states_are_final() {
        assert!(RotationState::Committed.transition_to(RotationState::Creating).is_err());
        assert!(RotationState::RolledBack.transition_to(RotationState::Creating).is_err());
    }
}
