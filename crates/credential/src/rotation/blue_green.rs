//! Blue-green rotation: stand up a new credential alongside the active one,
//! validate it, then swap.

use crate::core::CredentialId;

/// Tracks an in-progress blue-green rotation between an active credential
/// and its standby replacement.
#[derive(Debug, Clone)]
pub struct BlueGreenRotation {
    /// Currently active credential.
    pub active_id: CredentialId,
    /// Standby credential being prepared to take over.
    pub standby_id: CredentialId,
}

impl BlueGreenRotation {
    pub fn new(active_id: CredentialId, standby_id: CredentialId) -> Self {
        Self { active_id, standby_id }
    }
}
