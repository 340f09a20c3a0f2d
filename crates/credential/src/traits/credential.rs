//! Base trait implemented by every credential kind.

use async_trait::async_trait;

use crate::core::result::InitializeResult;
use crate::core::{CredentialContext, CredentialDescription, CredentialError, CredentialState};

/// A credential authentication flow: initialize from input, refresh, revoke.
///
/// `Input` carries whatever the flow needs to start (an API key, a
/// username/password pair, OAuth2 client credentials); `State` is the
/// persisted, versioned state produced once initialization completes.
#[async_trait]
pub trait Credential: Send + Sync {
    /// Parameters needed to initialize this credential.
    type Input: Send + Sync;
    /// Persisted state produced by a successful initialization.
    type State: CredentialState;

    /// Describes this credential kind for registries and UIs.
    fn description(&self) -> CredentialDescription;

    /// Starts (or completes, for non-interactive flows) the credential's
    /// authentication flow.
    async fn initialize(
        &self,
        input: &Self::Input,
        ctx: &mut CredentialContext,
    ) -> Result<InitializeResult<Self::State>, CredentialError>;

    /// Refreshes `state` in place (e.g. exchanges a refresh token).
    async fn refresh(
        &self,
        state: &mut Self::State,
        ctx: &mut CredentialContext,
    ) -> Result<(), CredentialError>;

    /// Revokes `state` with the upstream system, if supported.
    async fn revoke(
        &self,
        state: &mut Self::State,
        ctx: &mut CredentialContext,
    ) -> Result<(), CredentialError>;
}
