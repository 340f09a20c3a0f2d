//! Human-readable credential descriptions, used for registry discovery and UI display.

use super::error::ValidationError;

/// Descriptive metadata for a credential kind.
///
/// Returned by [`crate::traits::Credential::description`]; `key` is the
/// stable lookup identifier, `name`/`description` are display text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialDescription {
    pub key: String,
    pub name: String,
    pub description: String,
}

impl CredentialDescription {
    /// Starts a builder for a new description.
    pub fn builder() -> CredentialDescriptionBuilder {
        CredentialDescriptionBuilder::default()
    }
}

/// Builder for [`CredentialDescription`].
#[derive(Debug, Clone, Default)]
pub struct CredentialDescriptionBuilder {
    key: Option<String>,
    name: Option<String>,
    description: Option<String>,
}

impl CredentialDescriptionBuilder {
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates and builds the description. Requires a non-empty `key`.
    pub fn build(self) -> Result<CredentialDescription, ValidationError> {
        let key = self.key.unwrap_or_default();
        if key.is_empty() {
            return Err(ValidationError::EmptyCredentialId);
        }
        Ok(CredentialDescription {
            key,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        })
    }
}
