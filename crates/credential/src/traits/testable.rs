//! Self-testing credentials.

use async_trait::async_trait;

use super::Credential;
use crate::rotation::validation::TestResult;
use crate::rotation::RotationResult;

/// A credential that can verify its own usability against the backing system
/// it authenticates to (e.g. opening a connection, calling a cheap API).
///
/// This is the seam rotation uses to validate a freshly rotated credential
/// before committing to it and retiring the old one.
#[async_trait]
pub trait TestableCredential: Credential {
    /// Exercise the credential against its backing system and report the outcome.
    async fn test(&self) -> RotationResult<TestResult>;
}
