//! Versioned state marker trait implemented by concrete credential state types.

/// Marker trait for a credential's persisted, serializable state.
///
/// `VERSION` lets a stored state be migrated forward when its shape changes;
/// `KIND` is the stable identifier used for registry lookup and storage
/// namespacing.
pub trait CredentialState: Send + Sync + Clone + 'static {
    /// Schema version, bumped whenever the state's fields change shape.
    const VERSION: u16;
    /// Stable identifier for the credential kind this state belongs to.
    const KIND: &'static str;
}
