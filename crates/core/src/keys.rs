pub use domain_key::KeyParseError;
use domain_key::{define_domain, key_type};

define_domain!(PrameterDomain, "parameter");
key_type!(ParameterKey, PrameterDomain);

define_domain!(CredentialDomain, "credential");
key_type!(CredentialKey, CredentialDomain);

define_domain!(NodeDomain, "node");
key_type!(NodeKey, NodeDomain);

define_domain!(PluginDomain, "plugin");
key_type!(PluginKey, PluginDomain);

/// Error returned when a string fails to parse as a [`NodeKey`].
pub type NodeKeyError = KeyParseError;

/// Error returned when a string fails to parse as a [`PluginKey`].
pub type PluginKeyError = KeyParseError;
