//! Shared numeric and string constants used across Nebula crates.

/// Default interface version assigned to a newly created action/node
/// metadata entry (`1.0`).
pub const DEFAULT_INTERFACE_MAJOR: u32 = 1;
pub const DEFAULT_INTERFACE_MINOR: u32 = 0;

/// Default workflow semantic version (`0.1.0`) assigned to a workflow
/// created without an explicit version.
pub const DEFAULT_WORKFLOW_VERSION: (u64, u64, u64) = (0, 1, 0);

/// Maximum length of a domain key's non-version segment (node key, plugin
/// key, parameter key, credential key). Kept generous enough for dotted
/// namespacing (`vendor.category.name`) while bounding pathological input.
pub const MAX_KEY_LEN: usize = 256;

/// Maximum nesting depth the expression templater and dotted-path resolver
/// will walk before giving up, guarding against accidental cycles in
/// deeply self-referential variable maps.
pub const MAX_PATH_DEPTH: usize = 64;
