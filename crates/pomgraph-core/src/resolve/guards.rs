//! Shared guardrails for descriptor merging.

/// Deepest parent chain followed before resolution fails.
pub const MAX_PARENT_DEPTH: usize = 100;

/// Placeholder expansion passes; bounds `${a}` -> `${b}` -> ... chains.
pub const MAX_INTERPOLATION_PASSES: usize = 10;

/// Separator of the `Registries` version attribute.
pub const REGISTRY_SEPARATOR: char = '|';

/// Prefix marking a registry entry as a dependency repository.
pub const REGISTRY_PREFIX: &str = "dep:";
