//! pomgraph core library: Maven registry metadata for dependency-graph
//! builders.
//!
//! A [`ResolutionClient`] answers the four questions a graph engine asks of a
//! package registry: what a version looks like, which versions exist, what a
//! version depends on, and which versions satisfy a requirement. Answers come
//! from a Maven repository layout over HTTP. Descriptors are merged with
//! their parents, default profiles and imported dependency management before
//! dependencies are reported. Registry responses are cached in memory
//! and the cache can be saved to and restored from disk.

pub mod config;
pub mod context;
pub mod errors;
pub mod merge;
pub mod models;
pub mod registry;
pub mod resolve;
pub mod semver;
pub mod store;

pub use config::RegistryConfig;
pub use context::Context;
pub use errors::{ErrorKind, ResolveError, ResolveResult};
pub use models::{
    AttrSet, Coordinate, DependencyType, PackageKey, Requirement, System, Version, VersionAttr,
    VersionKey, VersionType,
};
pub use resolve::ResolutionClient;
