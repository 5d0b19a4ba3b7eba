//! Registry access: descriptor and listing models, transport, and the
//! caching API client.

pub mod client;
pub mod metadata;
pub mod pom;
pub mod transport;
pub mod xml;

pub use client::MavenRegistryApiClient;
pub use metadata::{Metadata, Versioning};
pub use pom::{
    Activation, Dependency, DependencyKey, Exclusion, Profile, Project, ProjectKey, Repository,
};
pub use transport::{HttpTransport, RawResponse, RegistryTransport};
