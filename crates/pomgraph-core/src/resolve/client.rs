//! Resolution client: the four lookups a dependency-graph engine asks of a
//! package registry, answered from a Maven repository.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::RegistryConfig;
use crate::context::Context;
use crate::errors::{ResolveError, ResolveResult};
use crate::merge::DescriptorMerger;
use crate::models::{
    AttrSet, Coordinate, DependencyType, PackageKey, Requirement, System, Version, VersionAttr,
    VersionKey, VersionType,
};
use crate::registry::pom::{Dependency, Project, Repository};
use crate::registry::MavenRegistryApiClient;
use crate::resolve::guards::{REGISTRY_PREFIX, REGISTRY_SEPARATOR};
use crate::semver::{compare, VersionRequirement};
use crate::store;

/// Reject anything this client cannot serve before touching the network.
fn maven_coordinate(package: &PackageKey) -> ResolveResult<Coordinate> {
    if package.system != System::Maven {
        return Err(ResolveError::WrongSystem(package.system));
    }
    package.coordinate()
}

fn registries_attr(repositories: &[Repository]) -> Option<String> {
    if repositories.is_empty() {
        return None;
    }
    let entries: Vec<String> = repositories
        .iter()
        .map(|r| format!("{REGISTRY_PREFIX}{}", r.url))
        .collect();
    Some(entries.join(&REGISTRY_SEPARATOR.to_string()))
}

fn non_default(value: &str, default: &str) -> Option<String> {
    if value.is_empty() || value == default {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn dependency_type(dep: &Dependency) -> DependencyType {
    DependencyType {
        scope: non_default(&dep.scope, "compile"),
        optional: dep.is_optional(),
        artifact_type: non_default(&dep.artifact_type, "jar"),
        classifier: non_default(&dep.classifier, ""),
        exclusions: dep
            .exclusions
            .iter()
            .map(|e| format!("{}:{}", e.group_id, e.artifact_id))
            .collect(),
    }
}

fn requirement_for(dep: &Dependency) -> Requirement {
    Requirement {
        key: VersionKey::new(
            PackageKey::maven(dep.name()),
            dep.version.clone(),
            VersionType::Requirement,
        ),
        dep_type: dependency_type(dep),
    }
}

/// Answers version, listing and requirement queries for Maven packages.
///
/// Cheap to clone; clones share one registry client and therefore one
/// response cache.
#[derive(Clone)]
pub struct ResolutionClient {
    api: Arc<MavenRegistryApiClient>,
}

impl ResolutionClient {
    pub fn new(config: RegistryConfig) -> ResolveResult<Self> {
        Ok(Self::with_api(Arc::new(MavenRegistryApiClient::new(config)?)))
    }

    pub fn with_api(api: Arc<MavenRegistryApiClient>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &Arc<MavenRegistryApiClient> {
        &self.api
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Metadata of one concrete version. The descriptor's own repositories
    /// are reported in the `Registries` attribute.
    pub async fn version(&self, ctx: &Context, key: &VersionKey) -> ResolveResult<Version> {
        let coordinate = maven_coordinate(&key.package)?;
        let project = self
            .api
            .get_project(ctx, &coordinate.group_id, &coordinate.artifact_id, &key.version)
            .await?;

        let mut attrs = AttrSet::default();
        if let Some(registries) = registries_attr(&project.repositories) {
            attrs.set_attr(VersionAttr::Registries, registries);
        }
        Ok(Version::new(key.clone(), attrs))
    }

    /// Every version in the artifact's listing, ascending. Versions missing
    /// from `maven-metadata.xml` are not discovered.
    pub async fn versions(&self, ctx: &Context, package: &PackageKey) -> ResolveResult<Vec<Version>> {
        let coordinate = maven_coordinate(package)?;
        let metadata = self
            .api
            .get_artifact_metadata(ctx, &coordinate.group_id, &coordinate.artifact_id)
            .await?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut listed: Vec<&str> = metadata
            .versioning
            .versions
            .iter()
            .map(String::as_str)
            .filter(|v| seen.insert(*v))
            .collect();
        listed.sort_by(|a, b| compare(a, b));
        debug!("{} lists {} versions", package.name, listed.len());

        Ok(listed
            .into_iter()
            .map(|v| {
                Version::new(
                    VersionKey::new(package.clone(), v, VersionType::Concrete),
                    AttrSet::default(),
                )
            })
            .collect())
    }

    /// Direct dependencies of a version after full descriptor merging, one
    /// per effective dependency in declaration order.
    pub async fn requirements(&self, ctx: &Context, key: &VersionKey) -> ResolveResult<Vec<Requirement>> {
        let project = self.effective_project(ctx, key).await?;
        Ok(project.dependencies.iter().map(requirement_for).collect())
    }

    /// Listed versions satisfying the requirement in `key.version`. The key
    /// must be a requirement key; a concrete key is malformed input.
    pub async fn matching_versions(&self, ctx: &Context, key: &VersionKey) -> ResolveResult<Vec<Version>> {
        maven_coordinate(&key.package)?;
        if key.version_type != VersionType::Requirement {
            return Err(ResolveError::InvalidRequirement {
                requirement: key.version.clone(),
                reason: "expected a requirement key, got a concrete version".to_string(),
            });
        }
        let requirement = VersionRequirement::parse(&key.version)?;
        let versions = self.versions(ctx, &key.package).await?;
        Ok(versions
            .into_iter()
            .filter(|v| requirement.matches(v.version()))
            .collect())
    }

    /// The fully merged descriptor behind [`requirements`](Self::requirements).
    pub async fn effective_project(&self, ctx: &Context, key: &VersionKey) -> ResolveResult<Project> {
        let coordinate = maven_coordinate(&key.package)?;
        let project = self
            .api
            .get_project(ctx, &coordinate.group_id, &coordinate.artifact_id, &key.version)
            .await?;
        debug!("merging descriptor of {key}");
        DescriptorMerger::new(&self.api)
            .effective_project(ctx, project)
            .await
    }

    // -----------------------------------------------------------------------
    // Response cache persistence
    // -----------------------------------------------------------------------

    /// Must not run while requests on this client are in flight.
    pub fn write_cache(&self, path: impl AsRef<Path>) -> ResolveResult<()> {
        store::write_cache(&self.api, path.as_ref())
    }

    /// Must not run while requests on this client are in flight.
    pub fn load_cache(&self, path: impl AsRef<Path>) -> ResolveResult<()> {
        store::load_cache(&self.api, path.as_ref())
    }
}
