//! Parent chain inheritance.

use std::collections::HashSet;

use tracing::debug;

use crate::context::Context;
use crate::errors::{ResolveError, ResolveResult};
use crate::merge::profiles::merge_default_profiles;
use crate::registry::pom::{Project, ProjectKey};
use crate::registry::MavenRegistryApiClient;

/// Fill an absent group or version from the declared parent.
fn inherit_coordinates(key: &mut ProjectKey, parent: &ProjectKey) {
    if key.group_id.is_empty() {
        key.group_id = parent.group_id.clone();
    }
    if key.version.is_empty() {
        key.version = parent.version.clone();
    }
}

fn check_parent(expected: &ProjectKey, parent: &Project) -> ResolveResult<()> {
    if parent.key != *expected {
        return Err(ResolveError::ParentMismatch {
            expected: expected.to_string(),
            found: parent.key.to_string(),
        });
    }
    let packaging = parent.effective_packaging();
    if packaging != "pom" {
        return Err(ResolveError::InvalidParentPackaging {
            coordinate: expected.to_string(),
            packaging: packaging.to_string(),
        });
    }
    Ok(())
}

/// Merge one ancestor into the accumulated descriptor. The child's values
/// always win; the ancestor only fills gaps and appends.
fn merge_parent(child: &mut Project, parent: Project) {
    inherit_coordinates(&mut child.key, &parent.key);
    for (name, value) in parent.properties {
        child.properties.entry(name).or_insert(value);
    }
    child
        .dependency_management
        .extend(parent.dependency_management);
    child.dependencies.extend(parent.dependencies);
    for repository in parent.repositories {
        if !child.repositories.iter().any(|r| r.url == repository.url) {
            child.repositories.push(repository);
        }
    }
}

/// Walk the declared parent chain of `project`, fetching and merging every
/// ancestor in order. The chain ends at the first incomplete parent key.
///
/// `project.parent` is left in place so `${project.parent.*}` still
/// resolves; the caller clears it once the descriptor is final.
pub async fn merge_parents(
    api: &MavenRegistryApiClient,
    ctx: &Context,
    project: &mut Project,
    max_depth: usize,
) -> ResolveResult<()> {
    let Some(declared) = project.parent.clone() else {
        return Ok(());
    };
    inherit_coordinates(&mut project.key, &declared);

    let mut visited: HashSet<ProjectKey> = HashSet::new();
    visited.insert(project.key.clone());

    let mut next = Some(declared);
    let mut depth = 0usize;
    while let Some(key) = next.take().filter(ProjectKey::is_complete) {
        depth += 1;
        if depth > max_depth {
            return Err(ResolveError::ParentDepthExceeded {
                coordinate: project.key.to_string(),
                max_depth,
            });
        }
        if !visited.insert(key.clone()) {
            return Err(ResolveError::ParentCycle(key.to_string()));
        }

        debug!("merging parent {key} into {}", project.key);
        let mut parent = api
            .get_project(ctx, &key.group_id, &key.artifact_id, &key.version)
            .await?;
        if let Some(grandparent) = &parent.parent {
            inherit_coordinates(&mut parent.key, grandparent);
        }
        check_parent(&key, &parent)?;
        merge_default_profiles(&mut parent);

        next = parent.parent.take();
        merge_parent(project, parent);
    }
    Ok(())
}
