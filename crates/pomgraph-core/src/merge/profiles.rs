//! Default profile merging.
//!
//! Only profiles marked `<activeByDefault>true</activeByDefault>` are
//! applied. JDK, OS, property and file activation are never evaluated here,
//! so profiles relying on them stay dormant whatever the build environment.

use crate::registry::pom::{Dependency, Profile, Project};

fn is_default_active(profile: &Profile) -> bool {
    profile.activation.active_by_default
}

/// Add `additions` to `list`; an addition with the key of an existing entry
/// replaces it in place, otherwise it is appended.
pub(crate) fn inject(list: &mut Vec<Dependency>, additions: Vec<Dependency>) {
    for addition in additions {
        let key = addition.key();
        match list.iter().position(|d| d.key() == key) {
            Some(index) => list[index] = addition,
            None => list.push(addition),
        }
    }
}

/// Fold default-active profiles into the project body and drop them from
/// its profile list. Running it twice is a no-op.
pub fn merge_default_profiles(project: &mut Project) {
    let (active, dormant): (Vec<Profile>, Vec<Profile>) = std::mem::take(&mut project.profiles)
        .into_iter()
        .partition(is_default_active);
    project.profiles = dormant;

    for profile in active {
        for (name, value) in profile.properties {
            project.properties.insert(name, value);
        }
        inject(&mut project.dependency_management, profile.dependency_management);
        inject(&mut project.dependencies, profile.dependencies);
        for repository in profile.repositories {
            if !project.repositories.iter().any(|r| r.url == repository.url) {
                project.repositories.push(repository);
            }
        }
    }
}
