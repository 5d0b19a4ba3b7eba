//! Dependency management: BOM imports, de-duplication and fill-in.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;

use crate::context::Context;
use crate::errors::ResolveResult;
use crate::merge::DescriptorMerger;
use crate::registry::pom::{Dependency, DependencyKey, Project};

/// Keep the first declaration of every management key, in order.
pub fn dedupe(dependencies: Vec<Dependency>) -> Vec<Dependency> {
    let mut seen: HashSet<DependencyKey> = HashSet::new();
    dependencies
        .into_iter()
        .filter(|dep| seen.insert(dep.key()))
        .collect()
}

/// Fill unspecified version, scope and exclusions from the managed entry
/// with the same key. Declared values are never touched.
pub fn apply_management(managed: &[Dependency], dependencies: &mut [Dependency]) {
    let index: HashMap<DependencyKey, &Dependency> =
        managed.iter().map(|m| (m.key(), m)).collect();
    for dep in dependencies {
        let Some(entry) = index.get(&dep.key()) else {
            continue;
        };
        if dep.version.is_empty() {
            dep.version = entry.version.clone();
        }
        if dep.scope.is_empty() {
            dep.scope = entry.scope.clone();
        }
        if dep.exclusions.is_empty() {
            dep.exclusions = entry.exclusions.clone();
        }
    }
}

/// Replace BOM imports with the imported entries, then de-duplicate and
/// apply management to the dependency list.
pub(crate) async fn process_dependencies(
    merger: &DescriptorMerger<'_>,
    ctx: &Context,
    project: &mut Project,
) -> ResolveResult<()> {
    let (imports, mut managed): (Vec<Dependency>, Vec<Dependency>) =
        std::mem::take(&mut project.dependency_management)
            .into_iter()
            .partition(Dependency::is_import);

    let imports = dedupe(imports);
    let imported = try_join_all(
        imports
            .iter()
            .map(|bom| merger.imported_management(ctx, bom)),
    )
    .await?;
    for entries in imported {
        managed.extend(entries.into_iter().filter(|dep| !dep.is_import()));
    }

    project.dependency_management = dedupe(managed);
    project.dependencies = dedupe(std::mem::take(&mut project.dependencies));
    apply_management(&project.dependency_management, &mut project.dependencies);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::pom::Exclusion;

    #[test]
    fn test_dedupe_keeps_first_by_key() {
        let deps = vec![
            Dependency::new("g", "a", "1"),
            Dependency::new("g", "b", "1"),
            Dependency::new("g", "a", "2"),
            Dependency::new("g", "a", "3").with_type("jar"),
            Dependency::new("g", "a", "4").with_type("test-jar"),
        ];
        let versions: Vec<String> = dedupe(deps).into_iter().map(|d| d.version).collect();
        assert_eq!(versions, vec!["1", "1", "4"]);
    }

    #[test]
    fn test_management_fills_only_gaps() {
        let mut managed = Dependency::new("g", "a", "2.0").with_scope("runtime");
        managed.exclusions.push(Exclusion {
            group_id: "x".into(),
            artifact_id: "y".into(),
        });
        let mut deps = vec![
            Dependency::new("g", "a", ""),
            Dependency::new("g", "b", "1.0"),
        ];
        apply_management(
            &[managed.clone(), Dependency::new("g", "b", "9.9")],
            &mut deps,
        );

        assert_eq!(deps[0].version, "2.0");
        assert_eq!(deps[0].scope, "runtime");
        assert_eq!(deps[0].exclusions, managed.exclusions);
        assert_eq!(deps[1].version, "1.0");
        assert_eq!(deps.len(), 2);
    }
}
