//! `${...}` placeholder expansion.
//!
//! Values come from the merged `<properties>` plus the built-in project
//! coordinates (`project.groupId`, `project.parent.version`, ... and their
//! legacy `pom.*` spellings). A placeholder with no known value is left as
//! written.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::registry::pom::{Dependency, Project, ProjectKey};
use crate::resolve::guards::MAX_INTERPOLATION_PASSES;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// Lookup table for one project's placeholders.
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn for_project(project: &Project) -> Self {
        let mut values: HashMap<String, String> = project
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut builtin = |name: &str, value: &str| {
            if value.is_empty() {
                return;
            }
            for prefix in ["project.", "pom."] {
                values
                    .entry(format!("{prefix}{name}"))
                    .or_insert_with(|| value.to_string());
            }
        };
        builtin("groupId", &project.key.group_id);
        builtin("artifactId", &project.key.artifact_id);
        builtin("version", &project.key.version);
        builtin("packaging", project.effective_packaging());
        if let Some(ProjectKey {
            group_id,
            artifact_id,
            version,
        }) = &project.parent
        {
            builtin("parent.groupId", group_id);
            builtin("parent.artifactId", artifact_id);
            builtin("parent.version", version);
        }

        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Expand placeholders until nothing changes or the pass limit is hit.
    pub fn expand<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !text.contains("${") {
            return Cow::Borrowed(text);
        }
        let mut current = text.to_string();
        for _ in 0..MAX_INTERPOLATION_PASSES {
            let next = PLACEHOLDER_RE.replace_all(&current, |caps: &Captures<'_>| {
                match self.get(&caps[1]) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            });
            if next == current {
                break;
            }
            current = next.into_owned();
        }
        Cow::Owned(current)
    }

    fn expand_in_place(&self, field: &mut String) {
        if let Cow::Owned(expanded) = self.expand(field) {
            *field = expanded;
        }
    }
}

fn expand_dependency(properties: &Properties, dep: &mut Dependency) {
    for field in [
        &mut dep.group_id,
        &mut dep.artifact_id,
        &mut dep.version,
        &mut dep.artifact_type,
        &mut dep.classifier,
        &mut dep.scope,
        &mut dep.optional,
    ] {
        properties.expand_in_place(field);
    }
    for exclusion in &mut dep.exclusions {
        properties.expand_in_place(&mut exclusion.group_id);
        properties.expand_in_place(&mut exclusion.artifact_id);
    }
}

/// Substitute placeholders throughout the project's coordinates, properties,
/// dependencies, dependency management and repositories.
pub fn interpolate(project: &mut Project) {
    let properties = Properties::for_project(project);

    properties.expand_in_place(&mut project.key.group_id);
    properties.expand_in_place(&mut project.key.artifact_id);
    properties.expand_in_place(&mut project.key.version);
    for value in project.properties.values_mut() {
        properties.expand_in_place(value);
    }
    for dep in project
        .dependencies
        .iter_mut()
        .chain(project.dependency_management.iter_mut())
    {
        expand_dependency(&properties, dep);
    }
    for repository in &mut project.repositories {
        properties.expand_in_place(&mut repository.url);
    }
}
