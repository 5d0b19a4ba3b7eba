//! Shared typed models exchanged with the dependency-graph engine.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ResolveError, ResolveResult};
use crate::semver;

// ---------------------------------------------------------------------------
// 1. System
// ---------------------------------------------------------------------------

/// Package ecosystem a key belongs to. This client only serves `Maven`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum System {
    Maven,
    Npm,
    PyPI,
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            System::Maven => "Maven",
            System::Npm => "npm",
            System::PyPI => "PyPI",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// 2. Coordinate
// ---------------------------------------------------------------------------

/// A Maven `group:artifact` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    pub group_id: String,
    pub artifact_id: String,
}

impl Coordinate {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

impl FromStr for Coordinate {
    type Err = ResolveError;

    fn from_str(name: &str) -> ResolveResult<Self> {
        let (group_id, artifact_id) = name
            .split_once(':')
            .ok_or_else(|| ResolveError::InvalidCoordinate(name.to_string()))?;
        Ok(Self::new(group_id, artifact_id))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

// ---------------------------------------------------------------------------
// 3. PackageKey / VersionKey
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    pub system: System,
    pub name: String,
}

impl PackageKey {
    pub fn maven(name: impl Into<String>) -> Self {
        Self {
            system: System::Maven,
            name: name.into(),
        }
    }

    pub fn coordinate(&self) -> ResolveResult<Coordinate> {
        self.name.parse()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VersionType {
    /// A specific published version.
    Concrete,
    /// A range or soft requirement as declared by a dependent.
    Requirement,
}

/// Identity of one version (or one version requirement) of a package.
///
/// Two keys are equal when their packages and kinds match and their version
/// strings compare equal under Maven ordering, so `1.0` equals `1.0.0`.
#[derive(Clone, Debug)]
pub struct VersionKey {
    pub package: PackageKey,
    pub version: String,
    pub version_type: VersionType,
}

impl VersionKey {
    pub fn new(package: PackageKey, version: impl Into<String>, version_type: VersionType) -> Self {
        Self {
            package,
            version: version.into(),
            version_type,
        }
    }

    pub fn concrete(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(PackageKey::maven(name), version, VersionType::Concrete)
    }

    pub fn requirement(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(PackageKey::maven(name), version, VersionType::Requirement)
    }

    pub fn system(&self) -> System {
        self.package.system
    }

    pub fn name(&self) -> &str {
        &self.package.name
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionKey {}

impl Hash for VersionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.package.hash(state);
        self.version_type.hash(state);
        semver::canonical(&self.version).hash(state);
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.package
            .cmp(&other.package)
            .then(self.version_type.cmp(&other.version_type))
            .then_with(|| semver::compare(&self.version, &other.version))
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package.name, self.version)
    }
}

// ---------------------------------------------------------------------------
// 4. Version attributes
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VersionAttr {
    /// `|`-joined list of extra registries, each prefixed with `dep:`.
    Registries,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttrSet {
    attrs: BTreeMap<VersionAttr, String>,
}

impl AttrSet {
    pub fn set_attr(&mut self, attr: VersionAttr, value: impl Into<String>) {
        self.attrs.insert(attr, value.into());
    }

    pub fn get_attr(&self, attr: VersionAttr) -> Option<&str> {
        self.attrs.get(&attr).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// A version as served by the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Version {
    pub key: VersionKey,
    pub attrs: AttrSet,
}

impl Version {
    pub(crate) fn new(key: VersionKey, attrs: AttrSet) -> Self {
        Self { key, attrs }
    }

    pub fn version(&self) -> &str {
        &self.key.version
    }
}

// ---------------------------------------------------------------------------
// 5. Requirement
// ---------------------------------------------------------------------------

/// Scope, optionality and artifact shape of a dependency edge.
///
/// Defaults are left out: a `compile` scope, `jar` type and empty classifier
/// are stored as `None` so equal edges compare equal however they were
/// spelled in the descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyType {
    pub scope: Option<String>,
    pub optional: bool,
    pub artifact_type: Option<String>,
    pub classifier: Option<String>,
    /// Excluded `group:artifact` patterns, in declaration order.
    pub exclusions: Vec<String>,
}

impl DependencyType {
    pub fn is_test(&self) -> bool {
        self.scope.as_deref() == Some("test")
    }
}

/// A dependency edge: a requirement key plus its dependency type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    pub key: VersionKey,
    pub dep_type: DependencyType,
}

impl Requirement {
    pub fn name(&self) -> &str {
        self.key.name()
    }

    pub fn version(&self) -> &str {
        &self.key.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_requires_delimiter() {
        let err = "lib-without-colon".parse::<Coordinate>().unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCoordinate(name) if name == "lib-without-colon"));
    }

    #[test]
    fn test_coordinate_splits_on_first_colon() {
        let coordinate: Coordinate = "org.example:lib:extra".parse().unwrap();
        assert_eq!(coordinate.group_id, "org.example");
        assert_eq!(coordinate.artifact_id, "lib:extra");
        assert_eq!(coordinate.to_string(), "org.example:lib:extra");
    }

    #[test]
    fn test_version_key_equality_uses_maven_rules() {
        let a = VersionKey::concrete("org.example:lib", "1.0");
        let b = VersionKey::concrete("org.example:lib", "1.0.0");
        let c = VersionKey::concrete("org.example:lib", "1.0.1");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn test_version_key_hash_agrees_with_eq() {
        use std::collections::HashSet;

        let mut keys = HashSet::new();
        keys.insert(VersionKey::concrete("org.example:lib", "1.0"));
        keys.insert(VersionKey::concrete("org.example:lib", "1.0.0"));
        keys.insert(VersionKey::concrete("org.example:lib", "1.0-ga"));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_version_key_ordering_is_numeric() {
        let mut keys = vec![
            VersionKey::concrete("g:a", "1.10"),
            VersionKey::concrete("g:a", "1.9"),
            VersionKey::concrete("g:a", "1.2"),
        ];
        keys.sort();
        let versions: Vec<&str> = keys.iter().map(|k| k.version.as_str()).collect();
        assert_eq!(versions, vec!["1.2", "1.9", "1.10"]);
    }

    #[test]
    fn test_attr_set() {
        let mut attrs = AttrSet::default();
        assert!(attrs.is_empty());
        attrs.set_attr(VersionAttr::Registries, "dep:https://a|dep:https://b");
        assert_eq!(
            attrs.get_attr(VersionAttr::Registries),
            Some("dep:https://a|dep:https://b")
        );
    }
}
