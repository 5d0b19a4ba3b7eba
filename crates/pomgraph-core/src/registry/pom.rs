//! Project descriptor (POM) model and XML decoding.
//!
//! Fields are kept as the raw strings found in the document, with `""` for
//! anything absent, so `${...}` placeholders survive until interpolation and
//! "unspecified" is easy to test for during merging.

use std::fmt;

use indexmap::IndexMap;
use roxmltree::Node;

use crate::registry::xml;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProjectKey {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl ProjectKey {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
        }
    }

    /// A parent reference is followed only when all three parts are set.
    pub fn is_complete(&self) -> bool {
        !self.group_id.is_empty() && !self.artifact_id.is_empty() && !self.version.is_empty()
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Identity used to match a dependency against dependency management and to
/// collapse duplicate declarations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DependencyKey {
    pub group_id: String,
    pub artifact_id: String,
    pub artifact_type: String,
    pub classifier: String,
}

// ---------------------------------------------------------------------------
// Dependencies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub artifact_type: String,
    pub classifier: String,
    pub scope: String,
    pub optional: String,
    pub exclusions: Vec<Exclusion>,
}

impl Dependency {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_type(mut self, artifact_type: impl Into<String>) -> Self {
        self.artifact_type = artifact_type.into();
        self
    }

    /// `group:artifact`, the name the graph engine knows this package by.
    pub fn name(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    pub fn key(&self) -> DependencyKey {
        let artifact_type = if self.artifact_type.is_empty() {
            "jar".to_string()
        } else {
            self.artifact_type.clone()
        };
        DependencyKey {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            artifact_type,
            classifier: self.classifier.clone(),
        }
    }

    /// A `<dependencyManagement>` entry importing a bill of materials.
    pub fn is_import(&self) -> bool {
        self.scope == "import" && self.artifact_type == "pom"
    }

    pub fn is_optional(&self) -> bool {
        self.optional.eq_ignore_ascii_case("true")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Repository {
    pub id: String,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Activation {
    pub active_by_default: bool,
    pub jdk: String,
    pub os: bool,
    pub property: String,
    pub file: bool,
}

impl Activation {
    /// Whether activation hinges on the build environment (JDK, OS, a
    /// property or a file), none of which is evaluated here.
    pub fn has_conditions(&self) -> bool {
        !self.jdk.is_empty() || self.os || !self.property.is_empty() || self.file
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub activation: Activation,
    pub properties: IndexMap<String, String>,
    pub dependency_management: Vec<Dependency>,
    pub dependencies: Vec<Dependency>,
    pub repositories: Vec<Repository>,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Project {
    pub key: ProjectKey,
    pub packaging: String,
    pub parent: Option<ProjectKey>,
    pub properties: IndexMap<String, String>,
    pub dependency_management: Vec<Dependency>,
    pub dependencies: Vec<Dependency>,
    pub repositories: Vec<Repository>,
    pub profiles: Vec<Profile>,
}

impl Project {
    /// Decode a POM document. The error string names what was wrong; callers
    /// attach the request it came from.
    pub fn from_xml(text: &str) -> Result<Project, String> {
        let document = xml::parse(text)?;
        let root = document.root_element();
        if root.tag_name().name() != "project" {
            return Err(format!(
                "expected <project> root, found <{}>",
                root.tag_name().name()
            ));
        }

        let parent = child(root, "parent").map(|node| {
            ProjectKey::new(
                child_text(node, "groupId"),
                child_text(node, "artifactId"),
                child_text(node, "version"),
            )
        });

        Ok(Project {
            key: ProjectKey::new(
                child_text(root, "groupId"),
                child_text(root, "artifactId"),
                child_text(root, "version"),
            ),
            packaging: child_text(root, "packaging"),
            parent,
            properties: read_properties(root),
            dependency_management: read_dependency_management(root),
            dependencies: read_dependencies(root),
            repositories: read_repositories(root),
            profiles: read_profiles(root),
        })
    }

    /// Packaging with Maven's default applied.
    pub fn effective_packaging(&self) -> &str {
        if self.packaging.is_empty() {
            "jar"
        } else {
            &self.packaging
        }
    }
}

// ---------------------------------------------------------------------------
// XML helpers
// ---------------------------------------------------------------------------

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn text_of(node: Node<'_, '_>) -> String {
    node.text().map(str::trim).unwrap_or_default().to_string()
}

fn child_text(node: Node<'_, '_>, name: &str) -> String {
    child(node, name).map(text_of).unwrap_or_default()
}

/// Elements nested as `<outer><inner/>...</outer>`.
fn nested<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    outer: &'a str,
    inner: &'a str,
) -> Vec<Node<'a, 'input>> {
    child(node, outer)
        .map(|container| children(container, inner).collect())
        .unwrap_or_default()
}

fn read_dependency(node: Node<'_, '_>) -> Dependency {
    Dependency {
        group_id: child_text(node, "groupId"),
        artifact_id: child_text(node, "artifactId"),
        version: child_text(node, "version"),
        artifact_type: child_text(node, "type"),
        classifier: child_text(node, "classifier"),
        scope: child_text(node, "scope"),
        optional: child_text(node, "optional"),
        exclusions: nested(node, "exclusions", "exclusion")
            .into_iter()
            .map(|n| Exclusion {
                group_id: child_text(n, "groupId"),
                artifact_id: child_text(n, "artifactId"),
            })
            .collect(),
    }
}

fn read_dependencies(node: Node<'_, '_>) -> Vec<Dependency> {
    nested(node, "dependencies", "dependency")
        .into_iter()
        .map(read_dependency)
        .collect()
}

fn read_dependency_management(node: Node<'_, '_>) -> Vec<Dependency> {
    child(node, "dependencyManagement")
        .map(read_dependencies)
        .unwrap_or_default()
}

fn read_properties(node: Node<'_, '_>) -> IndexMap<String, String> {
    let mut properties = IndexMap::new();
    if let Some(container) = child(node, "properties") {
        for property in container.children().filter(|n| n.is_element()) {
            properties
                .entry(property.tag_name().name().to_string())
                .or_insert_with(|| text_of(property));
        }
    }
    properties
}

fn read_repositories(node: Node<'_, '_>) -> Vec<Repository> {
    nested(node, "repositories", "repository")
        .into_iter()
        .map(|n| Repository {
            id: child_text(n, "id"),
            url: child_text(n, "url"),
        })
        .collect()
}

fn read_profiles(node: Node<'_, '_>) -> Vec<Profile> {
    nested(node, "profiles", "profile")
        .into_iter()
        .map(|n| {
            let activation = child(n, "activation")
                .map(|a| Activation {
                    active_by_default: child_text(a, "activeByDefault")
                        .eq_ignore_ascii_case("true"),
                    jdk: child_text(a, "jdk"),
                    os: child(a, "os").is_some(),
                    property: child(a, "property")
                        .map(|p| child_text(p, "name"))
                        .unwrap_or_default(),
                    file: child(a, "file").is_some(),
                })
                .unwrap_or_default();
            Profile {
                id: child_text(n, "id"),
                activation,
                properties: read_properties(n),
                dependency_management: read_dependency_management(n),
                dependencies: read_dependencies(n),
                repositories: read_repositories(n),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>3</version>
  </parent>
  <artifactId>lib</artifactId>
  <version>1.2.0</version>
  <properties>
    <util.version>1.4</util.version>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.example</groupId>
        <artifactId>bom</artifactId>
        <version>2.0</version>
        <type>pom</type>
        <scope>import</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency>
      <groupId>org.example</groupId>
      <artifactId>util</artifactId>
      <version>${util.version}</version>
      <optional>true</optional>
      <exclusions>
        <exclusion><groupId>commons-logging</groupId><artifactId>*</artifactId></exclusion>
      </exclusions>
    </dependency>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <scope>test</scope>
    </dependency>
  </dependencies>
  <repositories>
    <repository><id>extra</id><url>https://extra.example/repo</url></repository>
  </repositories>
  <profiles>
    <profile>
      <id>default</id>
      <activation><activeByDefault>true</activeByDefault></activation>
    </profile>
    <profile>
      <id>jdk</id>
      <activation><jdk>[11,)</jdk></activation>
    </profile>
  </profiles>
</project>"#;

    #[test]
    fn test_parse_full_descriptor() {
        let project = Project::from_xml(POM).unwrap();
        assert_eq!(project.key, ProjectKey::new("", "lib", "1.2.0"));
        assert_eq!(project.parent, Some(ProjectKey::new("org.example", "parent", "3")));
        assert_eq!(project.effective_packaging(), "jar");
        assert_eq!(project.properties.get("util.version").map(String::as_str), Some("1.4"));

        assert_eq!(project.dependency_management.len(), 1);
        assert!(project.dependency_management[0].is_import());

        assert_eq!(project.dependencies.len(), 2);
        let util = &project.dependencies[0];
        assert_eq!(util.name(), "org.example:util");
        assert_eq!(util.version, "${util.version}");
        assert!(util.is_optional());
        assert_eq!(util.exclusions[0].group_id, "commons-logging");
        assert_eq!(project.dependencies[1].scope, "test");
        assert_eq!(project.dependencies[1].version, "");

        assert_eq!(project.repositories[0].url, "https://extra.example/repo");
        assert_eq!(project.profiles.len(), 2);
        assert!(project.profiles[0].activation.active_by_default);
        assert!(project.profiles[1].activation.has_conditions());
    }

    #[test]
    fn test_rejects_non_project_root() {
        let err = Project::from_xml("<metadata/>").unwrap_err();
        assert!(err.contains("<metadata>"));
    }

    #[test]
    fn test_rejects_broken_xml() {
        assert!(Project::from_xml("<project><dependencies></project>").is_err());
        assert!(Project::from_xml("").is_err());
    }

    #[test]
    fn test_accepts_doctype() {
        let project = Project::from_xml(
            "<?xml version=\"1.0\"?><!DOCTYPE project><project>\
             <groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>",
        )
        .unwrap();
        assert_eq!(project.key, ProjectKey::new("g", "a", "1"));
    }

    #[test]
    fn test_dependency_key_defaults_type() {
        let a = Dependency::new("g", "a", "1");
        let b = Dependency::new("g", "a", "2").with_type("jar");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), Dependency::new("g", "a", "1").with_type("pom").key());
    }
}
