//! Effective descriptor construction.
//!
//! A raw descriptor becomes effective in four steps: default profiles are
//! folded in, the parent chain is merged, placeholders are interpolated and
//! dependency management (including imported BOMs) is applied. Imported
//! entries may carry placeholders the BOM could not resolve, so the project's
//! own properties are applied once more after management. The result has no
//! parent, no default-active profiles and nothing left to expand, so merging
//! it again is a no-op that never touches the registry.

pub mod interpolate;
pub mod management;
pub mod parents;
pub mod profiles;

use tracing::debug;

use crate::context::Context;
use crate::errors::ResolveResult;
use crate::registry::pom::{Dependency, Project};
use crate::registry::MavenRegistryApiClient;

pub use interpolate::{interpolate, Properties};
pub use management::{apply_management, dedupe};
pub use parents::merge_parents;
pub use profiles::merge_default_profiles;

pub struct DescriptorMerger<'a> {
    api: &'a MavenRegistryApiClient,
    max_depth: usize,
}

impl<'a> DescriptorMerger<'a> {
    pub fn new(api: &'a MavenRegistryApiClient) -> Self {
        Self {
            api,
            max_depth: api.config().max_parent_depth,
        }
    }

    pub async fn effective_project(
        &self,
        ctx: &Context,
        mut project: Project,
    ) -> ResolveResult<Project> {
        self.merge_ancestry(ctx, &mut project).await?;
        management::process_dependencies(self, ctx, &mut project).await?;
        interpolate(&mut project);
        project.parent = None;
        Ok(project)
    }

    /// Profiles, parents and interpolation; everything but management.
    async fn merge_ancestry(&self, ctx: &Context, project: &mut Project) -> ResolveResult<()> {
        merge_default_profiles(project);
        merge_parents(self.api, ctx, project, self.max_depth).await?;
        interpolate(project);
        Ok(())
    }

    /// Management entries of the BOM named by an import, resolved through the
    /// BOM's own ancestry. Imports declared by the BOM are not followed.
    pub(crate) async fn imported_management(
        &self,
        ctx: &Context,
        bom: &Dependency,
    ) -> ResolveResult<Vec<Dependency>> {
        debug!("importing dependency management from {}:{}", bom.name(), bom.version);
        let mut project = self
            .api
            .get_project(ctx, &bom.group_id, &bom.artifact_id, &bom.version)
            .await?;
        self.merge_ancestry(ctx, &mut project).await?;
        Ok(project.dependency_management)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::registry::client::testing::{client_for, FakeRegistry, BASE};

    const APP: &str = r#"<project>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>1</version>
  </parent>
  <artifactId>app</artifactId>
  <properties><lib.version>1.2.3</lib.version></properties>
  <dependencyManagement><dependencies>
    <dependency>
      <groupId>org.example</groupId><artifactId>bom</artifactId>
      <version>5</version><type>pom</type><scope>import</scope>
    </dependency>
  </dependencies></dependencyManagement>
  <dependencies>
    <dependency><groupId>org.example</groupId><artifactId>lib</artifactId><version>${lib.version}</version></dependency>
    <dependency><groupId>org.example</groupId><artifactId>from-bom</artifactId></dependency>
    <dependency><groupId>org.example</groupId><artifactId>from-parent-dm</artifactId></dependency>
    <dependency><groupId>org.example</groupId><artifactId>pinned</artifactId><version>0.1</version></dependency>
    <dependency><groupId>org.example</groupId><artifactId>lib</artifactId><version>9.9</version></dependency>
  </dependencies>
</project>"#;

    const PARENT: &str = r#"<project>
  <groupId>org.example</groupId><artifactId>parent</artifactId><version>1</version>
  <packaging>pom</packaging>
  <dependencyManagement><dependencies>
    <dependency><groupId>org.example</groupId><artifactId>from-parent-dm</artifactId><version>3.0</version><scope>runtime</scope></dependency>
  </dependencies></dependencyManagement>
</project>"#;

    const BOM: &str = r#"<project>
  <groupId>org.example</groupId><artifactId>bom</artifactId><version>5</version>
  <packaging>pom</packaging>
  <properties><bom.version>4.0</bom.version></properties>
  <dependencyManagement><dependencies>
    <dependency><groupId>org.example</groupId><artifactId>from-bom</artifactId><version>${bom.version}</version></dependency>
    <dependency><groupId>org.example</groupId><artifactId>pinned</artifactId><version>7.7</version></dependency>
    <dependency><groupId>org.other</groupId><artifactId>nested-bom</artifactId><version>1</version><type>pom</type><scope>import</scope></dependency>
  </dependencies></dependencyManagement>
</project>"#;

    fn registry() -> std::sync::Arc<FakeRegistry> {
        let registry = FakeRegistry::new(BASE);
        registry.put_pom("org.example", "parent", "1", PARENT);
        registry.put_pom("org.example", "bom", "5", BOM);
        registry
    }

    #[tokio::test]
    async fn test_effective_project() {
        let registry = registry();
        let client = client_for(&registry);
        let merger = DescriptorMerger::new(&client);
        let ctx = Context::new();

        let project = Project::from_xml(APP).unwrap();
        let effective = merger.effective_project(&ctx, project).await.unwrap();

        let deps: Vec<(String, &str, &str)> = effective
            .dependencies
            .iter()
            .map(|d| (d.name(), d.version.as_str(), d.scope.as_str()))
            .collect();
        assert_eq!(
            deps,
            vec![
                ("org.example:lib".to_string(), "1.2.3", ""),
                ("org.example:from-bom".to_string(), "4.0", ""),
                ("org.example:from-parent-dm".to_string(), "3.0", "runtime"),
                ("org.example:pinned".to_string(), "0.1", ""),
            ]
        );
        assert_eq!(effective.key.to_string(), "org.example:app:1");
        assert!(effective.parent.is_none());
        assert!(effective.dependency_management.iter().all(|d| !d.is_import()));
        // Parent and BOM only; the nested import is never requested.
        assert_eq!(registry.calls(), 2);
    }

    #[tokio::test]
    async fn test_merging_twice_is_a_no_op() {
        let registry = registry();
        let client = client_for(&registry);
        let merger = DescriptorMerger::new(&client);
        let ctx = Context::new();

        let once = merger
            .effective_project(&ctx, Project::from_xml(APP).unwrap())
            .await
            .unwrap();
        let calls = registry.calls();
        let twice = merger.effective_project(&ctx, once.clone()).await.unwrap();
        assert_eq!(once, twice);
        assert_eq!(registry.calls(), calls);
    }

    #[tokio::test]
    async fn test_imported_placeholder_resolves_in_first_pass() {
        let registry = FakeRegistry::new(BASE);
        registry.put_pom(
            "org.example",
            "open-bom",
            "1",
            r#"<project>
  <groupId>org.example</groupId><artifactId>open-bom</artifactId><version>1</version>
  <packaging>pom</packaging>
  <dependencyManagement><dependencies>
    <dependency><groupId>org.example</groupId><artifactId>x</artifactId><version>${x.version}</version></dependency>
  </dependencies></dependencyManagement>
</project>"#,
        );
        let client = client_for(&registry);
        let merger = DescriptorMerger::new(&client);
        let ctx = Context::new();

        let project = Project::from_xml(
            r#"<project>
  <groupId>org.example</groupId><artifactId>user</artifactId><version>1</version>
  <properties><x.version>2.0</x.version></properties>
  <dependencyManagement><dependencies>
    <dependency><groupId>org.example</groupId><artifactId>open-bom</artifactId><version>1</version><type>pom</type><scope>import</scope></dependency>
  </dependencies></dependencyManagement>
  <dependencies>
    <dependency><groupId>org.example</groupId><artifactId>x</artifactId></dependency>
  </dependencies>
</project>"#,
        )
        .unwrap();

        let once = merger.effective_project(&ctx, project).await.unwrap();
        assert_eq!(once.dependencies[0].version, "2.0");
        let twice = merger.effective_project(&ctx, once.clone()).await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_missing_bom_fails_resolution() {
        let registry = FakeRegistry::new(BASE);
        registry.put_pom("org.example", "parent", "1", PARENT);
        let client = client_for(&registry);

        let err = DescriptorMerger::new(&client)
            .effective_project(&Context::new(), Project::from_xml(APP).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
