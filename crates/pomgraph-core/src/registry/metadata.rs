//! Artifact version listing (`maven-metadata.xml`).

use roxmltree::Node;

use crate::registry::xml;

fn text_of(node: Node<'_, '_>, name: &str) -> String {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
        .and_then(|n| n.text())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Versioning {
    pub latest: String,
    pub release: String,
    /// Versions in listing order.
    pub versions: Vec<String>,
    pub last_updated: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub group_id: String,
    pub artifact_id: String,
    pub versioning: Versioning,
}

impl Metadata {
    pub fn from_xml(text: &str) -> Result<Metadata, String> {
        let document = xml::parse(text)?;
        let root = document.root_element();
        if root.tag_name().name() != "metadata" {
            return Err(format!(
                "expected <metadata> root, found <{}>",
                root.tag_name().name()
            ));
        }

        let versioning = root
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "versioning")
            .map(|node| Versioning {
                latest: text_of(node, "latest"),
                release: text_of(node, "release"),
                versions: node
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "versions")
                    .flat_map(|list| list.children())
                    .filter(|n| n.is_element() && n.tag_name().name() == "version")
                    .filter_map(|n| n.text().map(str::trim))
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect(),
                last_updated: text_of(node, "lastUpdated"),
            })
            .unwrap_or_default();

        Ok(Metadata {
            group_id: text_of(root, "groupId"),
            artifact_id: text_of(root, "artifactId"),
            versioning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_in_order() {
        let metadata = Metadata::from_xml(
            r#"<metadata>
  <groupId>org.example</groupId>
  <artifactId>lib</artifactId>
  <versioning>
    <latest>1.2.0</latest>
    <release>1.2.0</release>
    <versions>
      <version>1.0.0</version>
      <version>1.2.0</version>
      <version>1.1.0</version>
    </versions>
    <lastUpdated>20240101000000</lastUpdated>
  </versioning>
</metadata>"#,
        )
        .unwrap();
        assert_eq!(metadata.group_id, "org.example");
        assert_eq!(metadata.versioning.versions, vec!["1.0.0", "1.2.0", "1.1.0"]);
        assert_eq!(metadata.versioning.release, "1.2.0");
    }

    #[test]
    fn test_missing_versioning_is_empty() {
        let metadata = Metadata::from_xml("<metadata><groupId>g</groupId></metadata>").unwrap();
        assert!(metadata.versioning.versions.is_empty());
    }

    #[test]
    fn test_doctype_listing() {
        let metadata = Metadata::from_xml(
            "<!DOCTYPE metadata><metadata><versioning><versions>\
             <version>2.0</version></versions></versioning></metadata>",
        )
        .unwrap();
        assert_eq!(metadata.versioning.versions, vec!["2.0"]);
    }

    #[test]
    fn test_wrong_root() {
        assert!(Metadata::from_xml("<project/>").is_err());
    }
}
