//! XML manifest reading
//!
//! Manifests are parsed once into a small owned element tree. Anything that
//! goes wrong (unreadable file, malformed XML, unexpected root element) makes
//! the manifest absent; callers never see a parse error.

use extdoctor_core::paths::PathNormalizer;
use tracing::debug;

/// One XML element with its attributes, direct text and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let text: String = node
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect();

        Self {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            text: text.trim().to_string(),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(Self::from_node)
                .collect(),
        }
    }

    /// Attribute value, `None` when absent or blank
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// First child element with this name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Every child element with this name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Trimmed text of the first child with this name, if not blank
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|child| child.text.as_str())
            .filter(|text| !text.is_empty())
    }
}

/// A parsed extension manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    root: XmlElement,
}

impl Manifest {
    /// Parse manifest XML
    ///
    /// The root element must be `extension` or the legacy `install`.
    pub fn parse(xml: &str) -> Option<Self> {
        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = true;

        let document = match roxmltree::Document::parse_with_options(xml, options) {
            Ok(document) => document,
            Err(e) => {
                debug!("Manifest is not well-formed XML: {}", e);
                return None;
            }
        };

        let root = XmlElement::from_node(document.root_element());
        if root.name != "extension" && root.name != "install" {
            debug!("Unexpected manifest root element <{}>", root.name);
            return None;
        }

        Some(Self { root })
    }

    /// Read and parse a root-relative manifest file
    pub fn load(paths: &PathNormalizer, relative: &str) -> Option<Self> {
        if !paths.is_file(relative) {
            return None;
        }
        let xml = paths.read_to_string(relative)?;
        let manifest = Self::parse(&xml);
        if manifest.is_none() {
            debug!("Ignoring unusable manifest {}", relative);
        }
        manifest
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// The declared extension type, lowercased
    pub fn declared_type(&self) -> Option<String> {
        self.root.attr("type").map(str::to_ascii_lowercase)
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.root.child(name)
    }

    /// Install script named by `<scriptfile>`
    pub fn script_file(&self) -> Option<&str> {
        self.root.child_text("scriptfile")
    }

    /// Update server URLs, deduplicated in declaration order
    pub fn update_servers(&self) -> Vec<String> {
        let mut servers: Vec<String> = Vec::new();

        for block in self.root.children_named("updateservers") {
            for server in block.children_named("server") {
                let url = server.text.trim();
                if !url.is_empty() && !servers.iter().any(|s| s == url) {
                    servers.push(url.to_string());
                }
            }
        }

        servers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<extension type="component" method="upgrade">
    <name>COM_FOO</name>
    <scriptfile> script.php </scriptfile>
    <files folder="site">
        <folder>src</folder>
        <filename>foo.php</filename>
    </files>
    <updateservers>
        <server type="extension" name="Foo">https://example.com/foo.xml</server>
        <server type="extension" name="Foo again">https://example.com/foo.xml</server>
        <server type="collection">https://example.com/list.xml</server>
    </updateservers>
</extension>"#;

    #[test]
    fn test_parse_component_manifest() {
        let manifest = Manifest::parse(COMPONENT).unwrap();

        assert_eq!(manifest.declared_type().as_deref(), Some("component"));
        assert_eq!(manifest.script_file(), Some("script.php"));
        assert_eq!(
            manifest.update_servers(),
            vec!["https://example.com/foo.xml", "https://example.com/list.xml"]
        );

        let files = manifest.child("files").unwrap();
        assert_eq!(files.attr("folder"), Some("site"));
        assert_eq!(files.child_text("filename"), Some("foo.php"));
    }

    #[test]
    fn test_legacy_install_root() {
        let manifest = Manifest::parse(r#"<install type="module" version="1.5"><name>x</name></install>"#);
        assert_eq!(manifest.unwrap().declared_type().as_deref(), Some("module"));
    }

    #[test]
    fn test_doctype_is_tolerated() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE install SYSTEM "http://dev.joomla.org/xml/1.5/plugin-install.dtd">
<install type="plugin" group="system"><name>x</name></install>"#;
        assert!(Manifest::parse(xml).is_some());
    }

    #[test]
    fn test_rejects_malformed_and_foreign_xml() {
        assert!(Manifest::parse("<extension type=\"component\">").is_none());
        assert!(Manifest::parse("<metafile><name>x</name></metafile>").is_none());
        assert!(Manifest::parse("").is_none());
    }

    #[test]
    fn test_blank_attribute_is_absent() {
        let manifest = Manifest::parse(r#"<extension type=" "><media destination=""/></extension>"#).unwrap();
        assert!(manifest.declared_type().is_none());
        assert!(manifest.child("media").unwrap().attr("destination").is_none());
    }
}
