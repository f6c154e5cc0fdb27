//! Owned element tree built from a parsed XML document.

/// An XML element with its attributes and element children.
///
/// Text, comments and processing instructions are dropped; only the
/// structure the breadcrumb format uses is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Element children in document order.
    pub children: Vec<Self>,
    /// One-based line of the start tag.
    pub line: u32,
}

impl Element {
    /// Parse `source` and return its root element.
    ///
    /// # Errors
    ///
    /// Returns the XML parser's error for malformed documents.
    pub fn parse(source: &str) -> Result<Self, roxmltree::Error> {
        let document = roxmltree::Document::parse(source)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let line = node.document().text_pos_at(node.range().start).row;
        Self {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            children: node
                .children()
                .filter(roxmltree::Node::is_element)
                .map(Self::from_node)
                .collect(),
            line,
        }
    }

    /// Value of the attribute `name`, if present.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_elements_and_lines() {
        let root = Element::parse(
            "<Breadcrumb FormatVersion=\"0.1\">\n  <!-- note -->\n  <Dependencies>\n    text\n    <File Path=\"a\"/>\n  </Dependencies>\n</Breadcrumb>",
        )
        .unwrap();
        assert_eq!(root.name, "Breadcrumb");
        assert_eq!(root.line, 1);
        assert_eq!(root.attribute("FormatVersion"), Some("0.1"));
        assert_eq!(root.children.len(), 1);

        let deps = &root.children[0];
        assert_eq!(deps.line, 3);
        assert_eq!(deps.children.len(), 1);
        assert_eq!(deps.children[0].name, "File");
        assert_eq!(deps.children[0].line, 5);
    }

    #[test]
    fn attributes_keep_document_order() {
        let root = Element::parse("<Restrict Platform=\"win\" Configuration=\"debug\" SDK=\"x\"/>").unwrap();
        let names: Vec<&str> = root.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["Platform", "Configuration", "SDK"]);
        assert_eq!(root.attribute("Missing"), None);
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(Element::parse("<Breadcrumb>").is_err());
        assert!(Element::parse("").is_err());
    }
}
