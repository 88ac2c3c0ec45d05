//! Owned element tree built from one raw document.

use roxmltree::{Document, Node, ParsingOptions};
use serde::Serialize;

use crate::error::MalformedXml;
use crate::types::RawDocument;

/// An attribute on an element, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// One element of a parsed document.
///
/// `text` is the element's leading text exactly as written, `None` when
/// the element has no text before its first child (or no content at all).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    /// Look up an attribute value by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    fn from_node(node: Node<'_, '_>) -> Self {
        Self {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| Attribute {
                    name: attr.name().to_string(),
                    value: attr.value().to_string(),
                })
                .collect(),
            text: node.text().map(str::to_string),
            children: node
                .children()
                .filter(Node::is_element)
                .map(Self::from_node)
                .collect(),
        }
    }
}

/// A parsed document: its root element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub root: Element,
}

/// Parse a raw document into an element tree.
///
/// USPTO documents carry a `<!DOCTYPE>` declaration, so DTDs are allowed.
/// Attribute values and text are kept verbatim.
///
/// # Errors
/// Returns `MalformedXml` if the bytes are not UTF-8 or not well-formed XML.
///
/// # Examples
/// ```
/// use uspto_retriever::types::RawDocument;
/// use uspto_retriever::xml::parse_document;
///
/// let raw = RawDocument::new(1, b"<?xml version=\"1.0\"?>\n<a n=\"1\"> x </a>\n".to_vec());
/// let doc = parse_document(&raw).unwrap();
/// assert_eq!(doc.root.name, "a");
/// assert_eq!(doc.root.attribute("n"), Some("1"));
/// assert_eq!(doc.root.text.as_deref(), Some(" x "));
/// ```
pub fn parse_document(raw: &RawDocument) -> Result<ParsedDocument, MalformedXml> {
    let text = std::str::from_utf8(raw.as_bytes())?;
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)?;
    Ok(ParsedDocument {
        root: Element::from_node(doc.root_element()),
    })
}
