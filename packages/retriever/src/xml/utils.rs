//! Navigation helpers for element trees.

use super::tree::Element;

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use uspto_retriever::types::RawDocument;
/// use uspto_retriever::xml::{find_child, parse_document};
///
/// let raw = RawDocument::new(1, b"<root><child1/><child2/></root>".to_vec());
/// let doc = parse_document(&raw).unwrap();
///
/// assert!(find_child(&doc.root, "child1").is_some());
/// assert!(find_child(&doc.root, "missing").is_none());
/// ```
pub fn find_child<'a>(element: &'a Element, tag: &str) -> Option<&'a Element> {
    element.children.iter().find(|child| child.name == tag)
}

/// Find all child elements with the given tag name.
pub fn find_children<'a>(element: &'a Element, tag: &'a str) -> impl Iterator<Item = &'a Element> {
    element.children.iter().filter(move |child| child.name == tag)
}

/// Find a descendant element matching a slash-separated path of tag names.
///
/// Each step takes the first matching child.
///
/// # Examples
/// ```
/// use uspto_retriever::types::RawDocument;
/// use uspto_retriever::xml::{find_by_path, parse_document};
///
/// let raw = RawDocument::new(1, b"<a><b><c>1</c></b></a>".to_vec());
/// let doc = parse_document(&raw).unwrap();
///
/// let c = find_by_path(&doc.root, "b/c").unwrap();
/// assert_eq!(c.text.as_deref(), Some("1"));
/// assert!(find_by_path(&doc.root, "b/missing").is_none());
/// ```
pub fn find_by_path<'a>(element: &'a Element, path: &str) -> Option<&'a Element> {
    path.split('/')
        .try_fold(element, |current, part| find_child(current, part))
}

/// Text of the element at `path`, `None` if the element or its text is absent.
pub fn text_at_path<'a>(element: &'a Element, path: &str) -> Option<&'a str> {
    find_by_path(element, path).and_then(|found| found.text.as_deref())
}
