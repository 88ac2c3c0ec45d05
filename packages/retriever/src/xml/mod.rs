//! XML parsing into an owned element tree, plus navigation helpers.

mod tree;
mod utils;

pub use tree::{parse_document, Attribute, Element, ParsedDocument};
pub use utils::{find_by_path, find_child, find_children, text_at_path};
