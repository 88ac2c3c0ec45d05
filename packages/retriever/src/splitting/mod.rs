//! Document boundary splitting for bulk files.
//!
//! A bulk file is a plain concatenation of XML documents. The only marker
//! between two documents is the `<?xml version=` declaration that opens the
//! next one, so splitting works line by line without lookahead.

mod lines;
mod splitter;

pub use lines::LineReader;
pub use splitter::DocumentSplitter;
