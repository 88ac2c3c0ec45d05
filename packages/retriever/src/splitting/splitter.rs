//! Splitter that cuts a line stream into raw documents.

use std::io;

use crate::types::{RawDocument, DECLARATION_MARKER};

/// UTF-8 byte order mark, tolerated in front of the first declaration.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Lazy iterator of `RawDocument`s over a line source.
///
/// Each declaration line closes the document accumulated so far and opens
/// the next one. Lines before the first declaration belong to no document
/// and are dropped. The iterator is single-pass: on a read error the
/// partially accumulated document is discarded, the error is yielded once,
/// and iteration ends.
pub struct DocumentSplitter<I> {
    lines: I,
    buffer: Vec<u8>,
    lines_read: u64,
    leading_lines: u64,
    emitted: u64,
    finished: bool,
}

impl<I> DocumentSplitter<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    /// Create a splitter over a sequence of lines (terminators included).
    #[must_use]
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            buffer: Vec::new(),
            lines_read: 0,
            leading_lines: 0,
            emitted: 0,
            finished: false,
        }
    }

    /// Number of lines pulled from the source so far.
    #[must_use]
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Number of lines dropped because they came before any declaration.
    #[must_use]
    pub fn leading_lines(&self) -> u64 {
        self.leading_lines
    }

    fn is_boundary(&self, line: &[u8]) -> bool {
        // Only the very first line of the stream may carry a byte order mark.
        let line = if self.lines_read == 1 {
            line.strip_prefix(UTF8_BOM).unwrap_or(line)
        } else {
            line
        };
        line.starts_with(DECLARATION_MARKER)
    }

    fn emit(&mut self, bytes: Vec<u8>) -> RawDocument {
        self.emitted += 1;
        RawDocument::new(self.emitted, bytes)
    }
}

impl<I> Iterator for DocumentSplitter<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = io::Result<RawDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.lines_read += 1;
                    let boundary = self.is_boundary(&line);

                    if boundary && !self.buffer.is_empty() {
                        let completed = std::mem::replace(&mut self.buffer, line);
                        return Some(Ok(self.emit(completed)));
                    }

                    if boundary || !self.buffer.is_empty() {
                        self.buffer.extend_from_slice(&line);
                    } else {
                        self.leading_lines += 1;
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    if !self.buffer.is_empty() {
                        tracing::debug!(
                            bytes = self.buffer.len(),
                            "Discarding partial document after read error"
                        );
                    }
                    self.buffer = Vec::new();
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    if self.buffer.is_empty() {
                        return None;
                    }
                    let completed = std::mem::take(&mut self.buffer);
                    return Some(Ok(self.emit(completed)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splitting::LineReader;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn split(input: &str) -> Vec<String> {
        DocumentSplitter::new(LineReader::new(Cursor::new(input.to_string())))
            .map(|doc| String::from_utf8(doc.unwrap().into_bytes()).unwrap())
            .collect()
    }

    #[test]
    fn test_split_two_documents() {
        let input = "<?xml version=\"1.0\"?>\n<a/>\n<?xml version=\"1.0\"?>\n<b/>\n";
        let docs = split(input);
        assert_eq!(
            docs,
            vec![
                "<?xml version=\"1.0\"?>\n<a/>\n".to_string(),
                "<?xml version=\"1.0\"?>\n<b/>\n".to_string(),
            ]
        );
    }

    #[test]
    fn test_split_is_lossless() {
        let input = "<?xml version=\"1.0\"?>\r\n<a>\r\n x\r\n</a>\r\n\
                     <?xml version=\"1.0\"?>\n<b/>\n\n\
                     <?xml version=\"1.0\"?>\n<c/>";
        assert_eq!(split(input).concat(), input);
    }

    #[test]
    fn test_no_declaration_yields_nothing() {
        let mut splitter =
            DocumentSplitter::new(LineReader::new(Cursor::new("<a/>\n<b/>\n".to_string())));
        assert!(splitter.next().is_none());
        assert_eq!(splitter.lines_read(), 2);
        assert_eq!(splitter.leading_lines(), 2);
    }

    #[test]
    fn test_empty_stream() {
        assert!(split("").is_empty());
    }

    #[test]
    fn test_consecutive_declarations_never_emit_empty_document() {
        let docs = split("<?xml version=\"1.0\"?>\n<?xml version=\"1.0\"?>\n<a/>\n");
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| !d.is_empty()));
        assert_eq!(docs[0], "<?xml version=\"1.0\"?>\n");
    }

    #[test]
    fn test_leading_content_is_dropped() {
        let docs = split("garbage\n<?xml version=\"1.0\"?>\n<a/>\n");
        assert_eq!(docs, vec!["<?xml version=\"1.0\"?>\n<a/>\n".to_string()]);
    }

    #[test]
    fn test_marker_must_start_the_line() {
        let docs = split("<?xml version=\"1.0\"?>\n<a>  <?xml version=</a>\n");
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_byte_order_mark_on_first_line() {
        let input = "\u{feff}<?xml version=\"1.0\"?>\n<a/>\n";
        let docs = split(input);
        assert_eq!(docs, vec![input.to_string()]);
    }

    #[test]
    fn test_ordinals_are_sequential() {
        let input = "<?xml version=\"1.0\"?>\n<a/>\n<?xml version=\"1.0\"?>\n<b/>\n";
        let ordinals: Vec<u64> =
            DocumentSplitter::new(LineReader::new(Cursor::new(input.to_string())))
                .map(|doc| doc.unwrap().ordinal())
                .collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    #[test]
    fn test_read_error_discards_partial_document() {
        let lines: Vec<io::Result<Vec<u8>>> = vec![
            Ok(b"<?xml version=\"1.0\"?>\n".to_vec()),
            Ok(b"<a/>\n".to_vec()),
            Ok(b"<?xml version=\"1.0\"?>\n".to_vec()),
            Ok(b"<b>\n".to_vec()),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated")),
            Ok(b"</b>\n".to_vec()),
        ];
        let mut splitter = DocumentSplitter::new(lines.into_iter());

        let first = splitter.next().unwrap().unwrap();
        assert_eq!(first.as_bytes(), b"<?xml version=\"1.0\"?>\n<a/>\n");

        let err = splitter.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        assert!(splitter.next().is_none());
        assert_eq!(splitter.lines_read(), 4);
    }
}
