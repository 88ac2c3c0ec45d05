//! Line source over any buffered reader.

use std::io::{self, BufRead};

/// Iterator over the lines of a reader, terminators included.
///
/// Lines are returned as raw bytes so that documents can be forwarded
/// unchanged even when they are not valid UTF-8. The final line is
/// returned without a terminator if the input does not end with one.
/// After the first read error the iterator is exhausted.
pub struct LineReader<R> {
    reader: R,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Create a line source over `reader`.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(line)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
