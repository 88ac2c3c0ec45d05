//! Storage sinks for forwarded documents.
//!
//! Documents are stored under `<prefix>/<document_id>.<ext>`, where the
//! prefix comes from the destination and the extension from the sink's
//! output format.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::config::OutputFormat;
use crate::types::Destination;

/// Storage key for a forwarded document, `None` for `Destination::None`.
///
/// # Examples
/// ```
/// use uspto_retriever::config::OutputFormat;
/// use uspto_retriever::sink::document_key;
/// use uspto_retriever::types::Destination;
///
/// assert_eq!(
///     document_key(Destination::Sequence, "1234", OutputFormat::Xml).as_deref(),
///     Some("seq/1234.xml")
/// );
/// assert_eq!(document_key(Destination::None, "1234", OutputFormat::Xml), None);
/// ```
#[must_use]
pub fn document_key(destination: Destination, document_id: &str, format: OutputFormat) -> Option<String> {
    let prefix = destination.prefix()?;
    Some(format!("{prefix}/{document_id}.{}", format.extension()))
}

/// Destination for forwarded documents.
///
/// Shared between concurrently processed streams, so implementations must
/// be `Send + Sync`. Writes for one stream arrive in document order.
pub trait Sink: Send + Sync {
    /// Format the sink expects `content` to be in.
    fn format(&self) -> OutputFormat {
        OutputFormat::Xml
    }

    /// Store one document.
    fn put(&self, destination: Destination, document_id: &str, content: &[u8]) -> io::Result<()>;
}

fn key_or_invalid(destination: Destination, document_id: &str, format: OutputFormat) -> io::Result<String> {
    document_key(destination, document_id, format).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "documents routed to NONE are not stored",
        )
    })
}

/// Distinguishes temp files of concurrent writes to the same key.
static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sink writing documents below a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemSink {
    root: PathBuf,
    format: OutputFormat,
}

impl FilesystemSink {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }
}

impl Sink for FilesystemSink {
    fn format(&self) -> OutputFormat {
        self.format
    }

    fn put(&self, destination: Destination, document_id: &str, content: &[u8]) -> io::Result<()> {
        // Document numbers come from the input; never let them leave the prefix directory.
        if document_id.contains(['/', '\\']) || document_id == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("document id '{document_id}' is not a valid file name"),
            ));
        }

        let key = key_or_invalid(destination, document_id, self.format)?;
        let path = self.root.join(&key);
        let Some(dir) = path.parent() else {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, key));
        };
        fs::create_dir_all(dir)?;

        // Write to temp file first, then rename so readers never see a partial document
        let temp = dir.join(format!(
            ".{document_id}.{}.{}-{}.tmp",
            self.format.extension(),
            std::process::id(),
            TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        {
            let mut file = File::create(&temp)?;
            file.write_all(content)?;
            file.sync_all()?;
        }

        #[cfg(target_os = "windows")]
        if path.exists() {
            fs::remove_file(&path)?;
        }

        fs::rename(&temp, &path)
    }
}

/// A document held by a `MemorySink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub key: String,
    pub content: Vec<u8>,
}

/// Sink keeping documents in memory, in write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    format: OutputFormat,
    documents: Mutex<Vec<StoredDocument>>,
}

impl MemorySink {
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            documents: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything stored so far.
    #[must_use]
    pub fn documents(&self) -> Vec<StoredDocument> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Keys stored so far, in write order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.documents().into_iter().map(|doc| doc.key).collect()
    }
}

impl Sink for MemorySink {
    fn format(&self) -> OutputFormat {
        self.format
    }

    fn put(&self, destination: Destination, document_id: &str, content: &[u8]) -> io::Result<()> {
        let key = key_or_invalid(destination, document_id, self.format)?;
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(StoredDocument {
                key,
                content: content.to_vec(),
            });
        Ok(())
    }
}

/// Sink that only counts writes.
#[derive(Debug, Default)]
pub struct DryRunSink {
    format: OutputFormat,
    writes: AtomicU64,
}

impl DryRunSink {
    /// Create a dry-run sink reporting `format`, so documents are still
    /// rendered the way a real run would store them.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            writes: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl Sink for DryRunSink {
    fn format(&self) -> OutputFormat {
        self.format
    }

    fn put(&self, destination: Destination, document_id: &str, _content: &[u8]) -> io::Result<()> {
        let key = key_or_invalid(destination, document_id, self.format())?;
        tracing::debug!(key = %key, "Dry run, not storing document");
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
