//! Error types for the retriever.
//!
//! `RetrieverError` is what library consumers see. Per-document parse
//! failures use the narrower `MalformedXml`, which the stream processor
//! absorbs into counters instead of propagating.

use thiserror::Error;

/// A document that could not be turned into an element tree.
#[derive(Debug, Error)]
pub enum MalformedXml {
    /// The document bytes are not valid UTF-8.
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The document is not well-formed XML.
    #[error("document is not well-formed XML: {0}")]
    Syntax(#[from] roxmltree::Error),
}

/// Main error type for the retriever library.
#[derive(Debug, Error)]
pub enum RetrieverError {
    /// IO error, including read failures of the line source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A forwarded document could not be written to the sink.
    #[error("Failed to write {key} to sink: {source}")]
    SinkWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to download a bulk archive.
    #[error("Failed to download archive {name}: {source}")]
    ArchiveDownload {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    /// All retry attempts failed.
    #[error("Request failed after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// ZIP archive could not be read.
    #[error("ZIP extraction failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The archive holds no bulk XML file.
    #[error("No XML entry found in archive {0}")]
    MissingArchiveEntry(String),

    /// Document could not be parsed.
    #[error(transparent)]
    MalformedXml(#[from] MalformedXml),

    /// Trigger payload does not name a valid publication week.
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),

    /// Configuration value missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A concurrent stream task panicked or was cancelled.
    #[error("Stream task failed: {0}")]
    Task(String),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),
}

impl RetrieverError {
    /// Whether this error came from the line source or the sink.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io(_) | Self::SinkWrite { .. })
    }
}

/// Result type alias for retriever operations.
pub type Result<T> = std::result::Result<T, RetrieverError>;
