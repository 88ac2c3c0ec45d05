//! USPTO bulk retriever - Split bulk patent XML files into documents.
//!
//! USPTO publishes grants and applications as weekly bulk files: many
//! complete XML documents concatenated into one stream. This crate splits
//! such a stream at each XML declaration, parses every document, decides
//! whether it is relevant and hands the relevant ones to a [`sink::Sink`].
//!
//! # Example
//!
//! ```
//! use uspto_retriever::config::OutputFormat;
//! use uspto_retriever::processor::StreamProcessor;
//! use uspto_retriever::sink::MemorySink;
//!
//! let bulk = "<?xml version=\"1.0\"?>\n\
//!             <sequence-cwu><publication-reference><document-id>\
//!             <doc-number>000123</doc-number></document-id></publication-reference>\
//!             </sequence-cwu>\n";
//!
//! let sink = MemorySink::new(OutputFormat::Xml);
//! let report = StreamProcessor::new(&sink).process_reader("example", bulk.as_bytes());
//!
//! assert_eq!(report.summary.forwarded_sequence, 1);
//! assert_eq!(sink.keys(), vec!["seq/123.xml"]);
//! ```
//!
//! # Architecture
//!
//! - [`splitting`]: Line reader and declaration-based document splitter
//! - [`xml`]: Parsed element tree and lookup helpers
//! - [`classify`]: Relevance rules per document kind
//! - [`sink`]: Storage backends for forwarded documents
//! - [`processor`]: Split, parse, classify and forward one stream
//! - [`batch`]: Several local files processed concurrently
//! - [`trigger`]: Weekly archive naming
//! - [`http`], [`archive`], [`retriever`]: Download and unpack a weekly archive
//! - [`config`], [`status`], [`cli`]: Settings, run summary file, command line

pub mod archive;
pub mod batch;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod processor;
pub mod retriever;
pub mod sink;
pub mod splitting;
pub mod status;
pub mod trigger;
pub mod types;
pub mod xml;

// Re-export main functions
pub use processor::{RunReport, StreamProcessor};
pub use retriever::retrieve;

// Re-export commonly used items
pub use classify::{classify, Classifier};
pub use config::{OutputFormat, RetrieverConfig};
pub use error::{RetrieverError, Result};
pub use sink::{DryRunSink, FilesystemSink, MemorySink, Sink};
pub use types::{ClassificationResult, Destination, DocumentKind, RawDocument, RunSummary, SkipReason};
