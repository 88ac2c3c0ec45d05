//! Stream processor driving split, parse, classify and store for one bulk file.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::classify::Classifier;
use crate::config::OutputFormat;
use crate::error::{RetrieverError, Result};
use crate::sink::{document_key, Sink};
use crate::splitting::{DocumentSplitter, LineReader};
use crate::types::{ClassificationResult, RawDocument, RunSummary, SkipReason};
use crate::xml::parse_document;

/// Documents between two progress log lines.
const PROGRESS_INTERVAL: u64 = 1000;

/// Outcome of one stream: the counters, and the fatal error if it aborted.
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub error: Option<RetrieverError>,
}

impl RunReport {
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into a `Result`, dropping the partial counters of an aborted run.
    pub fn into_result(self) -> Result<RunSummary> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.summary),
        }
    }
}

/// Processes bulk file streams one document at a time.
///
/// A read or sink failure aborts the stream. Malformed and unmatched
/// documents only show up in the counters.
pub struct StreamProcessor<'a> {
    sink: &'a dyn Sink,
    classifier: Classifier,
}

impl<'a> StreamProcessor<'a> {
    /// Create a processor forwarding to `sink` with the default classifier.
    #[must_use]
    pub fn new(sink: &'a dyn Sink) -> Self {
        Self {
            sink,
            classifier: Classifier::default(),
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Process a bulk file on disk.
    pub fn process_file(&self, path: &Path) -> RunReport {
        let source = path.display().to_string();
        match File::open(path) {
            Ok(file) => self.process_reader(&source, BufReader::new(file)),
            Err(e) => {
                tracing::error!(source = %source, error = %e, "Failed to open bulk file");
                RunReport {
                    summary: RunSummary {
                        aborted: true,
                        ..RunSummary::default()
                    },
                    error: Some(RetrieverError::Io(e)),
                }
            }
        }
    }

    /// Process a bulk file from any buffered reader. `source` names it in logs.
    pub fn process_reader<R: BufRead>(&self, source: &str, reader: R) -> RunReport {
        self.process_lines(source, LineReader::new(reader))
    }

    /// Process a stream of lines (terminators included).
    pub fn process_lines<I>(&self, source: &str, lines: I) -> RunReport
    where
        I: Iterator<Item = io::Result<Vec<u8>>>,
    {
        let _span = tracing::info_span!("stream", source = %source).entered();
        tracing::info!(format = ?self.sink.format(), "Processing bulk stream");

        let mut summary = RunSummary::default();
        let mut splitter = DocumentSplitter::new(lines);
        let mut error = None;

        for next in splitter.by_ref() {
            let outcome = next
                .map_err(RetrieverError::from)
                .and_then(|raw| self.handle_document(raw, &mut summary));

            if let Err(e) = outcome {
                error = Some(e);
                break;
            }

            if summary.documents_split % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    documents = summary.documents_split,
                    forwarded = summary.documents_forwarded(),
                    "Progress"
                );
            }
        }

        summary.lines_read = splitter.lines_read();
        summary.aborted = error.is_some();

        if splitter.leading_lines() > 0 {
            tracing::warn!(
                lines = splitter.leading_lines(),
                "Ignored content before the first XML declaration"
            );
        }

        match &error {
            None => tracing::info!(
                lines = summary.lines_read,
                parsed = summary.documents_parsed,
                malformed = summary.documents_malformed,
                sequence = summary.forwarded_sequence,
                document = summary.forwarded_document,
                skipped = summary.documents_skipped,
                "Finished bulk stream"
            ),
            Some(e) => tracing::error!(
                error = %e,
                lines = summary.lines_read,
                parsed = summary.documents_parsed,
                forwarded = summary.documents_forwarded(),
                "Aborted bulk stream"
            ),
        }

        RunReport { summary, error }
    }

    fn handle_document(&self, raw: RawDocument, summary: &mut RunSummary) -> Result<()> {
        summary.documents_split += 1;

        let parsed = match parse_document(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                summary.documents_malformed += 1;
                tracing::warn!(document = raw.ordinal(), error = %e, "Skipping malformed document");
                return Ok(());
            }
        };
        summary.documents_parsed += 1;

        let ClassificationResult {
            matched,
            destination,
            document_id,
            kind,
            skip_reason,
        } = self.classifier.classify(&parsed);

        let document_id = match (matched, document_id) {
            (true, Some(id)) => id,
            _ => {
                let reason = skip_reason.unwrap_or(SkipReason::NotRelevant);
                tracing::debug!(document = raw.ordinal(), kind = ?kind, reason = %reason, "Skipping document");
                summary.record_skipped(&reason);
                return Ok(());
            }
        };

        if document_id.is_empty() {
            tracing::warn!(
                document = raw.ordinal(),
                kind = ?kind,
                "Document number is empty after stripping leading zeros, forwarding anyway"
            );
        }

        let format = self.sink.format();
        let content: Cow<'_, [u8]> = match format {
            OutputFormat::Xml => Cow::Borrowed(raw.as_bytes()),
            OutputFormat::Json => Cow::Owned(serde_json::to_vec(&parsed)?),
        };

        let key = document_key(destination, &document_id, format).unwrap_or_default();
        if let Err(source) = self.sink.put(destination, &document_id, &content) {
            summary.record_sink_failure();
            return Err(RetrieverError::SinkWrite { key, source });
        }

        summary.record_forwarded(destination);
        tracing::debug!(document = raw.ordinal(), key = %key, "Forwarded document");
        Ok(())
    }
}
