//! Core data types for the retriever.
//!
//! These types describe one document's journey through the stream:
//! the raw bytes cut out of the bulk file, the routing decision made by
//! the classifier, and the counters reported when the stream ends.

use serde::{Deserialize, Serialize};

/// Literal prefix of the line that starts every embedded document.
pub const DECLARATION_MARKER: &[u8] = b"<?xml version=";

/// One document cut out of a bulk file, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    ordinal: u64,
    bytes: Vec<u8>,
}

impl RawDocument {
    /// Create a raw document. `ordinal` is its 1-based position in the stream.
    #[must_use]
    pub fn new(ordinal: u64, bytes: Vec<u8>) -> Self {
        Self { ordinal, bytes }
    }

    /// 1-based position of this document in its stream.
    #[must_use]
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// The exact bytes of the document, declaration line included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the document, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Logical bucket a document is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Destination {
    /// Sequence listings.
    Sequence,

    /// Grants and applications in a relevant IPC section.
    Document,

    /// Not forwarded.
    None,
}

impl Destination {
    /// Key prefix used by sinks, `None` for documents that are not stored.
    #[must_use]
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Self::Sequence => Some("seq"),
            Self::Document => Some("docs"),
            Self::None => None,
        }
    }
}

/// Top-level document kinds found in USPTO bulk files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// `<sequence-cwu>`: always forwarded.
    SequenceListing,

    /// `<us-patent-grant>`.
    PatentGrant,

    /// `<us-patent-application>`.
    PatentApplication,
}

impl DocumentKind {
    /// All kinds, in lookup order.
    pub const ALL: [Self; 3] = [
        Self::SequenceListing,
        Self::PatentGrant,
        Self::PatentApplication,
    ];

    /// Root element tag for this kind.
    #[must_use]
    pub fn root_tag(&self) -> &'static str {
        match self {
            Self::SequenceListing => "sequence-cwu",
            Self::PatentGrant => "us-patent-grant",
            Self::PatentApplication => "us-patent-application",
        }
    }

    /// Detect the kind from a root element tag.
    #[must_use]
    pub fn from_root_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.root_tag() == tag)
    }
}

/// Why a parsed document was not forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Root element is not one of the known document kinds.
    UnknownRoot(String),

    /// A node on a required path is absent.
    MissingField(String),

    /// Grant or application without a classification block.
    NoClassifications,

    /// No classification entry in section A or C.
    NotRelevant,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRoot(tag) => write!(f, "unknown root element <{tag}>"),
            Self::MissingField(path) => write!(f, "missing field {path}"),
            Self::NoClassifications => f.write_str("no classification block"),
            Self::NotRelevant => f.write_str("no classification in a relevant section"),
        }
    }
}

/// Routing decision for one parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub matched: bool,
    pub destination: Destination,
    /// Normalized document number, present for matched documents.
    pub document_id: Option<String>,
    /// Kind detected from the root element.
    pub kind: Option<DocumentKind>,
    /// Set when `matched` is false.
    pub skip_reason: Option<SkipReason>,
}

impl ClassificationResult {
    /// A document to forward to `destination` under `document_id`.
    #[must_use]
    pub fn forward(kind: DocumentKind, destination: Destination, document_id: String) -> Self {
        Self {
            matched: true,
            destination,
            document_id: Some(document_id),
            kind: Some(kind),
            skip_reason: None,
        }
    }

    /// A document that is not forwarded.
    #[must_use]
    pub fn skip(kind: Option<DocumentKind>, reason: SkipReason) -> Self {
        Self {
            matched: false,
            destination: Destination::None,
            document_id: None,
            kind,
            skip_reason: Some(reason),
        }
    }
}

/// Skipped documents broken down by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    pub unknown_root: u64,
    pub missing_field: u64,
    pub no_classifications: u64,
    pub not_relevant: u64,
    pub sink_failure: u64,
}

/// Counters for one processed stream.
///
/// `forwarded_sequence + forwarded_document + documents_skipped` always
/// equals `documents_parsed`, and `documents_parsed + documents_malformed`
/// equals `documents_split`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub lines_read: u64,
    pub documents_split: u64,
    pub documents_parsed: u64,
    pub documents_malformed: u64,
    pub forwarded_sequence: u64,
    pub forwarded_document: u64,
    pub documents_skipped: u64,
    pub skipped: SkipCounts,
    /// Set when the stream ended on a fatal error.
    pub aborted: bool,
}

impl RunSummary {
    /// Total documents written to the sink.
    #[must_use]
    pub fn documents_forwarded(&self) -> u64 {
        self.forwarded_sequence + self.forwarded_document
    }

    pub(crate) fn record_forwarded(&mut self, destination: Destination) {
        match destination {
            Destination::Sequence => self.forwarded_sequence += 1,
            Destination::Document => self.forwarded_document += 1,
            Destination::None => {}
        }
    }

    pub(crate) fn record_skipped(&mut self, reason: &SkipReason) {
        self.documents_skipped += 1;
        match reason {
            SkipReason::UnknownRoot(_) => self.skipped.unknown_root += 1,
            SkipReason::MissingField(_) => self.skipped.missing_field += 1,
            SkipReason::NoClassifications => self.skipped.no_classifications += 1,
            SkipReason::NotRelevant => self.skipped.not_relevant += 1,
        }
    }

    pub(crate) fn record_sink_failure(&mut self) {
        self.documents_skipped += 1;
        self.skipped.sink_failure += 1;
    }

    /// Add another stream's counters to this one.
    pub fn merge(&mut self, other: &RunSummary) {
        self.lines_read += other.lines_read;
        self.documents_split += other.documents_split;
        self.documents_parsed += other.documents_parsed;
        self.documents_malformed += other.documents_malformed;
        self.forwarded_sequence += other.forwarded_sequence;
        self.forwarded_document += other.forwarded_document;
        self.documents_skipped += other.documents_skipped;
        self.skipped.unknown_root += other.skipped.unknown_root;
        self.skipped.missing_field += other.skipped.missing_field;
        self.skipped.no_classifications += other.skipped.no_classifications;
        self.skipped.not_relevant += other.skipped.not_relevant;
        self.skipped.sink_failure += other.skipped.sink_failure;
        self.aborted |= other.aborted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_prefix() {
        assert_eq!(Destination::Sequence.prefix(), Some("seq"));
        assert_eq!(Destination::Document.prefix(), Some("docs"));
        assert_eq!(Destination::None.prefix(), None);
    }

    #[test]
    fn test_document_kind_from_root_tag() {
        assert_eq!(
            DocumentKind::from_root_tag("sequence-cwu"),
            Some(DocumentKind::SequenceListing)
        );
        assert_eq!(
            DocumentKind::from_root_tag("us-patent-grant"),
            Some(DocumentKind::PatentGrant)
        );
        assert_eq!(
            DocumentKind::from_root_tag("us-patent-application"),
            Some(DocumentKind::PatentApplication)
        );
        assert_eq!(DocumentKind::from_root_tag("us-patent-grant-v45"), None);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::UnknownRoot("foo".to_string()).to_string(),
            "unknown root element <foo>"
        );
        assert_eq!(
            SkipReason::MissingField("publication-reference".to_string()).to_string(),
            "missing field publication-reference"
        );
    }

    #[test]
    fn test_summary_counters() {
        let mut summary = RunSummary::default();
        summary.documents_parsed = 4;
        summary.record_forwarded(Destination::Sequence);
        summary.record_forwarded(Destination::Document);
        summary.record_skipped(&SkipReason::NotRelevant);
        summary.record_sink_failure();

        assert_eq!(summary.documents_forwarded(), 2);
        assert_eq!(summary.documents_skipped, 2);
        assert_eq!(summary.skipped.not_relevant, 1);
        assert_eq!(summary.skipped.sink_failure, 1);
        assert_eq!(
            summary.documents_forwarded() + summary.documents_skipped,
            summary.documents_parsed
        );
    }

    #[test]
    fn test_summary_merge() {
        let mut total = RunSummary::default();
        let mut a = RunSummary::default();
        a.lines_read = 10;
        a.forwarded_document = 1;
        let mut b = RunSummary::default();
        b.lines_read = 5;
        b.aborted = true;
        b.skipped.unknown_root = 2;

        total.merge(&a);
        total.merge(&b);

        assert_eq!(total.lines_read, 15);
        assert_eq!(total.forwarded_document, 1);
        assert_eq!(total.skipped.unknown_root, 2);
        assert!(total.aborted);
    }
}
