//! Field paths per document kind.

use crate::types::{Destination, DocumentKind};

/// Where the IPC classification entries of a document live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    /// Block holding the entries, relative to the bibliographic block.
    pub block: &'static str,
    /// Tag of one entry inside the block.
    pub entry: &'static str,
    /// Child of an entry carrying the section letter.
    pub section: &'static str,
}

/// IPCR classifications, shared by grants and applications.
const IPCR: ClassificationRule = ClassificationRule {
    block: "classifications-ipcr",
    entry: "classification-ipcr",
    section: "section",
};

/// Path of the document number, relative to the bibliographic block.
const DOC_NUMBER_PATH: &str = "publication-reference/document-id/doc-number";

/// Declarative description of one document kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindProfile {
    /// Destination of matching documents.
    pub destination: Destination,

    /// Child of the root holding bibliographic data; `None` means the
    /// fields hang directly off the root.
    pub bibliographic_block: Option<&'static str>,

    /// Classification lookup; `None` means every document of this kind
    /// is forwarded.
    pub classification: Option<ClassificationRule>,

    /// Path to the document number, relative to the bibliographic block.
    pub document_number: &'static str,
}

impl KindProfile {
    /// Profile for a document kind.
    #[must_use]
    pub fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::SequenceListing => Self {
                destination: Destination::Sequence,
                bibliographic_block: None,
                classification: None,
                document_number: DOC_NUMBER_PATH,
            },
            DocumentKind::PatentGrant => Self {
                destination: Destination::Document,
                bibliographic_block: Some("us-bibliographic-data-grant"),
                classification: Some(IPCR),
                document_number: DOC_NUMBER_PATH,
            },
            DocumentKind::PatentApplication => Self {
                destination: Destination::Document,
                bibliographic_block: Some("us-bibliographic-data-application"),
                classification: Some(IPCR),
                document_number: DOC_NUMBER_PATH,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_listing_has_no_classification() {
        let profile = KindProfile::for_kind(DocumentKind::SequenceListing);
        assert_eq!(profile.destination, Destination::Sequence);
        assert!(profile.classification.is_none());
        assert!(profile.bibliographic_block.is_none());
    }

    #[test]
    fn test_grant_and_application_share_rule() {
        let grant = KindProfile::for_kind(DocumentKind::PatentGrant);
        let application = KindProfile::for_kind(DocumentKind::PatentApplication);
        assert_eq!(grant.classification, application.classification);
        assert_eq!(grant.destination, Destination::Document);
        assert_ne!(grant.bibliographic_block, application.bibliographic_block);
    }
}
