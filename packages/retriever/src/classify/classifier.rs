//! Classifier turning a parsed document into a routing decision.

use super::profile::KindProfile;
use crate::types::{ClassificationResult, DocumentKind, SkipReason};
use crate::xml::{find_by_path, find_child, find_children, ParsedDocument};

/// IPC sections whose grants and applications are forwarded.
pub const DEFAULT_RELEVANT_SECTIONS: &[&str] = &["A", "C"];

/// Strip leading zeros from a document number.
///
/// An all-zero number becomes the empty string; it is not rejected here.
///
/// # Examples
/// ```
/// use uspto_retriever::classify::normalize_document_id;
///
/// assert_eq!(normalize_document_id("0001234"), "1234");
/// assert_eq!(normalize_document_id("1234"), "1234");
/// assert_eq!(normalize_document_id("RE049123"), "RE049123");
/// assert_eq!(normalize_document_id("0000"), "");
/// ```
#[must_use]
pub fn normalize_document_id(raw: &str) -> String {
    raw.trim_start_matches('0').to_string()
}

/// Classify a document with the default relevant sections.
#[must_use]
pub fn classify(doc: &ParsedDocument) -> ClassificationResult {
    Classifier::default().classify(doc)
}

/// Document classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    relevant_sections: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANT_SECTIONS.iter().copied())
    }
}

impl Classifier {
    /// Create a classifier that forwards grants and applications with an
    /// entry in any of `sections`. Section letters compare exactly.
    #[must_use]
    pub fn new(sections: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            relevant_sections: sections.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn relevant_sections(&self) -> &[String] {
        &self.relevant_sections
    }

    /// Decide whether `doc` is forwarded, and under which id.
    ///
    /// Never fails: unknown roots and missing fields are skip outcomes.
    #[must_use]
    pub fn classify(&self, doc: &ParsedDocument) -> ClassificationResult {
        let Some(kind) = DocumentKind::from_root_tag(&doc.root.name) else {
            return ClassificationResult::skip(None, SkipReason::UnknownRoot(doc.root.name.clone()));
        };
        let profile = KindProfile::for_kind(kind);

        match self.evaluate(doc, &profile) {
            Ok(document_id) => ClassificationResult::forward(kind, profile.destination, document_id),
            Err(reason) => ClassificationResult::skip(Some(kind), reason),
        }
    }

    fn evaluate(
        &self,
        doc: &ParsedDocument,
        profile: &KindProfile,
    ) -> Result<String, SkipReason> {
        let block = match profile.bibliographic_block {
            Some(tag) => find_child(&doc.root, tag)
                .ok_or_else(|| SkipReason::MissingField(tag.to_string()))?,
            None => &doc.root,
        };

        if let Some(rule) = profile.classification {
            let classifications =
                find_child(block, rule.block).ok_or(SkipReason::NoClassifications)?;

            // One entry and many entries are the same case: a list of children.
            // Entries are checked in document order; the first relevant one decides.
            let mut relevant = false;
            for entry in find_children(classifications, rule.entry) {
                let section = find_child(entry, rule.section).ok_or_else(|| {
                    SkipReason::MissingField(format!("{}/{}/{}", rule.block, rule.entry, rule.section))
                })?;
                if section
                    .text
                    .as_deref()
                    .is_some_and(|letter| self.is_relevant(letter))
                {
                    relevant = true;
                    break;
                }
            }

            if !relevant {
                return Err(SkipReason::NotRelevant);
            }
        }

        let number = find_by_path(block, profile.document_number)
            .and_then(|element| element.text.as_deref())
            .ok_or_else(|| SkipReason::MissingField(profile.document_number.to_string()))?;

        Ok(normalize_document_id(number))
    }

    fn is_relevant(&self, section: &str) -> bool {
        self.relevant_sections.iter().any(|s| s == section)
    }
}
