//! Document classification.
//!
//! Decides, per parsed document, whether it is forwarded and where to.
//! The per-kind field paths live in a small profile table so grants and
//! applications share one code path.

mod classifier;
mod profile;

pub use classifier::{classify, normalize_document_id, Classifier, DEFAULT_RELEVANT_SECTIONS};
pub use profile::{ClassificationRule, KindProfile};
