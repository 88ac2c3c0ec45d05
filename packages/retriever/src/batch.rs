//! Concurrent processing of independent bulk files.
//!
//! Each file is its own stream with its own splitter and counters; files
//! only share the sink. Streams run on the blocking thread pool, at most
//! `max_concurrency` at a time.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::classify::Classifier;
use crate::error::RetrieverError;
use crate::processor::{RunReport, StreamProcessor};
use crate::sink::Sink;
use crate::types::RunSummary;

/// Report for one file of a batch.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: RunReport,
}

fn failed_task(message: String) -> RunReport {
    RunReport {
        summary: RunSummary {
            aborted: true,
            ..RunSummary::default()
        },
        error: Some(RetrieverError::Task(message)),
    }
}

/// Process `paths` concurrently, returning one report per path in input order.
///
/// A failing file never stops the others.
pub async fn process_files(
    paths: Vec<PathBuf>,
    sink: Arc<dyn Sink>,
    classifier: Classifier,
    max_concurrency: usize,
) -> Vec<FileReport> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut handles = Vec::with_capacity(paths.len());

    for path in paths {
        let sink = Arc::clone(&sink);
        let classifier = classifier.clone();
        let semaphore = Arc::clone(&semaphore);
        let task_path = path.clone();

        let handle = tokio::spawn(async move {
            // The semaphore is never closed, so a permit is always granted.
            let _permit = semaphore.acquire_owned().await.ok();
            tokio::task::spawn_blocking(move || {
                StreamProcessor::new(sink.as_ref())
                    .with_classifier(classifier)
                    .process_file(&task_path)
            })
            .await
            .unwrap_or_else(|e| failed_task(e.to_string()))
        });
        handles.push((path, handle));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (path, handle) in handles {
        let report = handle
            .await
            .unwrap_or_else(|e| failed_task(e.to_string()));
        if let Some(e) = &report.error {
            tracing::error!(path = %path.display(), error = %e, "Bulk file failed");
        }
        reports.push(FileReport { path, report });
    }
    reports
}

/// Sum of the counters of all reports.
#[must_use]
pub fn total_summary(reports: &[FileReport]) -> RunSummary {
    let mut total = RunSummary::default();
    for file in reports {
        total.merge(&file.report.summary);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::sink::MemorySink;
    use std::fs;
    use tempfile::tempdir;

    fn sequence(doc_number: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<sequence-cwu><publication-reference><document-id>\
             <doc-number>{doc_number}</doc-number></document-id></publication-reference></sequence-cwu>\n"
        )
    }

    #[tokio::test]
    async fn test_files_are_processed_independently() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("ipg200107.xml");
        let second = dir.path().join("ipg200114.xml");
        let missing = dir.path().join("ipg200121.xml");
        fs::write(&first, [sequence("001"), sequence("002")].concat()).unwrap();
        fs::write(&second, sequence("003")).unwrap();

        let sink = Arc::new(MemorySink::new(OutputFormat::Xml));
        let reports = process_files(
            vec![first.clone(), missing.clone(), second.clone()],
            sink.clone(),
            Classifier::default(),
            2,
        )
        .await;

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].path, first);
        assert_eq!(reports[0].report.summary.forwarded_sequence, 2);
        assert!(reports[1].report.is_aborted());
        assert_eq!(reports[2].report.summary.forwarded_sequence, 1);

        let total = total_summary(&reports);
        assert_eq!(total.forwarded_sequence, 3);
        assert!(total.aborted);

        let mut keys = sink.keys();
        keys.sort();
        assert_eq!(keys, vec!["seq/1.xml", "seq/2.xml", "seq/3.xml"]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let sink = Arc::new(MemorySink::new(OutputFormat::Xml));
        let reports = process_files(Vec::new(), sink, Classifier::default(), 1).await;
        assert!(reports.is_empty());
        assert_eq!(total_summary(&reports), RunSummary::default());
    }
}
