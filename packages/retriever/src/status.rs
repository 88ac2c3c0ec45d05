//! Run status file written next to filesystem output.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::SUMMARY_FILE_NAME;
use crate::error::Result;
use crate::processor::RunReport;
use crate::types::RunSummary;

/// Outcome of one stream, as recorded in the status file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStatus {
    pub source: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub summary: RunSummary,
}

impl StreamStatus {
    #[must_use]
    pub fn from_report(source: impl Into<String>, report: &RunReport) -> Self {
        Self {
            source: source.into(),
            status: if report.is_aborted() { "aborted" } else { "completed" }.to_string(),
            error: report.error.as_ref().map(ToString::to_string),
            summary: report.summary.clone(),
        }
    }
}

/// Contents of `summary.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatusFile {
    pub generated_at: String,
    pub streams: Vec<StreamStatus>,
    pub total: RunSummary,
}

impl RunStatusFile {
    #[must_use]
    pub fn new(streams: Vec<StreamStatus>) -> Self {
        let mut total = RunSummary::default();
        for stream in &streams {
            total.merge(&stream.summary);
        }
        Self {
            generated_at: Utc::now().to_rfc3339(),
            streams,
            total,
        }
    }
}

/// Write the status file into `output_dir`.
pub fn save_status(status: &RunStatusFile, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(SUMMARY_FILE_NAME);

    let yaml = serde_yaml_ng::to_string(status)?;
    let mut file = File::create(&path)?;
    file.write_all(format!("---\n{yaml}").as_bytes())?;

    Ok(path)
}
