//! Configuration constants and runtime settings for the retriever.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RetrieverError, Result};

/// Base URL of the USPTO bulk data repository.
pub const BULK_DATA_URL: &str = "https://bulkdata.uspto.gov/data/patent";

/// HTTP timeout in seconds.
///
/// Weekly archives are several hundred megabytes; the timeout covers the
/// whole transfer.
pub const HTTP_TIMEOUT_SECS: u64 = 1800;

/// File name of the run summary written next to filesystem output.
pub const SUMMARY_FILE_NAME: &str = "summary.yaml";

/// How forwarded documents are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The document bytes exactly as they appeared in the bulk file.
    #[default]
    Xml,

    /// The parsed element tree as JSON.
    Json,
}

impl OutputFormat {
    /// File extension used in storage keys.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RetrieverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(RetrieverError::Config(format!(
                "unknown output format '{other}', expected xml or json"
            ))),
        }
    }
}

/// Settings for a retriever run.
///
/// Passed explicitly to everything that needs it; nothing is read from
/// global state after construction.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Root directory of the filesystem sink.
    pub output_dir: PathBuf,

    /// Scratch directory for downloaded and extracted archives.
    pub tmp_dir: PathBuf,

    pub format: OutputFormat,

    /// Keep the scratch directory after a fetch.
    pub keep_tmp: bool,

    /// Maximum number of bulk files processed at the same time.
    pub max_concurrency: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            tmp_dir: PathBuf::from("./tmp"),
            format: OutputFormat::Xml,
            keep_tmp: false,
            max_concurrency: 4,
        }
    }
}

impl RetrieverConfig {
    /// Build a configuration from `RETRIEVER_*` environment variables,
    /// falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let output_dir = lookup("RETRIEVER_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let tmp_dir = lookup("RETRIEVER_TMP_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.tmp_dir);

        let format = match lookup("RETRIEVER_OUTPUT_FORMAT") {
            Some(value) => value.parse()?,
            None => defaults.format,
        };

        let keep_tmp = lookup("RETRIEVER_KEEP_TMP")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(defaults.keep_tmp);

        let max_concurrency = match lookup("RETRIEVER_MAX_CONCURRENCY") {
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    RetrieverError::Config(format!(
                        "RETRIEVER_MAX_CONCURRENCY must be a positive integer, got '{value}'"
                    ))
                })?,
            None => defaults.max_concurrency,
        };

        Ok(Self {
            output_dir,
            tmp_dir,
            format,
            keep_tmp,
            max_concurrency,
        })
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_keep_tmp(mut self, keep_tmp: bool) -> Self {
        self.keep_tmp = keep_tmp;
        self
    }

    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RetrieverConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.tmp_dir, PathBuf::from("./tmp"));
        assert_eq!(config.format, OutputFormat::Xml);
        assert!(!config.keep_tmp);
        assert_eq!(config.max_concurrency, 4);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = RetrieverConfig::from_lookup(lookup(&[
            ("RETRIEVER_OUTPUT_DIR", "/data/out"),
            ("RETRIEVER_TMP_DIR", "/data/tmp"),
            ("RETRIEVER_OUTPUT_FORMAT", "JSON"),
            ("RETRIEVER_KEEP_TMP", "1"),
            ("RETRIEVER_MAX_CONCURRENCY", "8"),
        ]))
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.tmp_dir, PathBuf::from("/data/tmp"));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.keep_tmp);
        assert_eq!(config.max_concurrency, 8);
    }

    #[test]
    fn test_invalid_values() {
        assert!(RetrieverConfig::from_lookup(lookup(&[("RETRIEVER_OUTPUT_FORMAT", "csv")])).is_err());
        assert!(RetrieverConfig::from_lookup(lookup(&[("RETRIEVER_MAX_CONCURRENCY", "0")])).is_err());
        assert!(RetrieverConfig::from_lookup(lookup(&[("RETRIEVER_MAX_CONCURRENCY", "x")])).is_err());
    }

    #[test]
    fn test_keep_tmp_false_values() {
        for value in ["false", "0"] {
            let config =
                RetrieverConfig::from_lookup(lookup(&[("RETRIEVER_KEEP_TMP", value)])).unwrap();
            assert!(!config.keep_tmp);
        }
    }

    #[test]
    fn test_builder() {
        let config = RetrieverConfig::default()
            .with_output_dir("out")
            .with_format(OutputFormat::Json)
            .with_max_concurrency(0);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.format.extension(), "json");
        assert_eq!(config.max_concurrency, 1);
    }
}
