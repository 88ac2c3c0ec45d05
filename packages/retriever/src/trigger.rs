//! Job trigger payloads and USPTO archive naming.
//!
//! USPTO publishes one bulk archive per week: grants on Tuesdays
//! (`ipgYYMMDD.zip`) and applications on Thursdays (`ipaYYMMDD.zip`).
//! A trigger names a year and ISO week; the archive follows from that.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::BULK_DATA_URL;
use crate::error::{RetrieverError, Result};

/// Bulk archive file name: kind prefix, YYMMDD, extension.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARCHIVE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ipg|ipa)(\d{6})\.(xml|zip)$").expect("valid regex"));

/// Which weekly bulk archive to retrieve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    /// Patent grant full text (`ipg`).
    #[default]
    Grant,

    /// Patent application full text (`ipa`).
    Application,
}

impl ArchiveKind {
    /// Weekday the archive is published on.
    #[must_use]
    pub fn publication_weekday(&self) -> Weekday {
        match self {
            Self::Grant => Weekday::Tue,
            Self::Application => Weekday::Thu,
        }
    }

    /// File name prefix.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Grant => "ipg",
            Self::Application => "ipa",
        }
    }

    /// Path segment in the bulk data URL.
    #[must_use]
    pub fn url_segment(&self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::Application => "application",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "ipg" => Some(Self::Grant),
            "ipa" => Some(Self::Application),
            _ => None,
        }
    }
}

/// Payload of a retrieval job.
///
/// Both fields set selects ISO week `week` of `year`; otherwise the
/// current week is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
}

impl TriggerPayload {
    /// Parse a payload from a JSON body. An empty body means "this week".
    pub fn from_json(body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(body)?)
    }

    /// Publication date of the archive this payload selects.
    pub fn archive_date(&self, kind: ArchiveKind) -> Result<NaiveDate> {
        let weekday = kind.publication_weekday();
        match (self.year, self.week) {
            (Some(year), Some(week)) => NaiveDate::from_isoywd_opt(year, week, weekday)
                .ok_or_else(|| {
                    RetrieverError::InvalidTrigger(format!("year {year} has no ISO week {week}"))
                }),
            (None, None) => {
                let today = Local::now().date_naive();
                let iso = today.iso_week();
                NaiveDate::from_isoywd_opt(iso.year(), iso.week(), weekday).ok_or_else(|| {
                    RetrieverError::InvalidTrigger(format!("no publication day in week of {today}"))
                })
            }
            _ => Err(RetrieverError::InvalidTrigger(
                "year and week must be given together".to_string(),
            )),
        }
    }

    /// Archive this payload selects.
    pub fn archive(&self, kind: ArchiveKind) -> Result<ArchiveName> {
        Ok(ArchiveName::new(kind, self.archive_date(kind)?))
    }
}

/// A weekly bulk archive, identified by kind and publication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveName {
    pub kind: ArchiveKind,
    pub date: NaiveDate,
}

impl ArchiveName {
    #[must_use]
    pub fn new(kind: ArchiveKind, date: NaiveDate) -> Self {
        Self { kind, date }
    }

    /// File stem, e.g. `ipg200107`.
    #[must_use]
    pub fn stem(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.date.format("%y%m%d"))
    }

    #[must_use]
    pub fn zip_file_name(&self) -> String {
        format!("{}.zip", self.stem())
    }

    #[must_use]
    pub fn xml_file_name(&self) -> String {
        format!("{}.xml", self.stem())
    }

    /// Download URL of the archive.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use uspto_retriever::trigger::{ArchiveKind, ArchiveName};
    ///
    /// let date = NaiveDate::from_ymd_opt(2020, 1, 7).unwrap();
    /// assert_eq!(
    ///     ArchiveName::new(ArchiveKind::Grant, date).url(),
    ///     "https://bulkdata.uspto.gov/data/patent/grant/redbook/fulltext/2020/ipg200107.zip"
    /// );
    /// ```
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{BULK_DATA_URL}/{}/redbook/fulltext/{}/{}",
            self.kind.url_segment(),
            self.date.format("%Y"),
            self.zip_file_name()
        )
    }

    /// Recognise a bulk file name such as `ipa200109.xml`.
    ///
    /// Two-digit years are read as 20YY.
    #[must_use]
    pub fn parse_file_name(name: &str) -> Option<Self> {
        let caps = ARCHIVE_NAME_PATTERN.captures(name)?;
        let kind = ArchiveKind::from_prefix(caps.get(1)?.as_str())?;
        let date = NaiveDate::parse_from_str(&format!("20{}", caps.get(2)?.as_str()), "%Y%m%d").ok()?;
        Some(Self { kind, date })
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stem())
    }
}
