//! Weekly archive retrieval: download, extract, process, clean up.

use std::fs;
use std::path::Path;

use crate::archive::extract_xml;
use crate::config::RetrieverConfig;
use crate::error::{RetrieverError, Result};
use crate::http::{create_client, download_to_file};
use crate::processor::{RunReport, StreamProcessor};
use crate::trigger::ArchiveName;

/// Download `archive` from USPTO and run it through `processor`.
///
/// Download and extraction failures are returned as errors; a failure
/// while processing the extracted stream is part of the returned report.
pub fn retrieve(
    archive: &ArchiveName,
    config: &RetrieverConfig,
    processor: &StreamProcessor<'_>,
) -> Result<RunReport> {
    retrieve_from(&archive.url(), archive, config, processor)
}

/// Like [`retrieve`], downloading from `url` instead of the USPTO address.
pub fn retrieve_from(
    url: &str,
    archive: &ArchiveName,
    config: &RetrieverConfig,
    processor: &StreamProcessor<'_>,
) -> Result<RunReport> {
    fs::create_dir_all(&config.tmp_dir)?;
    let zip_path = config.tmp_dir.join(archive.zip_file_name());

    let result = download_and_process(url, archive, &zip_path, config, processor);

    if !config.keep_tmp {
        let xml_path = match &result {
            Ok((_, xml_path)) => xml_path.clone(),
            Err(_) => config.tmp_dir.join(archive.xml_file_name()),
        };
        clean_up(&config.tmp_dir, &zip_path, Some(&xml_path));
    }

    result.map(|(report, _)| report)
}

fn download_and_process(
    url: &str,
    archive: &ArchiveName,
    zip_path: &Path,
    config: &RetrieverConfig,
    processor: &StreamProcessor<'_>,
) -> Result<(RunReport, std::path::PathBuf)> {
    tracing::info!(archive = %archive, url, "Downloading bulk archive");
    let client = create_client()?;
    download_to_file(&client, url, zip_path).map_err(|e| match e {
        RetrieverError::Http(source) => RetrieverError::ArchiveDownload {
            name: archive.zip_file_name(),
            source,
        },
        other => other,
    })?;

    let xml_path = extract_xml(zip_path, &config.tmp_dir)?;
    let report = processor.process_file(&xml_path);
    Ok((report, xml_path))
}

/// Remove the files a retrieval created, and the scratch directory if it is
/// left empty. Failures are logged, never returned.
fn clean_up(tmp_dir: &Path, zip_path: &Path, xml_path: Option<&Path>) {
    for path in [Some(zip_path), xml_path].into_iter().flatten() {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
            }
        }
    }

    // Only succeeds when nothing else lives in the directory.
    if fs::remove_dir(tmp_dir).is_ok() {
        tracing::debug!(path = %tmp_dir.display(), "Removed temporary directory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_clean_up_keeps_foreign_files() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("tmp");
        fs::create_dir_all(&tmp).unwrap();
        let zip = tmp.join("ipg200107.zip");
        let xml = tmp.join("ipg200107.xml");
        let other = tmp.join("keep.txt");
        for path in [&zip, &xml, &other] {
            fs::write(path, b"x").unwrap();
        }

        clean_up(&tmp, &zip, Some(&xml));

        assert!(!zip.exists());
        assert!(!xml.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_clean_up_removes_empty_dir() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("tmp");
        fs::create_dir_all(&tmp).unwrap();
        let zip = tmp.join("ipg200107.zip");
        fs::write(&zip, b"x").unwrap();

        clean_up(&tmp, &zip, None);

        assert!(!tmp.exists());
    }
}
