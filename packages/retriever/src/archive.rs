//! ZIP extraction of downloaded bulk archives.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{RetrieverError, Result};

/// Extract the first `.xml` entry of `archive_path` into `dest_dir`.
///
/// The entry is streamed to disk; it is usually far larger than memory
/// allows. Directory components of the entry name are dropped.
///
/// # Returns
/// Path of the extracted file.
pub fn extract_xml(archive_path: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let Some(name) = entry.enclosed_name() else {
            tracing::warn!(entry = %entry.name(), "Skipping archive entry with unsafe path");
            continue;
        };
        let is_xml = name
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        let Some(file_name) = name.file_name().filter(|_| is_xml) else {
            continue;
        };

        let out_path = dest_dir.join(file_name);
        let mut out = BufWriter::new(File::create(&out_path)?);
        let bytes = io::copy(&mut entry, &mut out)?;
        out.flush()?;

        tracing::info!(
            archive = %archive_path.display(),
            path = %out_path.display(),
            bytes,
            "Extracted bulk file"
        );
        return Ok(out_path);
    }

    Err(RetrieverError::MissingArchiveEntry(
        archive_path.display().to_string(),
    ))
}
