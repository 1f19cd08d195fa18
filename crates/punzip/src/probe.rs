//! Archive probing: read the central directory without extracting.

use crate::error::ExtractError;
use crate::types::{ArchiveEntry, ArchiveInfo};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use zip::ZipArchive;

/// Probe an archive to retrieve metadata without extracting.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be read, or is not a
/// ZIP container.
pub fn probe_archive(path: &Path) -> Result<ArchiveInfo, ExtractError> {
    let mut archive = open_archive(path)?;
    let compressed_bytes = std::fs::metadata(path)?.len();

    let mut entry_list = Vec::with_capacity(archive.len());
    let mut encrypted = false;

    for i in 0..archive.len() {
        // Raw access reads headers only and works for encrypted entries too
        let entry = archive
            .by_index_raw(i)
            .map_err(|source| ExtractError::Corrupted {
                path: path.to_path_buf(),
                source,
            })?;

        encrypted |= entry.encrypted();
        entry_list.push(ArchiveEntry {
            path: entry.name().to_string(),
            is_directory: entry.is_dir(),
            size: entry.size(),
            compressed_size: entry.compressed_size(),
        });
    }

    Ok(ArchiveInfo {
        entries: entry_list.len() as u64,
        compressed_bytes,
        uncompressed_bytes: entry_list.iter().map(|e| e.size).sum(),
        encrypted,
        entry_list,
    })
}

/// Open a ZIP archive for reading, mapping failures to archive-level errors.
pub(crate) fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| ExtractError::Corrupted {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::{SimpleFileOptions, ZipWriter};

    #[test]
    fn test_probe_zip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.zip");

        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.add_directory("a/", SimpleFileOptions::default()).unwrap();
        zip.start_file("a/one.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"12345").unwrap();
        zip.start_file("a/two.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"123").unwrap();
        zip.finish().unwrap();

        let info = probe_archive(&path).unwrap();
        assert_eq!(info.entries, 3);
        assert_eq!(info.uncompressed_bytes, 8);
        assert!(info.compressed_bytes > 0);
        assert!(!info.encrypted);
        assert!(info.entry_list[0].is_directory);
        assert_eq!(info.entry_list[1].path, "a/one.txt");
    }

    #[test]
    fn test_probe_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = probe_archive(&temp_dir.path().join("missing.zip"));
        assert!(matches!(result, Err(ExtractError::NotFound(_))));
    }

    #[test]
    fn test_probe_not_a_zip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.zip");
        std::fs::write(&path, b"this is not a zip file").unwrap();

        let result = probe_archive(&path);
        assert!(matches!(result, Err(ExtractError::Corrupted { .. })));
    }
}
