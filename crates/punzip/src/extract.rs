//! Entry Extractor: materializes one archive entry at its resolved destination.

use crate::error::{EntryError, SecurityError};
use crate::resolve::ResolvedDestination;
use crate::types::{ExtractionOutcome, OverwriteMode, SkipReason};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::Path;
use tracing::warn;
use zip::ZipArchive;

/// Extract the entry at `index` to `destination`.
///
/// - Directory-only destinations are created (existing directories are fine)
///   and reported as extracted.
/// - An existing target with [`OverwriteMode::Skip`] is reported as skipped
///   without reading any bytes from the archive.
/// - Otherwise the entry is decompressed into the target, truncating any
///   existing file. A write that fails part way removes the target again.
/// - A symlink at the target or its directory is refused, so an entry can
///   never be written outside the tree through a pre-existing link.
///
/// Every failure is returned as [`ExtractionOutcome::Failed`]; nothing here
/// aborts the surrounding archive.
pub fn extract_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    destination: &ResolvedDestination,
    overwrite: OverwriteMode,
) -> ExtractionOutcome {
    let Some(target) = destination.file_path() else {
        return match ensure_dir(&destination.directory) {
            Ok(()) => ExtractionOutcome::Extracted { bytes_written: 0 },
            Err(e) => ExtractionOutcome::Failed(e),
        };
    };

    let symlink_check =
        reject_symlink(&destination.directory).and_then(|()| reject_symlink(&target));
    if let Err(e) = symlink_check {
        return ExtractionOutcome::Failed(e);
    }

    if overwrite == OverwriteMode::Skip && target.exists() {
        return ExtractionOutcome::Skipped(SkipReason::Exists);
    }

    match write_entry(archive, index, &destination.directory, &target) {
        Ok(bytes_written) => ExtractionOutcome::Extracted { bytes_written },
        Err(e) => ExtractionOutcome::Failed(e),
    }
}

fn write_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    directory: &Path,
    target: &Path,
) -> Result<u64, EntryError> {
    // Open the entry before touching the target so a corrupt header
    // leaves any existing file intact
    let mut entry = archive.by_index(index)?;

    ensure_dir(directory)?;

    let file = File::create(target).map_err(|e| EntryError::io(target, e))?;
    match copy_into(&mut entry, file) {
        Ok(bytes_written) => Ok(bytes_written),
        Err(e) => {
            // A truncated or corrupt file would be skipped as existing next run
            if let Err(remove_err) = fs::remove_file(target) {
                if remove_err.kind() != io::ErrorKind::NotFound {
                    warn!("Could not remove partial file {}: {}", target.display(), remove_err);
                }
            }
            Err(EntryError::io(target, e))
        }
    }
}

fn copy_into(entry: &mut impl Read, file: File) -> io::Result<u64> {
    let mut writer = BufWriter::new(file);
    let bytes_written = io::copy(entry, &mut writer)?;
    writer.flush()?;
    Ok(bytes_written)
}

/// Fails if `path` is a symbolic link, dangling or not.
fn reject_symlink(path: &Path) -> Result<(), EntryError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => Err(EntryError::Security(
            SecurityError::SymlinkTarget(path.display().to_string()),
        )),
        _ => Ok(()),
    }
}

/// Create `dir` and its parents. Another worker creating the same directory
/// concurrently is not an error.
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), EntryError> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(EntryError::io(dir, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn archive_with(files: &[(&str, &[u8])]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in files {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        let cursor = zip.finish().unwrap();
        ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap()
    }

    fn dest(directory: PathBuf, filename: &str) -> ResolvedDestination {
        ResolvedDestination {
            directory,
            filename: filename.to_string(),
        }
    }

    #[test]
    fn test_extract_entry_writes_file_and_parents() {
        let temp_dir = TempDir::new().unwrap();
        let mut archive = archive_with(&[("a.txt", b"Hello, World!")]);
        let d = dest(temp_dir.path().join("x/y"), "a.txt");

        let outcome = extract_entry(&mut archive, 0, &d, OverwriteMode::Skip);

        assert!(matches!(outcome, ExtractionOutcome::Extracted { bytes_written: 13 }));
        let content = fs::read_to_string(temp_dir.path().join("x/y/a.txt")).unwrap();
        assert_eq!(content, "Hello, World!");
    }

    #[test]
    fn test_extract_entry_skips_existing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"Existing content").unwrap();
        let mut archive = archive_with(&[("a.txt", b"new")]);
        let d = dest(temp_dir.path().to_path_buf(), "a.txt");

        let outcome = extract_entry(&mut archive, 0, &d, OverwriteMode::Skip);

        assert!(matches!(outcome, ExtractionOutcome::Skipped(SkipReason::Exists)));
        let content = fs::read_to_string(temp_dir.path().join("a.txt")).unwrap();
        assert_eq!(content, "Existing content");
    }

    #[test]
    fn test_extract_entry_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.txt"), b"Existing, much longer content").unwrap();
        let mut archive = archive_with(&[("a.txt", b"new")]);
        let d = dest(temp_dir.path().to_path_buf(), "a.txt");

        let outcome = extract_entry(&mut archive, 0, &d, OverwriteMode::Replace);

        assert!(matches!(outcome, ExtractionOutcome::Extracted { bytes_written: 3 }));
        let content = fs::read_to_string(temp_dir.path().join("a.txt")).unwrap();
        assert_eq!(content, "new");
    }

    #[test]
    fn test_extract_entry_directory_only() {
        let temp_dir = TempDir::new().unwrap();
        let mut archive = archive_with(&[("unused.txt", b"")]);
        let d = dest(temp_dir.path().join("only/dirs"), "");

        let outcome = extract_entry(&mut archive, 0, &d, OverwriteMode::Skip);
        assert!(matches!(outcome, ExtractionOutcome::Extracted { bytes_written: 0 }));
        assert!(temp_dir.path().join("only/dirs").is_dir());

        // Second time the directory already exists
        let outcome = extract_entry(&mut archive, 0, &d, OverwriteMode::Skip);
        assert!(matches!(outcome, ExtractionOutcome::Extracted { .. }));
    }

    #[test]
    fn test_extract_entry_target_is_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a.txt")).unwrap();
        let mut archive = archive_with(&[("a.txt", b"data")]);
        let d = dest(temp_dir.path().to_path_buf(), "a.txt");

        let outcome = extract_entry(&mut archive, 0, &d, OverwriteMode::Replace);
        assert!(matches!(outcome, ExtractionOutcome::Failed(EntryError::Io { .. })));
    }

    #[test]
    fn test_extract_entry_bad_index_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut archive = archive_with(&[("a.txt", b"data")]);
        let d = dest(temp_dir.path().to_path_buf(), "a.txt");

        let outcome = extract_entry(&mut archive, 7, &d, OverwriteMode::Skip);
        assert!(matches!(outcome, ExtractionOutcome::Failed(EntryError::Zip(_))));
        assert!(!temp_dir.path().join("a.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_entry_refuses_symlinked_target() {
        let temp_dir = TempDir::new().unwrap();
        let outside = temp_dir.path().join("outside.txt");
        let out_dir = temp_dir.path().join("out");
        fs::create_dir_all(&out_dir).unwrap();
        // Dangling link: exists() is false for it
        std::os::unix::fs::symlink(&outside, out_dir.join("a.txt")).unwrap();

        let mut archive = archive_with(&[("a.txt", b"payload")]);
        let d = dest(out_dir.clone(), "a.txt");

        for mode in [OverwriteMode::Skip, OverwriteMode::Replace] {
            let outcome = extract_entry(&mut archive, 0, &d, mode);
            assert!(matches!(
                outcome,
                ExtractionOutcome::Failed(EntryError::Security(SecurityError::SymlinkTarget(_)))
            ));
        }
        assert!(!outside.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_entry_refuses_symlinked_directory() {
        let temp_dir = TempDir::new().unwrap();
        let elsewhere = temp_dir.path().join("elsewhere");
        fs::create_dir_all(&elsewhere).unwrap();
        std::os::unix::fs::symlink(&elsewhere, temp_dir.path().join("linked")).unwrap();

        let mut archive = archive_with(&[("a.txt", b"payload")]);
        let d = dest(temp_dir.path().join("linked"), "a.txt");

        let outcome = extract_entry(&mut archive, 0, &d, OverwriteMode::Replace);
        assert!(matches!(
            outcome,
            ExtractionOutcome::Failed(EntryError::Security(SecurityError::SymlinkTarget(_)))
        ));
        assert!(!elsewhere.join("a.txt").exists());
    }

    #[test]
    fn test_ensure_dir_tolerates_existing() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("shared");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
