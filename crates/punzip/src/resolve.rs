//! Path Resolver: maps archive entry names onto the on-disk layout.
//!
//! Archives in this domain are produced by tools that disagree on layout.
//! Some store entries bare, some under one folder, and some repeat the top
//! folder twice (`Name/Name/file.ext`). The rules here flatten all three into
//! the same result, relative to the directory the archive lives in:
//!
//! | entry name            | directory                   | file name |
//! |-----------------------|-----------------------------|-----------|
//! | `file`                | `<root>/<archive stem>`     | `file`    |
//! | `dir/file`            | `<root>/dir`                | `file`    |
//! | `X/X/file`            | `<root>/X`                  | `file`    |
//! | `X/X/sub/file`        | `<root>/X/sub`              | `file`    |
//! | `a/b/file`, `a/b/c/d` | unsupported                 |           |
//!
//! A trailing `/` leaves an empty file name, which marks a directory-only
//! entry.

use crate::error::ResolveError;
use std::path::{Path, PathBuf};

/// Where one entry lands on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDestination {
    /// Directory that receives the entry
    pub directory: PathBuf,

    /// File name inside `directory`; empty for directory-only entries
    pub filename: String,
}

impl ResolvedDestination {
    /// Whether this entry only asks for its directory to exist.
    pub fn is_directory_only(&self) -> bool {
        self.filename.is_empty()
    }

    /// Full path of the file to write, if any.
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.is_directory_only() {
            None
        } else {
            Some(self.directory.join(&self.filename))
        }
    }
}

/// The parts of an archive's own location the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRoot {
    /// Directory containing the archive
    pub dir: PathBuf,

    /// Archive file name with its extension stripped (`Foo.zip` -> `Foo`)
    pub stem: String,
}

impl ArchiveRoot {
    /// Derive the root for an archive path.
    pub fn for_archive(archive_path: &Path) -> Self {
        let dir = archive_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = archive_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self { dir, stem }
    }

    /// Directory bare entries are written into.
    pub fn stem_dir(&self) -> PathBuf {
        self.dir.join(&self.stem)
    }
}

/// Resolve one entry name against the archive's location.
///
/// Pure: performs no I/O. Names are split on `/` verbatim, so empty segments
/// are kept and compared like any other.
///
/// # Errors
///
/// Returns [`ResolveError::DepthUnsupported`] for three or more segments whose
/// first two differ.
///
/// # Examples
///
/// ```
/// use punzip::resolve::{resolve, ArchiveRoot};
/// use std::path::Path;
///
/// let root = ArchiveRoot::for_archive(Path::new("/data/Foo.zip"));
///
/// let dest = resolve("Foo/Foo/a.txt", &root).unwrap();
/// assert_eq!(dest.directory, Path::new("/data/Foo"));
/// assert_eq!(dest.filename, "a.txt");
///
/// assert!(resolve("a/b/c/d.txt", &root).is_err());
/// ```
pub fn resolve(entry_name: &str, root: &ArchiveRoot) -> Result<ResolvedDestination, ResolveError> {
    let segments: Vec<&str> = entry_name.split('/').collect();

    match segments.as_slice() {
        [name] => Ok(ResolvedDestination {
            directory: root.stem_dir(),
            filename: (*name).to_string(),
        }),
        [dir, name] => Ok(ResolvedDestination {
            directory: root.dir.join(dir),
            filename: (*name).to_string(),
        }),
        [first, second, rest @ ..] if first == second => {
            // rest is non-empty: at least three segments matched here
            let (name, middle) = rest
                .split_last()
                .ok_or(ResolveError::DepthUnsupported {
                    segments: segments.len(),
                })?;
            let mut directory = root.dir.join(second);
            directory.extend(middle);
            Ok(ResolvedDestination {
                directory,
                filename: (*name).to_string(),
            })
        }
        _ => Err(ResolveError::DepthUnsupported {
            segments: segments.len(),
        }),
    }
}
