//! Error types for batch extraction.
//!
//! Errors are layered by blast radius: a [`ConfigError`] stops the run before
//! any work starts, an [`ExtractError`] loses one archive, and an
//! [`EntryError`] loses one entry inside an otherwise processed archive.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid run configuration, detected before any archive is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The root directory to scan does not exist.
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// The root path exists but is not a directory.
    #[error("Root is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The requested worker count is not a positive integer.
    #[error("Number of jobs must be a positive integer, got {0}")]
    InvalidJobCount(usize),

    /// The archive filename pattern is not a valid regular expression.
    #[error("Invalid filename pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Archive-level failure: the archive could not be opened at all.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Archive file not found at the specified path.
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    /// The archive is corrupted or not a ZIP container.
    #[error("Corrupted archive {}: {source}", path.display())]
    Corrupted {
        /// Archive that failed to open
        path: PathBuf,
        /// Underlying ZIP error
        #[source]
        source: zip::result::ZipError,
    },

    /// An I/O error occurred while opening the archive.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Path Resolver could not map an entry name onto the target layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Folder depth the duplicated-root heuristic cannot normalize.
    #[error("Don't know how to deal with folder depth of {segments} path segments")]
    DepthUnsupported {
        /// Number of `/`-separated segments in the entry name
        segments: usize,
    },
}

/// Security-related errors during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    /// Path traversal attempt detected (e.g., "../../../etc/passwd").
    #[error("Path traversal attempt: {0}")]
    PathTraversal(String),

    /// Absolute path not allowed in archive entries.
    #[error("Absolute path not allowed: {0}")]
    AbsolutePath(String),

    /// The destination on disk is a symbolic link.
    #[error("Refusing to write through symlink: {0}")]
    SymlinkTarget(String),
}

/// Failure of a single entry. Recorded, counted, never fatal for the archive.
#[derive(Debug, Error)]
pub enum EntryError {
    /// The entry's folder layout is not supported.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The entry name would escape the extraction root.
    #[error("Security violation: {0}")]
    Security(#[from] SecurityError),

    /// The entry could not be read or decompressed.
    #[error("Corrupted entry: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing the entry to disk failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// Target path on disk
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl EntryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EntryError::Io {
            path: path.into(),
            source,
        }
    }
}
