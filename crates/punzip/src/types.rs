//! Type definitions for batch extraction.

use crate::error::EntryError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Individual entry within an archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Path of the entry within the archive
    pub path: String,

    /// Whether this entry is a directory
    pub is_directory: bool,

    /// Uncompressed size in bytes
    pub size: u64,

    /// Compressed size in bytes
    pub compressed_size: u64,
}

/// Metadata information about an archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveInfo {
    /// Number of entries in the archive
    pub entries: u64,

    /// Size of the archive file on disk
    pub compressed_bytes: u64,

    /// Sum of the uncompressed entry sizes
    pub uncompressed_bytes: u64,

    /// Whether any entry is password-protected
    pub encrypted: bool,

    /// List of all entries in the archive, in index order
    pub entry_list: Vec<ArchiveEntry>,
}

/// How to handle files that already exist at the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteMode {
    /// Leave existing files alone; the entry is reported as skipped
    #[default]
    Skip,

    /// Replace existing files
    Replace,
}

impl From<bool> for OverwriteMode {
    fn from(overwrite: bool) -> Self {
        if overwrite {
            OverwriteMode::Replace
        } else {
            OverwriteMode::Skip
        }
    }
}

/// Why an entry was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipReason {
    /// Target file exists and overwriting is off
    Exists,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Exists => f.write_str("exists"),
        }
    }
}

/// Result of materializing one entry.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// Entry written (or directory ensured). Directory-only entries count
    /// here with zero bytes.
    Extracted {
        /// Decompressed bytes written to disk
        bytes_written: u64,
    },

    /// Entry left alone
    Skipped(SkipReason),

    /// Entry could not be materialized
    Failed(EntryError),
}

/// One entry that failed inside an archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryFailure {
    /// Entry name as stored in the archive
    pub entry: String,

    /// Human-readable cause
    pub error: String,
}

/// Statistics about one completed archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSummary {
    /// Archive that was processed
    pub archive_path: PathBuf,

    /// Number of entries listed in the archive's central directory
    pub entries_total: u64,

    /// Entries written or directories ensured
    pub extracted: u64,

    /// Entries left alone because the target existed
    pub skipped: u64,

    /// Entries that failed, including unsupported layouts
    pub failed: u64,

    /// Total decompressed bytes written to disk
    pub bytes_written: u64,

    /// Wall-clock duration of the archive job (in seconds)
    #[serde(with = "duration_serde")]
    pub duration: Duration,

    /// Whether the job stopped early on cancellation
    pub cancelled: bool,

    /// Per-entry failure details
    pub failures: Vec<EntryFailure>,
}

impl ArchiveSummary {
    pub(crate) fn new(archive_path: PathBuf, entries_total: u64) -> Self {
        Self {
            archive_path,
            entries_total,
            extracted: 0,
            skipped: 0,
            failed: 0,
            bytes_written: 0,
            duration: Duration::ZERO,
            cancelled: false,
            failures: Vec::new(),
        }
    }

    /// Entries that reached a terminal outcome.
    pub fn processed(&self) -> u64 {
        self.extracted + self.skipped + self.failed
    }
}

/// An archive that could not be opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveFailure {
    /// Archive that failed
    pub archive_path: PathBuf,

    /// Human-readable cause
    pub error: String,
}

/// Non-fatal observations made while planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum PlanWarning {
    /// More workers requested than logical cores
    Oversubscribed {
        /// Requested worker count
        requested: usize,
        /// Available logical cores
        cpus: usize,
    },

    /// More workers requested than archives found; clamped down
    ClampedToArchives {
        /// Requested worker count
        requested: usize,
        /// Discovered archive count
        archives: usize,
    },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::Oversubscribed { requested, cpus } => write!(
                f,
                "Assigning more jobs ({}) than available CPUs ({})",
                requested, cpus
            ),
            PlanWarning::ClampedToArchives {
                requested,
                archives,
            } => write!(
                f,
                "Assigning more jobs ({}) than archives found ({}), setting jobs to {}",
                requested, archives, archives
            ),
        }
    }
}

/// Work computed once before dispatch.
///
/// Invariant: `worker_count >= 1`, and `worker_count <= archives.len()`
/// whenever `archives` is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPlan {
    /// Archives in discovery order
    pub archives: Vec<PathBuf>,

    /// Size of the worker pool
    pub worker_count: usize,

    /// Policy for existing files
    pub overwrite: OverwriteMode,

    /// Warnings raised while sizing the pool
    pub warnings: Vec<PlanWarning>,
}

/// Aggregate outcome of a whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// One summary per archive that was opened, in completion order
    pub summaries: Vec<ArchiveSummary>,

    /// Archives that could not be opened
    pub open_failures: Vec<ArchiveFailure>,

    /// Total wall-clock time (in seconds)
    #[serde(with = "duration_serde")]
    pub duration: Duration,

    /// Whether the run was interrupted
    pub cancelled: bool,
}

impl BatchReport {
    /// Archives handed to a worker, opened or not.
    pub fn archives_processed(&self) -> usize {
        self.summaries.len() + self.open_failures.len()
    }

    /// Total entries extracted across all archives.
    pub fn extracted(&self) -> u64 {
        self.summaries.iter().map(|s| s.extracted).sum()
    }

    /// Total entries skipped across all archives.
    pub fn skipped(&self) -> u64 {
        self.summaries.iter().map(|s| s.skipped).sum()
    }

    /// Total entries failed across all archives.
    pub fn failed(&self) -> u64 {
        self.summaries.iter().map(|s| s.failed).sum()
    }

    /// Total bytes written across all archives.
    pub fn bytes_written(&self) -> u64 {
        self.summaries.iter().map(|s| s.bytes_written).sum()
    }

    /// Every archive opened and the run was not interrupted. Per-entry
    /// failures do not count against success.
    pub fn is_success(&self) -> bool {
        self.open_failures.is_empty() && !self.cancelled
    }
}

// Durations serialize as fractional seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
