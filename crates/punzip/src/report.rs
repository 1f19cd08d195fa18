//! Progress reporting.
//!
//! Workers never log directly. Each one is handed a [`Reporter`] when it is
//! spawned and publishes [`JobEvent`]s through it; the scheduler merges the
//! worker streams into one ordered stream for the caller's reporter.

use crate::types::{ArchiveFailure, ArchiveSummary, SkipReason};
use crossbeam_channel::Sender;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

/// Something that happened while extracting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum JobEvent {
    /// An archive was opened and its entries enumerated
    ArchiveStarted {
        /// Archive being processed
        archive: PathBuf,
        /// Number of entries it lists
        entries: u64,
    },

    /// A directory was created for a directory-only entry
    DirectoryCreated {
        /// Archive being processed
        archive: PathBuf,
        /// Directory on disk
        directory: PathBuf,
    },

    /// An entry was written to disk
    EntryExtracted {
        /// Archive being processed
        archive: PathBuf,
        /// Target file on disk
        target: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// An entry was left alone
    EntrySkipped {
        /// Archive being processed
        archive: PathBuf,
        /// Entry name inside the archive
        entry: String,
        /// Why it was skipped
        reason: SkipReason,
    },

    /// An entry failed; the archive carries on
    EntryFailed {
        /// Archive being processed
        archive: PathBuf,
        /// Entry name inside the archive
        entry: String,
        /// Human-readable cause
        error: String,
    },

    /// Roughly every tenth of an archive's entries
    Milestone {
        /// Archive being processed
        archive: PathBuf,
        /// Entries with a terminal outcome so far
        processed: u64,
        /// Entries in the archive
        total: u64,
    },

    /// An archive finished
    ArchiveFinished(ArchiveSummary),

    /// An archive could not be opened
    ArchiveFailed(ArchiveFailure),

    /// Every archive has been handed back to the scheduler
    BatchFinished {
        /// Archives processed
        archives: usize,
        /// Entries extracted across all archives
        extracted: u64,
        /// Entries skipped across all archives
        skipped: u64,
        /// Entries failed across all archives
        failed: u64,
        /// Total wall-clock time
        #[serde(serialize_with = "serialize_secs")]
        duration: Duration,
    },
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Sink for [`JobEvent`]s.
pub trait Reporter {
    /// Accept one event.
    fn report(&self, event: JobEvent);
}

impl<F: Fn(JobEvent)> Reporter for F {
    fn report(&self, event: JobEvent) {
        self(event)
    }
}

/// Forwards events to another thread. Given to each worker at spawn time.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: Sender<JobEvent>,
}

impl ChannelReporter {
    /// Wrap the sending half of an event channel.
    pub fn new(tx: Sender<JobEvent>) -> Self {
        Self { tx }
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, event: JobEvent) {
        // Receiver gone means the scheduler is unwinding; nothing to report to
        let _ = self.tx.send(event);
    }
}

/// Writes events as `tracing` records, tagged with the archive file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: JobEvent) {
        match event {
            JobEvent::ArchiveStarted { archive, entries } => {
                info!(archive = %archive_name(&archive), "Starting to decompress {} files.", entries);
            }
            JobEvent::DirectoryCreated { archive, directory } => {
                debug!(archive = %archive_name(&archive), "Ensured folder {}", directory.display());
            }
            JobEvent::EntryExtracted {
                archive,
                target,
                bytes,
            } => {
                debug!(archive = %archive_name(&archive), "Decompressed {} ({} bytes)", target.display(), bytes);
            }
            JobEvent::EntrySkipped {
                archive,
                entry,
                reason,
            } => {
                debug!(archive = %archive_name(&archive), "Skipping {}: {}", entry, reason);
            }
            JobEvent::EntryFailed {
                archive,
                entry,
                error,
            } => {
                error!(archive = %archive_name(&archive), "Error extracting {}: {}", entry, error);
            }
            JobEvent::Milestone {
                archive,
                processed,
                total,
            } => {
                info!(archive = %archive_name(&archive), "{}/{} files processed", processed, total);
            }
            JobEvent::ArchiveFinished(summary) => {
                info!(
                    archive = %archive_name(&summary.archive_path),
                    "Finished. Extracted {}, skipped {} and failed {} files in {:.3} seconds.",
                    summary.extracted,
                    summary.skipped,
                    summary.failed,
                    summary.duration.as_secs_f64()
                );
            }
            JobEvent::ArchiveFailed(failure) => {
                error!(
                    archive = %archive_name(&failure.archive_path),
                    "Error opening archive {}: {}",
                    failure.archive_path.display(),
                    failure.error
                );
            }
            JobEvent::BatchFinished {
                archives,
                extracted,
                skipped,
                failed,
                duration,
            } => {
                info!(
                    "Finished all extractions ({} archives, {} extracted, {} skipped, {} failed) in {:.3} seconds.",
                    archives,
                    extracted,
                    skipped,
                    failed,
                    duration.as_secs_f64()
                );
            }
        }
    }
}

fn archive_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
