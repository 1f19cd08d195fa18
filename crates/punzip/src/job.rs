//! Archive Job: runs one archive end to end.
//!
//! `Opened -> Enumerating -> PerEntry -> Summarized`. Entries are processed
//! in central-directory order, each resolved independently. A failed entry is
//! final for that entry; nothing is retried.

use crate::error::{EntryError, ExtractError};
use crate::extract::extract_entry;
use crate::probe::open_archive;
use crate::report::{JobEvent, Reporter};
use crate::resolve::{resolve, ArchiveRoot, ResolvedDestination};
use crate::safety::validate_entry_name;
use crate::types::{ArchiveSummary, EntryFailure, ExtractionOutcome, OverwriteMode};
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use zip::ZipArchive;

/// Extract every entry of one archive next to the archive itself.
///
/// Events go to `reporter` as the job progresses, ending with
/// [`JobEvent::ArchiveFinished`]. `cancel_flag` is checked before each entry;
/// once set, the job stops and returns a summary marked cancelled.
///
/// # Errors
///
/// Only when the archive cannot be opened. Per-entry problems are counted in
/// the summary instead.
pub fn run_archive(
    archive_path: &Path,
    overwrite: OverwriteMode,
    reporter: &dyn Reporter,
    cancel_flag: &AtomicBool,
) -> Result<ArchiveSummary, ExtractError> {
    let start_time = Instant::now();

    let mut archive = open_archive(archive_path)?;

    let names: Vec<Result<String, zip::result::ZipError>> = (0..archive.len())
        .map(|i| archive.by_index_raw(i).map(|entry| entry.name().to_string()))
        .collect();

    let mut summary = ArchiveSummary::new(archive_path.to_path_buf(), names.len() as u64);
    reporter.report(JobEvent::ArchiveStarted {
        archive: archive_path.to_path_buf(),
        entries: summary.entries_total,
    });

    let root = ArchiveRoot::for_archive(archive_path);
    let mut milestones = Milestones::new(summary.entries_total);

    for (index, name) in names.into_iter().enumerate() {
        if cancel_flag.load(Ordering::Relaxed) {
            summary.cancelled = true;
            break;
        }

        let (entry, result) = match name {
            Ok(name) => {
                let result = process_entry(&mut archive, index, &name, &root, overwrite);
                (name, result)
            }
            Err(e) => (format!("#{}", index), Err(EntryError::from(e))),
        };

        match result {
            Ok((destination, ExtractionOutcome::Extracted { bytes_written })) => {
                summary.extracted += 1;
                summary.bytes_written += bytes_written;
                let event = match destination.file_path() {
                    Some(target) => JobEvent::EntryExtracted {
                        archive: archive_path.to_path_buf(),
                        target,
                        bytes: bytes_written,
                    },
                    None => JobEvent::DirectoryCreated {
                        archive: archive_path.to_path_buf(),
                        directory: destination.directory,
                    },
                };
                reporter.report(event);
            }
            Ok((_, ExtractionOutcome::Skipped(reason))) => {
                summary.skipped += 1;
                reporter.report(JobEvent::EntrySkipped {
                    archive: archive_path.to_path_buf(),
                    entry,
                    reason,
                });
            }
            Ok((_, ExtractionOutcome::Failed(error))) | Err(error) => {
                summary.failed += 1;
                let error = error.to_string();
                reporter.report(JobEvent::EntryFailed {
                    archive: archive_path.to_path_buf(),
                    entry: entry.clone(),
                    error: error.clone(),
                });
                summary.failures.push(EntryFailure { entry, error });
            }
        }

        if milestones.reached(summary.processed()) {
            reporter.report(JobEvent::Milestone {
                archive: archive_path.to_path_buf(),
                processed: summary.processed(),
                total: summary.entries_total,
            });
        }
    }

    summary.duration = start_time.elapsed();
    reporter.report(JobEvent::ArchiveFinished(summary.clone()));

    Ok(summary)
}

/// Check, resolve and extract one entry.
fn process_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    name: &str,
    root: &ArchiveRoot,
    overwrite: OverwriteMode,
) -> Result<(ResolvedDestination, ExtractionOutcome), EntryError> {
    validate_entry_name(name)?;
    let destination = resolve(name, root)?;
    let outcome = extract_entry(archive, index, &destination, overwrite);
    Ok((destination, outcome))
}

/// Fires roughly every tenth of the entries, and always on the last one.
#[derive(Debug)]
pub(crate) struct Milestones {
    total: u64,
    increment: u64,
    next: u64,
}

impl Milestones {
    pub(crate) fn new(total: u64) -> Self {
        let increment = (total / 10).max(1);
        Self {
            total,
            increment,
            next: increment,
        }
    }

    /// Whether `processed` crosses the next milestone.
    pub(crate) fn reached(&mut self, processed: u64) -> bool {
        if processed < self.next && processed != self.total {
            return false;
        }
        while self.next <= processed {
            self.next += self.increment;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired(total: u64) -> Vec<u64> {
        let mut m = Milestones::new(total);
        (1..=total).filter(|&p| m.reached(p)).collect()
    }

    #[test]
    fn test_milestones_small_archive_fires_every_entry() {
        assert_eq!(fired(1), vec![1]);
        assert_eq!(fired(3), vec![1, 2, 3]);
    }

    #[test]
    fn test_milestones_every_tenth() {
        assert_eq!(fired(100), vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    }

    #[test]
    fn test_milestones_uneven_total_ends_on_last() {
        let f = fired(25);
        assert_eq!(f.first(), Some(&2));
        assert_eq!(f.last(), Some(&25));
        assert_eq!(f.len(), 13);
    }

    #[test]
    fn test_milestones_empty_archive() {
        assert!(fired(0).is_empty());
    }
}
