//! # punzip
//!
//! Parallel batch extraction of ZIP archives found in a directory tree.
//!
//! Each archive is extracted next to itself. Entry names are normalized by
//! the duplicated-root heuristic in [`resolve`], so archives that store
//! their top folder once, twice, or not at all end up with the same layout.
//!
//! ## Pipeline
//!
//! - [`scanner`] walks the tree and keeps matching archive names
//! - [`scheduler::plan`] sizes the worker pool
//! - [`scheduler::dispatch`] runs one [`job::run_archive`] per archive on a
//!   fixed pool of threads
//! - each job resolves ([`resolve`]) and extracts ([`extract`]) every entry,
//!   recording failures per entry instead of aborting
//!
//! ## Example
//!
//! ```rust,no_run
//! use punzip::{dispatch, plan, FsScanner, OverwriteMode, ScanFilter, TracingReporter};
//! use std::path::Path;
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = FsScanner::new(ScanFilter::new(None, Some("zip"))?);
//! let plan = plan(&scanner, Path::new("data"), None, OverwriteMode::Skip)?;
//!
//! let cancel_flag = AtomicBool::new(false);
//! let report = dispatch(&plan, &TracingReporter, &cancel_flag);
//!
//! println!(
//!     "Extracted {}, skipped {}, failed {}",
//!     report.extracted(),
//!     report.skipped(),
//!     report.failed()
//! );
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extract;
pub mod job;
pub mod probe;
pub mod report;
pub mod resolve;
pub mod safety;
pub mod scanner;
pub mod scheduler;
pub mod types;

// Re-export main types
pub use error::{ConfigError, EntryError, ExtractError, ResolveError, SecurityError};
pub use job::run_archive;
pub use report::{ChannelReporter, JobEvent, Reporter, TracingReporter};
pub use resolve::{resolve, ArchiveRoot, ResolvedDestination};
pub use scanner::{FsScanner, ScanFilter, Scanner};
pub use scheduler::{compute_worker_count, discover, dispatch, plan};
pub use types::{
    ArchiveEntry, ArchiveFailure, ArchiveInfo, ArchiveSummary, BatchReport, EntryFailure,
    ExtractionOutcome, JobPlan, OverwriteMode, PlanWarning, SkipReason,
};

use std::path::Path;

/// Probe an archive to retrieve metadata without extracting.
///
/// # Errors
///
/// Returns an error if the archive is missing, unreadable, or not a ZIP file.
pub fn probe(path: &Path) -> Result<ArchiveInfo, ExtractError> {
    probe::probe_archive(path)
}
