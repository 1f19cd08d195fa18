//! Job Scheduler: discovers archives, sizes the worker pool and dispatches
//! one Archive Job per archive.
//!
//! Workers share nothing but the read-only plan, the cancel flag, a queue of
//! archive paths and a one-way event channel back to the calling thread.

use crate::error::ConfigError;
use crate::job::run_archive;
use crate::report::{ChannelReporter, JobEvent, Reporter};
use crate::scanner::Scanner;
use crate::types::{ArchiveFailure, BatchReport, JobPlan, OverwriteMode, PlanWarning};
use crossbeam_channel::{unbounded, Receiver};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

/// Number of logical CPUs available to this process, or 1 if unknown.
pub fn num_cpus() -> usize {
    match thread::available_parallelism() {
        Ok(n) => n.get(),
        Err(e) => {
            warn!("Could not determine CPU count ({}), defaulting to 1", e);
            1
        }
    }
}

/// Size the worker pool.
///
/// - No request: half the logical cores (rounded down, at least one), never
///   more than the number of archives.
/// - A request above `cpus` is kept but warned about.
/// - A request above `archives` is clamped to `archives` and warned about.
///
/// With no archives at all the pool has a single worker.
///
/// # Errors
///
/// [`ConfigError::InvalidJobCount`] when `requested` is zero.
pub fn compute_worker_count(
    requested: Option<usize>,
    archives: usize,
    cpus: usize,
) -> Result<(usize, Vec<PlanWarning>), ConfigError> {
    let limit = archives.max(1);

    let Some(requested) = requested else {
        let safe = (cpus / 2).max(1);
        return Ok((safe.min(limit), Vec::new()));
    };

    if requested == 0 {
        return Err(ConfigError::InvalidJobCount(requested));
    }

    let mut warnings = Vec::new();
    if requested > cpus {
        warnings.push(PlanWarning::Oversubscribed { requested, cpus });
    }
    if archives > 0 && requested > archives {
        warnings.push(PlanWarning::ClampedToArchives { requested, archives });
    }

    Ok((requested.min(limit), warnings))
}

/// Discover archives under `root` and compute the [`JobPlan`].
///
/// # Errors
///
/// Fails if `root` is missing or not a directory, or `requested_jobs` is zero.
pub fn plan(
    scanner: &dyn Scanner,
    root: &Path,
    requested_jobs: Option<usize>,
    overwrite: OverwriteMode,
) -> Result<JobPlan, ConfigError> {
    plan_with_cpus(scanner, root, requested_jobs, overwrite, num_cpus())
}

/// [`plan`] with an explicit CPU count.
pub fn plan_with_cpus(
    scanner: &dyn Scanner,
    root: &Path,
    requested_jobs: Option<usize>,
    overwrite: OverwriteMode,
    cpus: usize,
) -> Result<JobPlan, ConfigError> {
    // Validate before the potentially long walk
    if requested_jobs == Some(0) {
        return Err(ConfigError::InvalidJobCount(0));
    }

    let archives = discover(scanner, root)?;

    let (worker_count, warnings) = compute_worker_count(requested_jobs, archives.len(), cpus)?;
    for warning in &warnings {
        warn!("{}", warning);
    }
    if requested_jobs.is_none() {
        info!(
            "Number of jobs not defined for {} archives, assigning {} jobs.",
            archives.len(),
            worker_count
        );
    }

    Ok(JobPlan {
        archives,
        worker_count,
        overwrite,
        warnings,
    })
}

/// Check `root` and collect the archives under it.
///
/// # Errors
///
/// Fails if `root` is missing or not a directory.
pub fn discover(scanner: &dyn Scanner, root: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !root.exists() {
        return Err(ConfigError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ConfigError::NotADirectory(root.to_path_buf()));
    }

    info!("Scanning the folder tree, this could take a while...");
    let archives = scanner.scan(root);
    info!("{} archives found in the folder tree", archives.len());

    Ok(archives)
}

/// Run the plan on a pool of `plan.worker_count` threads.
///
/// Blocks until every archive has been processed (or the run is cancelled).
/// Worker events are forwarded to `reporter` on the calling thread in arrival
/// order, followed by a final [`JobEvent::BatchFinished`].
pub fn dispatch(plan: &JobPlan, reporter: &dyn Reporter, cancel_flag: &AtomicBool) -> BatchReport {
    let start_time = Instant::now();
    let mut report = BatchReport::default();

    let (work_tx, work_rx) = unbounded::<&Path>();
    for archive in &plan.archives {
        // Receiver is alive in this scope; send cannot fail
        let _ = work_tx.send(archive.as_path());
    }
    drop(work_tx);

    let (event_tx, event_rx) = unbounded::<JobEvent>();
    let workers = plan.worker_count.max(1).min(plan.archives.len());

    thread::scope(|s| {
        for _ in 0..workers {
            let queue = work_rx.clone();
            let events = ChannelReporter::new(event_tx.clone());
            let overwrite = plan.overwrite;
            s.spawn(move || worker_loop(queue, &events, overwrite, cancel_flag));
        }
        // Only workers hold senders now; the loop ends when the last one exits
        drop(event_tx);

        for event in event_rx {
            match &event {
                JobEvent::ArchiveFinished(summary) => report.summaries.push(summary.clone()),
                JobEvent::ArchiveFailed(failure) => report.open_failures.push(failure.clone()),
                _ => {}
            }
            reporter.report(event);
        }
    });

    report.cancelled = cancel_flag.load(Ordering::Relaxed)
        || report.summaries.iter().any(|s| s.cancelled);
    report.duration = start_time.elapsed();

    reporter.report(JobEvent::BatchFinished {
        archives: report.archives_processed(),
        extracted: report.extracted(),
        skipped: report.skipped(),
        failed: report.failed(),
        duration: report.duration,
    });

    report
}

/// Take archives off the shared queue until it is empty or the run is cancelled.
fn worker_loop(
    queue: Receiver<&Path>,
    reporter: &ChannelReporter,
    overwrite: OverwriteMode,
    cancel_flag: &AtomicBool,
) {
    while !cancel_flag.load(Ordering::Relaxed) {
        let Ok(archive) = queue.recv() else {
            break;
        };

        if let Err(e) = run_archive(archive, overwrite, reporter, cancel_flag) {
            reporter.report(JobEvent::ArchiveFailed(ArchiveFailure {
                archive_path: archive.to_path_buf(),
                error: e.to_string(),
            }));
        }
    }
}
