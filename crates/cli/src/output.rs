//! Terminal output: progress bar, listing and summary tables, failure file.

use indicatif::{ProgressBar, ProgressStyle};
use punzip::{probe, BatchReport, JobEvent, Reporter, TracingReporter};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};

const PB_STYLE: &str =
    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} archives {wide_msg}";

/// Logs every event through `tracing` and advances a bar per finished archive.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new(archives: u64, visible: bool) -> Self {
        let bar = if visible {
            let bar = ProgressBar::new(archives);
            match ProgressStyle::with_template(PB_STYLE) {
                Ok(style) => bar.with_style(style),
                Err(_) => bar,
            }
        } else {
            ProgressBar::hidden()
        };

        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Reporter for BarReporter {
    fn report(&self, event: JobEvent) {
        let archive_done = matches!(
            event,
            JobEvent::ArchiveFinished(_) | JobEvent::ArchiveFailed(_)
        );
        if let JobEvent::ArchiveStarted { archive, .. } = &event {
            self.bar.set_message(display_name(archive));
        }

        // Keep log lines above the bar
        self.bar.suspend(|| TracingReporter.report(event));

        if archive_done {
            self.bar.inc(1);
        }
    }
}

#[derive(Tabled, Serialize)]
struct ListingRow {
    #[tabled(rename = "Archive")]
    archive: String,
    #[tabled(rename = "Entries")]
    entries: String,
    #[tabled(rename = "Uncompressed bytes")]
    uncompressed_bytes: String,
}

/// Print discovered archives with their entry counts.
pub fn print_listing(archives: &[PathBuf], json: bool) -> Result<(), serde_json::Error> {
    let rows: Vec<ListingRow> = archives
        .iter()
        .map(|path| match probe(path) {
            Ok(info) => ListingRow {
                archive: path.display().to_string(),
                entries: info.entries.to_string(),
                uncompressed_bytes: info.uncompressed_bytes.to_string(),
            },
            Err(e) => ListingRow {
                archive: path.display().to_string(),
                entries: "-".to_string(),
                uncompressed_bytes: format!("unreadable: {}", e),
            },
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("{} files found in the folder tree:", rows.len());
        if !rows.is_empty() {
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }
    Ok(())
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "")]
    metric: &'static str,
    #[tabled(rename = "Count")]
    value: String,
}

/// Print the human-readable end-of-run table.
pub fn print_summary(report: &BatchReport) {
    let rows = vec![
        SummaryRow {
            metric: "Archives processed",
            value: report.archives_processed().to_string(),
        },
        SummaryRow {
            metric: "Archives failed to open",
            value: report.open_failures.len().to_string(),
        },
        SummaryRow {
            metric: "Files extracted",
            value: report.extracted().to_string(),
        },
        SummaryRow {
            metric: "Files skipped",
            value: report.skipped().to_string(),
        },
        SummaryRow {
            metric: "Files failed",
            value: report.failed().to_string(),
        },
        SummaryRow {
            metric: "Bytes written",
            value: report.bytes_written().to_string(),
        },
        SummaryRow {
            metric: "Elapsed seconds",
            value: format!("{:.3}", report.duration.as_secs_f64()),
        },
    ];

    println!("{}", Table::new(rows).with(Style::rounded()));
    if report.cancelled {
        println!("Interrupted: not every archive was processed.");
    }
}

/// Persist one tab-separated line per failure: `archive<TAB>entry<TAB>error`.
/// Archives that failed to open use `-` as the entry.
pub fn write_failures(path: &Path, report: &BatchReport) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);

    for failure in &report.open_failures {
        writeln!(
            out,
            "{}\t-\t{}",
            failure.archive_path.display(),
            failure.error
        )?;
    }
    for summary in &report.summaries {
        for failure in &summary.failures {
            writeln!(
                out,
                "{}\t{}\t{}",
                summary.archive_path.display(),
                failure.entry,
                failure.error
            )?;
        }
    }

    out.flush()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
