//! Command-line interface for parallel archive extraction.
//!
//! Scans a folder tree for ZIP archives and extracts each one next to
//! itself, several archives at a time.

mod output;

use clap::{Parser, ValueEnum};
use punzip::{discover, dispatch, plan, ConfigError, FsScanner, OverwriteMode, ScanFilter};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

const EXIT_OK: i32 = 0;
const EXIT_ARCHIVE_FAILED: i32 = 1;
const EXIT_CONFIG: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

#[derive(Parser)]
#[command(name = "punzip")]
#[command(version, about = "Extract multiple zip files in a folder tree", long_about = None)]
struct Cli {
    /// Root folder
    #[arg(value_name = "FOLDER")]
    root: PathBuf,

    /// Number of concurrent jobs (default: half the CPUs, at most one per archive)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// List all archives found in the folder tree and exit
    #[arg(short, long)]
    list: bool,

    /// Logging level used
    #[arg(short = 'L', long, value_enum, default_value_t = LogLevel::Info)]
    logging: LogLevel,

    /// Overwrite existing files
    #[arg(short, long)]
    overwrite: bool,

    /// Regex pattern for matching particular archive names
    #[arg(short, long)]
    pattern: Option<String>,

    /// Archive file extension to look for
    #[arg(short, long, default_value = "zip")]
    extension: String,

    /// Print the final report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write failed entries and unopenable archives to this file
    #[arg(long, value_name = "FILE")]
    failures_out: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.logging.as_filter())),
        )
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is::<ConfigError>() {
                EXIT_CONFIG
            } else {
                EXIT_ARCHIVE_FAILED
            }
        }
    };

    process::exit(code);
}

fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let filter = ScanFilter::new(cli.pattern.as_deref(), Some(&cli.extension))?;
    if let Some(pattern) = &cli.pattern {
        info!("Using file matching pattern: '{}'", pattern);
    }
    let scanner = FsScanner::new(filter);

    if cli.list {
        let archives = discover(&scanner, &cli.root)?;
        output::print_listing(&archives, cli.json)?;
        return Ok(EXIT_OK);
    }

    let plan = plan(&scanner, &cli.root, cli.jobs, OverwriteMode::from(cli.overwrite))?;

    let cancel_flag = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel_flag.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    }) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let show_progress = !cli.no_progress && !cli.json;
    let reporter = output::BarReporter::new(plan.archives.len() as u64, show_progress);
    let report = dispatch(&plan, &reporter, &cancel_flag);
    reporter.finish();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_summary(&report);
    }

    // The batch already ran; a bad failures path must not hide its results
    if let Some(path) = &cli.failures_out {
        if let Err(e) = output::write_failures(path, &report) {
            warn!("Could not write failures file {}: {}", path.display(), e);
        }
    }

    let code = if report.cancelled {
        EXIT_CANCELLED
    } else if !report.open_failures.is_empty() {
        EXIT_ARCHIVE_FAILED
    } else {
        EXIT_OK
    };
    Ok(code)
}
