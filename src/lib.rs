//! rtscan: find DICOM RTSTRUCT files across large directory trees and load
//! their contours.
//!
//! Discovery runs one lazy walk per root on a bounded worker pool, keeping
//! only files whose Modality reads as RTSTRUCT. Accepted files can then be
//! loaded into an in-memory model: one [`model::Roi`] per structure, each
//! holding its per-slice contour points.
//!
//! # Modules
//!
//! - [`dicom`]: Tag constants, partial reads and typed accessors
//! - [`discovery`]: Lazy single-root file discovery
//! - [`scan`]: Parallel multi-root discovery with progress reporting
//! - [`model`]: Structure sets, ROIs and contour extraction
//! - [`batch`]: Building structure sets from many paths
//! - [`logging`]: Subscriber setup for the binary
//! - [`error`]: Error types for rtscan operations

pub mod batch;
pub mod dicom;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod model;
pub mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

pub use error::RtscanError;
pub use model::{Roi, RoiSet, StructureSet};

use batch::{BatchOptions, BatchPolicy, BatchReport};
use logging::Verbosity;
use scan::{IndicatifObserver, ScanOptions};

/// The rtscan CLI application.
#[derive(Parser)]
#[command(name = "rtscan")]
#[command(version, author, about)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Logging level.
    #[arg(
        short = 'v',
        long,
        global = true,
        value_enum,
        ignore_case = true,
        env = "LOG_LEVEL",
        default_value = "INFO"
    )]
    verbosity: Verbosity,

    #[command(flatten)]
    find: FindArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scan directories, then load every RTSTRUCT found.
    Load(LoadArgs),
    /// Print the Modality of a single DICOM file.
    Modality(FileArgs),
    /// Print the series UIDs a DICOM file references.
    Refs(FileArgs),
}

/// Arguments for the default scan.
#[derive(clap::Args)]
struct FindArgs {
    /// Directories to search for RTSTRUCT files.
    roots: Vec<PathBuf>,

    /// Number of worker threads.
    #[arg(short = 'n', long = "n_proc", default_value_t = scan::DEFAULT_WORKERS)]
    n_proc: usize,
}

/// Arguments for the load subcommand.
#[derive(clap::Args)]
struct LoadArgs {
    #[command(flatten)]
    find: FindArgs,

    /// Keep going after a file fails to load.
    #[arg(long)]
    keep_going: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for single-file subcommands.
#[derive(clap::Args)]
struct FileArgs {
    /// DICOM file to read.
    file: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Run the rtscan CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), RtscanError> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbosity);

    match cli.command {
        Some(Commands::Load(args)) => run_load(args),
        Some(Commands::Modality(args)) => run_modality(args),
        Some(Commands::Refs(args)) => run_refs(args),
        None => run_find(cli.find),
    }
}

/// Execute the default scan.
fn run_find(args: FindArgs) -> Result<(), RtscanError> {
    let Some(outcome) = scan_for_rtstructs(&args)? else {
        return Ok(());
    };

    println!("Found {} RTSTRUCT file(s).", outcome.paths.len());
    println!("\nTime taken: {:.2} seconds", outcome.elapsed.as_secs_f64());
    Ok(())
}

/// Execute the load subcommand.
fn run_load(args: LoadArgs) -> Result<(), RtscanError> {
    let Some(scanned) = scan_for_rtstructs(&args.find)? else {
        return Ok(());
    };

    let options = BatchOptions {
        policy: if args.keep_going {
            BatchPolicy::Continue
        } else {
            BatchPolicy::Abort
        },
        ..Default::default()
    };

    let pb = ProgressBar::new(scanned.paths.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} structure sets",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    let loaded = batch::load_structure_sets(&scanned.paths, &options, Some(&pb));
    pb.finish_and_clear();

    let report = BatchReport::new(&scanned, &loaded?);
    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{report}"),
    }
    Ok(())
}

/// Execute the modality subcommand.
fn run_modality(args: FileArgs) -> Result<(), RtscanError> {
    let modality = dicom::read_modality(&args.file)?;
    println!("Modality: {modality}");
    Ok(())
}

/// Execute the refs subcommand.
fn run_refs(args: FileArgs) -> Result<(), RtscanError> {
    let uids = dicom::read_referenced_series_uids(&args.file)?;
    println!("{}", uids.join(","));
    Ok(())
}

/// Scans the roots in `args`, or logs and returns `None` when there are none.
fn scan_for_rtstructs(args: &FindArgs) -> Result<Option<scan::ScanOutcome>, RtscanError> {
    if args.roots.is_empty() {
        tracing::error!("No DICOM directories provided.");
        return Ok(None);
    }
    tracing::info!("Processing {} DICOM directories...", args.roots.len());

    let options = ScanOptions {
        workers: args.n_proc,
        ..Default::default()
    };
    let mut observer = IndicatifObserver::new();
    scan::scan_roots(&args.roots, &options, &mut observer).map(Some)
}
