//! # dirgrowth-scan
//!
//! Measure a directory tree and write a size report to stdout.
//!
//! The report lists every directory at or above the minimum reportable
//! size, one `<path> <GiB>` record per line, largest children first.
//! Feeding two such reports taken at different times to `dirgrowth` shows
//! which directories grew in between.
//!
//! The scan stays on the root's file system and never follows symlinks, so
//! `dirgrowth-scan /` measures the root file system rather than everything
//! mounted under it.

use std::io;
use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use dirgrowth::scanner::{GIB, ScanOptions, Scanner};
use humansize::{BINARY, format_size};

/// Command-line arguments for the report producer.
#[derive(Debug, Parser)]
#[command(name = "dirgrowth-scan")]
#[command(about = "Measure a directory tree and write a disk-usage report")]
#[command(version)]
struct Cli {
    /// Directory to measure
    dir: PathBuf,

    /// The number of threads to use for scanning
    ///
    /// A value of 0 uses the default number of threads (typically the
    /// number of CPU cores). A single thread is usually the better choice
    /// on magnetic disks.
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Minimum reportable size in whole GiB
    ///
    /// Directories smaller than this are left out of the report (their
    /// sizes still count into their parents).
    #[arg(short = 's', long, default_value_t = 1)]
    size: u64,

    /// Full display of repetitive directory chains
    ///
    /// By default a chain of directories that each contain only one
    /// reportable subdirectory is collapsed to its last member.
    #[arg(long)]
    no_elision: bool,

    /// Show access errors that occur while scanning
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress the progress spinner
    #[arg(short = 'q', long)]
    quiet: bool,
}

/// Entry point for the dirgrowth-scan application.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("Error: {err:#}");

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// # Errors
///
/// Returns errors from thread-pool configuration, from stat-ing the scan
/// root, or from writing the report to stdout.
fn inner_main() -> Result<()> {
    let args = Cli::parse();

    let options = ScanOptions {
        verbose: args.verbose,
        threads: args.threads,
    };

    if options.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build_global()?;
    }

    let scanner = Scanner::new(options).with_quiet(args.quiet);
    let mut root = scanner.scan(&args.dir)?;

    if args.verbose {
        eprintln!(
            "{} {}",
            "Total usage:".bold(),
            format_size(root.size, BINARY)
        );
    }

    let stdout = io::stdout();
    root.write_report(&mut stdout.lock(), args.size * GIB, !args.no_elision)?;

    Ok(())
}
