//! # dirgrowth
//!
//! Compare two disk-usage reports and print the directories that grew.
//!
//! Both arguments are size reports as written by `dirgrowth-scan` (or any
//! tool emitting `<path> <size>` records, one per line). For every
//! directory in the new report whose size exceeds its old size — with a
//! missing old entry counting as zero — one line is printed:
//!
//! ```text
//! <directory> <growth, 2 significant digits>
//! ```
//!
//! Directories that shrank, stayed the same, or disappeared produce no
//! output. Lines keep the new report's record order.

mod cli;

use std::process::exit;

use anyhow::Result;
use clap::Parser;
use clap::error::ErrorKind;
use dirgrowth::{SizeReport, growth_entries};

use cli::{Cli, USAGE};

/// Entry point for the dirgrowth application.
///
/// Argument errors print the fixed usage message and exit with status 1;
/// help and version requests pass through to clap. All later errors are
/// printed to stderr by delegating to [`inner_main`].
fn main() {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(_) => {
            eprintln!("{USAGE}");
            exit(1);
        }
    };

    if let Err(err) = inner_main(&args) {
        eprintln!("Error: {err:#}");

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// Reads both reports to completion — each file is opened, consumed, and
/// closed in turn — and only then streams the growth entries to stdout, so
/// a parse failure in either report never produces partial output.
///
/// # Errors
///
/// Returns errors from opening, reading, or parsing either report file.
fn inner_main(args: &Cli) -> Result<()> {
    let older = SizeReport::from_path(&args.old)?;
    let newer = SizeReport::from_path(&args.new)?;

    for entry in growth_entries(&older, &newer) {
        println!("{entry}");
    }

    Ok(())
}
