//! Command-line interface definition and argument parsing.
//!
//! The comparison tool takes exactly two positional arguments, the old and
//! the new report. Anything else is a usage error; `main` maps every
//! argument failure other than help/version onto the fixed usage message.

use std::path::PathBuf;

use clap::Parser;

/// Usage message printed on any argument-count mistake.
pub const USAGE: &str = "expected two file arguments: old new";

/// Command-line arguments for the report comparison tool.
#[derive(Debug, Parser)]
#[command(name = "dirgrowth")]
#[command(about = "Report the directories that grew between two disk-usage snapshots")]
#[command(version)]
pub struct Cli {
    /// Size report from the earlier snapshot
    pub old: PathBuf,

    /// Size report from the later snapshot
    pub new: PathBuf,
}
