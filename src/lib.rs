//! # dirgrowth
//!
//! Compare two disk-usage snapshots and report the directories that grew.
//!
//! A snapshot is a plain-text report with one record per line: a directory
//! path followed by its size, separated by whitespace. The `dirgrowth`
//! binary reads an old and a new report and prints, for every directory in
//! the new report, how much it grew since the old one. The companion
//! `dirgrowth-scan` binary produces such reports by measuring a directory
//! tree on disk.
//!
//! ## Components
//!
//! - [`report`] - parsing reports into an in-memory [`SizeReport`] mapping
//! - [`growth`] - computing strictly-positive growth between two reports
//! - [`scanner`] - measuring a directory tree and writing a report
//! - [`utils`] - numeric formatting shared by the above
//!
//! ## Usage
//!
//! ```bash
//! # Snapshot a file system twice, some days apart
//! dirgrowth-scan / > monday.report
//! dirgrowth-scan / > friday.report
//!
//! # Which directories got bigger?
//! dirgrowth monday.report friday.report
//! ```

pub mod growth;
pub mod report;
pub mod scanner;
pub mod utils;

pub use growth::{GrowthEntry, growth_entries};
pub use report::SizeReport;
pub use scanner::{ScanOptions, Scanner, SizeNode};
