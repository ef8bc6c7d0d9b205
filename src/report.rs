//! Parsing size reports into an in-memory mapping.
//!
//! A report is a plain-text file with one record per line. Fields are
//! separated by arbitrary whitespace; the last field is a floating-point
//! size and every preceding field belongs to the directory path. Paths with
//! embedded spaces therefore round-trip, with the caveat that any run of
//! whitespace between path components collapses to a single space. That is
//! a lossy property of the format itself, not something this parser tries
//! to repair.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;

/// An in-memory size report: directory path mapped to its measured size.
///
/// Entries keep the insertion order of the underlying report, so iterating
/// a `SizeReport` replays the file's record order. Records for a path seen
/// twice keep the first record's position with the last record's size.
#[derive(Clone, Debug, Default)]
pub struct SizeReport {
    entries: IndexMap<String, f64>,
}

impl SizeReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and parse the report file at `path`.
    ///
    /// The file is opened, consumed to completion, and closed before this
    /// function returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read, or if any
    /// line fails to parse; the error chain names the offending file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open report {}", path.display()))?;

        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse report {}", path.display()))
    }

    /// Parse a report from any buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error on the first unreadable or unparseable line; the
    /// error chain carries the 1-based line number.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut report = Self::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read line {}", index + 1))?;
            let (dir, size) =
                parse_record(&line).with_context(|| format!("invalid record on line {}", index + 1))?;

            report.insert(dir, size);
        }

        Ok(report)
    }

    /// Insert or overwrite an entry.
    pub fn insert(&mut self, dir: String, size: f64) {
        self.entries.insert(dir, size);
    }

    /// Look up the size recorded for `dir`.
    #[must_use]
    pub fn get(&self, dir: &str) -> Option<f64> {
        self.entries.get(dir).copied()
    }

    /// Look up the size recorded for `dir`, treating a missing entry as zero.
    #[must_use]
    pub fn size_or_zero(&self, dir: &str) -> f64 {
        self.get(dir).unwrap_or(0.0)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(dir, size)| (dir.as_str(), *size))
    }

    /// Number of entries in the report.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split one report line into its directory key and size.
///
/// The last whitespace-separated token is parsed as the size; the remaining
/// tokens, rejoined with single spaces, form the key. A single-token line
/// yields the empty key. A blank line is an error.
fn parse_record(line: &str) -> Result<(String, f64)> {
    let mut fields: Vec<&str> = line.split_whitespace().collect();

    let Some(size_field) = fields.pop() else {
        bail!("blank record");
    };

    let size: f64 = size_field
        .parse()
        .with_context(|| format!("size field {size_field:?} is not a number"))?;

    Ok((fields.join(" "), size))
}
