//! Growth computation between two size reports.

use std::fmt;

use crate::report::SizeReport;
use crate::utils::format_sig;

/// One directory that grew, borrowed from the newer report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthEntry<'a> {
    /// Directory path as recorded in the newer report.
    pub dir: &'a str,

    /// Size increase since the older report; always strictly positive.
    pub growth: f64,
}

impl fmt::Display for GrowthEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.dir, format_sig(self.growth, 2))
    }
}

/// Lazily compare two reports, yielding every directory that grew.
///
/// Entries come out in the newer report's record order, one candidate per
/// directory it contains. A directory missing from the older report counts
/// as having had size zero, so new directories show their full size as
/// growth. Directories that shrank or stayed the same are skipped, and
/// directories only present in the older report are never visited at all.
pub fn growth_entries<'a>(
    older: &'a SizeReport,
    newer: &'a SizeReport,
) -> impl Iterator<Item = GrowthEntry<'a>> {
    newer.iter().filter_map(move |(dir, size)| {
        let growth = size - older.size_or_zero(dir);

        (growth > 0.0).then_some(GrowthEntry { dir, growth })
    })
}
