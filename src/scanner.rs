//! Disk-usage measurement and report production.
//!
//! This module measures how much disk space every directory of a tree
//! occupies and writes the result as a size report, one `<path> <GiB>`
//! record per line, the same format the report parser consumes.
//!
//! The traversal deliberately stays on one file system: every directory's
//! device number is compared against the scan root's, so mount points
//! contribute nothing. Symlinks are never followed. Sizes are allocated
//! disk usage (512-byte blocks) on Unix and logical file length elsewhere.

use std::fs::{self, Metadata};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

/// Bytes per GiB; report sizes are written in these units.
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Subtrees at or below this size are folded into their parent's total
/// without keeping a node of their own.
const RETENTION_FLOOR: u64 = GIB;

/// Configuration for directory scanning behavior.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    /// Whether to print collected access errors after the scan
    pub verbose: bool,

    /// Number of threads to use for scanning (0 = default)
    pub threads: usize,
}

/// Disk-usage scanner producing a per-directory rollup tree.
#[derive(Debug)]
pub struct Scanner {
    /// Configuration options for scanning behavior
    options: ScanOptions,

    /// When `true`, suppresses progress spinner output.
    quiet: bool,
}

/// One measured directory: its path, cumulative size in bytes, and the
/// child subtrees large enough to be worth keeping.
#[derive(Clone, Debug)]
pub struct SizeNode {
    /// Directory path, `/`-joined from the scan root argument.
    pub path: String,

    /// Cumulative size of the directory and everything below it, in bytes.
    pub size: u64,

    /// Children above the retention floor, unordered until written.
    pub children: Vec<SizeNode>,
}

impl Scanner {
    /// Create a new scanner with the specified options.
    #[must_use]
    pub const fn new(options: ScanOptions) -> Self {
        Self {
            options,
            quiet: false,
        }
    }

    /// Enable or disable quiet mode (suppresses the progress spinner).
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Measure the tree rooted at `root`.
    ///
    /// Regular files directly under `root` count into the root's size;
    /// every first-level subdirectory is measured as its own subtree, in
    /// parallel across the rayon pool, and rolled up into the returned
    /// root node.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` itself cannot be stat-ed. Failures below
    /// the root are skipped; with `verbose` set they are collected and
    /// printed to stderr after the scan.
    ///
    /// # Panics
    ///
    /// May panic if the progress bar template string is invalid, which
    /// cannot happen with the hardcoded template used here.
    pub fn scan(&self, root: &Path) -> Result<SizeNode> {
        let device = device_number(root)
            .with_context(|| format!("failed to stat {}", root.display()))?;

        let errors = Arc::new(Mutex::new(Vec::<String>::new()));
        let root_path = root.display().to_string();
        let mut result = SizeNode::new(root_path.clone());

        let mut branches = Vec::new();
        for entry in directory_entries(root, device, &errors) {
            if entry.metadata.is_dir() {
                branches.push(child_path(&root_path, &entry.name));
            } else {
                result.size += file_disk_usage(&entry.metadata);
            }
        }

        let progress = if self.quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg}")
                    .unwrap(),
            );
            pb.set_message("Scanning...");
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        };

        let total = branches.len();
        let completed = Arc::new(AtomicUsize::new(0));
        let progress_clone = progress.clone();
        let completed_clone = Arc::clone(&completed);

        // Measure first-level subtrees in parallel
        let children: Vec<SizeNode> = branches
            .into_par_iter()
            .map(|path| {
                let child = measure_tree(&path, device, &errors);
                let n = completed_clone.fetch_add(1, Ordering::Relaxed) + 1;
                progress_clone.set_message(format!("Scanning... {n}/{total} branches"));
                child
            })
            .collect();

        progress.finish_and_clear();

        for child in children {
            result.append_child(child);
        }

        if self.options.verbose {
            let errors = errors.lock().unwrap();
            for error in errors.iter() {
                eprintln!("{}", error.red());
            }
        }

        Ok(result)
    }
}

impl SizeNode {
    /// Create an empty node for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: 0,
            children: Vec::new(),
        }
    }

    /// Fold a measured child subtree into this node.
    ///
    /// The child's size always accumulates into this node's total; the
    /// child node itself is kept only if it exceeds the retention floor.
    pub fn append_child(&mut self, child: Self) {
        self.size += child.size;

        if child.size > RETENTION_FLOOR {
            self.children.push(child);
        }
    }

    /// Write this tree as a size report.
    ///
    /// Children are ordered largest-first. Nodes smaller than `min_size`
    /// bytes are omitted along with their subtrees. With `collapse` set,
    /// chains of single reportable children are elided so that only the
    /// last directory of a repetitive path chain is printed.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn write_report<W: Write>(
        &mut self,
        out: &mut W,
        min_size: u64,
        collapse: bool,
    ) -> io::Result<()> {
        self.children.sort_by(|a, b| b.size.cmp(&a.size));

        if self.size < min_size {
            return Ok(());
        }

        writeln!(out, "{} {:.1}", self.path, gib(self.size))?;

        if collapse && self.children.len() == 1 && self.children[0].size >= min_size {
            self.children[0].write_elided(out, min_size, collapse)
        } else {
            for child in &mut self.children {
                child.write_report(out, min_size, collapse)?;
            }
            Ok(())
        }
    }

    /// Skip down a single-child chain without printing the intermediate
    /// nodes, then resume normal report writing.
    fn write_elided<W: Write>(
        &mut self,
        out: &mut W,
        min_size: u64,
        collapse: bool,
    ) -> io::Result<()> {
        if self.children.len() == 1 && self.children[0].size >= min_size {
            self.children[0].write_elided(out, min_size, collapse)
        } else {
            self.write_report(out, min_size, collapse)
        }
    }
}

/// A directory entry that survived the symlink and file-type filters.
struct EntryInfo {
    name: String,
    metadata: Metadata,
}

/// List the regular files and directories inside `dir`.
///
/// Returns nothing if `dir` sits on a different device than the scan root,
/// which is what keeps the traversal from crossing file systems. Entries
/// that cannot be stat-ed are skipped; a directory that cannot be read at
/// all is recorded in `errors`.
fn directory_entries(dir: &Path, device: u64, errors: &Arc<Mutex<Vec<String>>>) -> Vec<EntryInfo> {
    match device_number(dir) {
        Some(d) if d == device => {}
        _ => return Vec::new(),
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            record_error(errors, format!("failed to read {}: {err}", dir.display()));
            return Vec::new();
        }
    };

    let mut result = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let Ok(metadata) = entry.path().symlink_metadata() else {
            continue;
        };

        if metadata.file_type().is_symlink() {
            continue;
        }

        if metadata.is_dir() || metadata.is_file() {
            result.push(EntryInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                metadata,
            });
        }
    }

    result
}

/// Recursively measure the subtree rooted at `path`.
fn measure_tree(path: &str, device: u64, errors: &Arc<Mutex<Vec<String>>>) -> SizeNode {
    let mut node = SizeNode::new(path);

    for entry in directory_entries(Path::new(path), device, errors) {
        if entry.metadata.is_dir() {
            node.append_child(measure_tree(&child_path(path, &entry.name), device, errors));
        } else {
            node.size += file_disk_usage(&entry.metadata);
        }
    }

    node
}

/// Join a child name onto a parent path with `/`, collapsing the doubled
/// slash that joining onto the root produces.
fn child_path(parent: &str, name: &str) -> String {
    format!("{parent}/{name}").replace("//", "/")
}

/// Size in GiB for report output.
#[allow(clippy::cast_precision_loss)]
fn gib(size: u64) -> f64 {
    size as f64 / GIB as f64
}

fn record_error(errors: &Mutex<Vec<String>>, message: String) {
    errors.lock().unwrap().push(message);
}

/// Device number of the file system holding `path`.
#[cfg(unix)]
fn device_number(path: &Path) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;

    fs::symlink_metadata(path).ok().map(|meta| meta.dev())
}

/// On platforms without device numbers every path counts as one device.
#[cfg(not(unix))]
fn device_number(path: &Path) -> Option<u64> {
    fs::symlink_metadata(path).ok().map(|_| 0)
}

/// Allocated disk usage of a regular file.
#[cfg(unix)]
fn file_disk_usage(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;

    metadata.blocks() * 512
}

#[cfg(not(unix))]
fn file_disk_usage(metadata: &Metadata) -> u64 {
    metadata.len()
}

#[cfg(test)]
mod tests {
    use std::fs as stdfs;

    use tempfile::TempDir;

    use super::*;

    fn node(path: &str, size_gib: u64) -> SizeNode {
        SizeNode {
            path: path.to_string(),
            size: size_gib * GIB,
            children: Vec::new(),
        }
    }

    fn render(root: &mut SizeNode, min_size: u64, collapse: bool) -> Vec<String> {
        let mut out = Vec::new();
        root.write_report(&mut out, min_size, collapse).unwrap();

        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    fn quiet_scanner() -> Scanner {
        Scanner::new(ScanOptions {
            verbose: false,
            threads: 0,
        })
        .with_quiet(true)
    }

    #[test]
    fn test_append_child_accumulates_size() {
        let mut parent = SizeNode::new("/data");
        parent.append_child(node("/data/a", 2));
        parent.append_child(node("/data/b", 3));

        assert_eq!(parent.size, 5 * GIB);
    }

    #[test]
    fn test_append_child_prunes_below_retention_floor() {
        let mut parent = SizeNode::new("/data");
        parent.append_child(node("/data/big", 2));

        // exactly one GiB is not *larger* than the floor
        let mut small = SizeNode::new("/data/small");
        small.size = GIB;
        parent.append_child(small);

        assert_eq!(parent.size, 3 * GIB);
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].path, "/data/big");
    }

    #[test]
    fn test_child_path_joins_with_slash() {
        assert_eq!(child_path("/usr", "lib"), "/usr/lib");
        assert_eq!(child_path("/", "usr"), "/usr");
    }

    #[test]
    fn test_report_sorts_children_descending() {
        let mut root = node("/", 10);
        root.children = vec![node("/a", 2), node("/b", 5), node("/c", 3)];

        let lines = render(&mut root, GIB, false);
        assert_eq!(lines, vec!["/ 10.0", "/b 5.0", "/c 3.0", "/a 2.0"]);
    }

    #[test]
    fn test_report_omits_nodes_below_minimum() {
        let mut root = node("/", 10);
        root.children = vec![node("/a", 2), node("/b", 5)];

        let lines = render(&mut root, 4 * GIB, false);
        assert_eq!(lines, vec!["/ 10.0", "/b 5.0"]);
    }

    #[test]
    fn test_report_elides_single_child_chains() {
        let mut tail = node("/a/b/c", 7);
        tail.children = vec![node("/a/b/c/d", 3), node("/a/b/c/e", 2)];

        let mut b = node("/a/b", 8);
        b.children = vec![tail];
        let mut a = node("/a", 9);
        a.children = vec![b];
        let mut root = node("/", 10);
        root.children = vec![a];

        let lines = render(&mut root.clone(), GIB, true);
        assert_eq!(
            lines,
            vec!["/ 10.0", "/a/b/c 7.0", "/a/b/c/d 3.0", "/a/b/c/e 2.0"]
        );

        let lines = render(&mut root, GIB, false);
        assert_eq!(
            lines,
            vec![
                "/ 10.0",
                "/a 9.0",
                "/a/b 8.0",
                "/a/b/c 7.0",
                "/a/b/c/d 3.0",
                "/a/b/c/e 2.0"
            ]
        );
    }

    #[test]
    fn test_elision_stops_at_unreportable_child() {
        // the chain ends at a child below the minimum, so the parent prints
        let mut a = node("/a", 9);
        a.children = vec![node("/a/b", 2)];
        let mut root = node("/", 10);
        root.children = vec![a];

        let lines = render(&mut root, 5 * GIB, true);
        assert_eq!(lines, vec!["/ 10.0", "/a 9.0"]);
    }

    #[test]
    fn test_fractional_gib_formatting() {
        let mut root = SizeNode::new("/");
        root.size = GIB / 2 * 3;

        let lines = render(&mut root, 0, false);
        assert_eq!(lines, vec!["/ 1.5"]);
    }

    #[test]
    fn test_scan_measures_real_directory() {
        let dir = TempDir::new().unwrap();
        stdfs::write(dir.path().join("a.bin"), vec![0u8; 4096]).unwrap();
        stdfs::create_dir(dir.path().join("sub")).unwrap();
        stdfs::write(dir.path().join("sub").join("b.bin"), vec![0u8; 8192]).unwrap();

        let root = quiet_scanner().scan(dir.path()).unwrap();

        assert_eq!(root.path, dir.path().display().to_string());
        assert!(root.size > 0);
        // nothing here is anywhere near the retention floor
        assert!(root.children.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_ignores_symlinks() {
        let dir = TempDir::new().unwrap();
        stdfs::write(dir.path().join("real.bin"), vec![0u8; 4096]).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.bin"), dir.path().join("link"))
            .unwrap();

        let with_link = quiet_scanner().scan(dir.path()).unwrap().size;

        stdfs::remove_file(dir.path().join("link")).unwrap();
        let without_link = quiet_scanner().scan(dir.path()).unwrap().size;

        assert_eq!(with_link, without_link);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        assert!(quiet_scanner().scan(&missing).is_err());
    }
}
