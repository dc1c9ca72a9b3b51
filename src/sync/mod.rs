//! Source-to-destination file mirroring
//!
//! Every managed file goes through [`sync_file`], which applies one decision
//! table:
//!
//! | destination           | `force` | action      | outcome                   |
//! |-----------------------|---------|-------------|---------------------------|
//! | absent                | any     | copy        | [`SyncOutcome::Copied`]   |
//! | byte-identical        | any     | nothing     | [`SyncOutcome::Identical`]|
//! | differs               | yes     | overwrite   | [`SyncOutcome::Copied`]   |
//! | differs               | no      | nothing     | [`SyncOutcome::Conflict`] |
//!
//! A conflict is how an operator's edit to a managed file survives a
//! re-install or update. It is reported with a warning, never as an error.
//!
//! [`sync_tree`] applies the table to a whole source directory, traversed
//! according to a [`SyncScope`]. Symlinks and special files in the source are
//! never followed or copied. Results come back as an immutable [`SyncReport`];
//! reports of several trees combine with [`SyncReport::combine`].

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::utils::fs::{ensure_dir, ensure_parent_dir};

/// How a source directory is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncScope {
    /// Regular files directly inside the source with the given extension
    Flat {
        /// File extension without the dot
        extension: &'static str,
    },
    /// Each direct subdirectory, copied recursively; top-level files ignored
    Subdirectories,
    /// Everything below the source
    Recursive,
}

/// Knobs for [`sync_file`] and [`sync_tree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Overwrite destinations that differ from the source
    pub force: bool,
}

/// Per-file result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncOutcome {
    /// Written (new file, or forced overwrite)
    Copied,
    /// Destination already matched the source
    Identical,
    /// Destination differs and was left alone
    Conflict,
}

/// One file considered by a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// File in the asset bundle
    pub source: PathBuf,
    /// File in the managed root
    pub destination: PathBuf,
    /// What happened
    pub outcome: SyncOutcome,
}

impl FileRecord {
    /// Whether the destination now matches the bundle.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Copied | SyncOutcome::Identical)
    }
}

/// Aggregate result of one or more syncs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    records: Vec<FileRecord>,
    warnings: Vec<String>,
}

impl SyncReport {
    /// Every file considered, in traversal order.
    #[must_use]
    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    /// Non-fatal problems (conflicts, missing source directories).
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Number of files written.
    #[must_use]
    pub fn copied(&self) -> usize {
        self.count(SyncOutcome::Copied)
    }

    /// Number of files already up to date.
    #[must_use]
    pub fn identical(&self) -> usize {
        self.count(SyncOutcome::Identical)
    }

    /// Number of files left alone because they differ.
    #[must_use]
    pub fn conflicts(&self) -> usize {
        self.count(SyncOutcome::Conflict)
    }

    fn count(&self, outcome: SyncOutcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Destinations that match the bundle (copied or identical).
    #[must_use]
    pub fn installed_paths(&self) -> Vec<PathBuf> {
        self.records.iter().filter(|r| r.is_installed()).map(|r| r.destination.clone()).collect()
    }

    /// Destinations left alone because of a conflict.
    #[must_use]
    pub fn conflict_paths(&self) -> Vec<PathBuf> {
        self.records
            .iter()
            .filter(|r| r.outcome == SyncOutcome::Conflict)
            .map(|r| r.destination.clone())
            .collect()
    }

    /// Concatenates two reports.
    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        self.records.extend(other.records);
        self.warnings.extend(other.warnings);
        self
    }

    fn with_record(mut self, record: FileRecord, warning: Option<String>) -> Self {
        self.records.push(record);
        self.warnings.extend(warning);
        self
    }

    fn with_warning(mut self, warning: String) -> Self {
        self.warnings.push(warning);
        self
    }
}

/// Compares two files byte for byte.
///
/// # Errors
///
/// Returns an error if either file cannot be read.
pub fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let len_a = fs::metadata(a).with_context(|| format!("Failed to stat {}", a.display()))?.len();
    let len_b = fs::metadata(b).with_context(|| format!("Failed to stat {}", b.display()))?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let content_a = fs::read(a).with_context(|| format!("Failed to read {}", a.display()))?;
    let content_b = fs::read(b).with_context(|| format!("Failed to read {}", b.display()))?;
    Ok(content_a == content_b)
}

fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    // fs::copy carries the permission bits over, so hook scripts stay executable
    fs::copy(source, destination).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), destination.display())
    })?;
    Ok(())
}

/// Applies the decision table to a single file.
///
/// Returns the record and, for a conflict, the warning to report.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or a file
/// cannot be read or copied.
pub fn sync_file(source: &Path, destination: &Path, policy: SyncPolicy) -> Result<(FileRecord, Option<String>)> {
    ensure_parent_dir(destination)?;

    let (outcome, warning) = if !destination.exists() {
        copy_file(source, destination)?;
        (SyncOutcome::Copied, None)
    } else if files_identical(source, destination)? {
        (SyncOutcome::Identical, None)
    } else if policy.force {
        copy_file(source, destination)?;
        (SyncOutcome::Copied, None)
    } else {
        let warning =
            format!("Conflict at {} (existing file differs, left unchanged)", destination.display());
        warn!("{}", warning);
        (SyncOutcome::Conflict, Some(warning))
    };

    debug!("{} -> {}: {:?}", source.display(), destination.display(), outcome);

    Ok((
        FileRecord {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            outcome,
        },
        warning,
    ))
}

/// Mirrors `source` into `destination` according to `scope`.
///
/// A missing source directory yields an empty report carrying a warning. The
/// destination directory is created even when there is nothing to copy.
///
/// # Errors
///
/// Returns an error on any I/O failure other than a missing source.
///
/// # Examples
///
/// ```rust,no_run
/// use kilntwo::sync::{SyncPolicy, SyncScope, sync_tree};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let report = sync_tree(
///     Path::new("assets/agents"),
///     Path::new("/home/op/.claude/agents"),
///     SyncScope::Flat { extension: "md" },
///     SyncPolicy::default(),
/// )?;
/// println!("{} copied, {} conflicts", report.copied(), report.conflicts());
/// # Ok(())
/// # }
/// ```
pub fn sync_tree(source: &Path, destination: &Path, scope: SyncScope, policy: SyncPolicy) -> Result<SyncReport> {
    if !source.is_dir() {
        let warning = format!("Missing source directory: {}", source.display());
        warn!("{}", warning);
        return Ok(SyncReport::default().with_warning(warning));
    }

    ensure_dir(destination)?;

    match scope {
        SyncScope::Flat {
            extension,
        } => {
            let mut report = SyncReport::default();
            for entry in top_level_entries(source)? {
                let path = entry.path();
                if entry.file_type().is_file() && path.extension().is_some_and(|e| e == extension) {
                    let (record, warning) = sync_file(path, &destination.join(entry.file_name()), policy)?;
                    report = report.with_record(record, warning);
                }
            }
            Ok(report)
        }
        SyncScope::Subdirectories => {
            let mut report = SyncReport::default();
            for entry in top_level_entries(source)? {
                if entry.file_type().is_dir() {
                    let subtree = sync_recursive(entry.path(), &destination.join(entry.file_name()), policy)?;
                    report = report.combine(subtree);
                }
            }
            Ok(report)
        }
        SyncScope::Recursive => sync_recursive(source, destination, policy),
    }
}

fn top_level_entries(dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.with_context(|| format!("Failed to list {}", dir.display())))
        .collect()
}

fn sync_recursive(source: &Path, destination: &Path, policy: SyncPolicy) -> Result<SyncReport> {
    let mut report = SyncReport::default();
    ensure_dir(destination)?;

    for entry in WalkDir::new(source).min_depth(1).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("Failed to relativize {}", entry.path().display()))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            let (record, warning) = sync_file(entry.path(), &target, policy)?;
            report = report.with_record(record, warning);
        } else {
            debug!("Ignoring non-regular file {}", entry.path().display());
        }
    }

    Ok(report)
}
