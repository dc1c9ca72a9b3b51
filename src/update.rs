//! Update an existing installation in place.
//!
//! Update is install plus a diff. It snapshots what the previous manifest
//! recorded for every file, re-runs [`install`] for the same project, and
//! classifies each installed path:
//!
//! - **updated** - not in the previous manifest, missing on disk before the
//!   run, or its checksum changed;
//! - **unchanged** - same checksum as recorded;
//! - **skipped** - the destination differs from the bundle and `force` was not
//!   given (an operator edit); it is never overwritten.
//!
//! A managed file the operator deleted is therefore restored and reported as
//! updated, and two updates in a row with nothing changed in between yield
//! [`UpdateOutcome::UpToDate`] the second time.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::installer::{InstallOptions, install};
use crate::manifest::{compute_checksum, load_manifest};
use crate::paths::KilnPaths;
use crate::utils::path_validation::resolve_managed_path;

/// Classification of one path by [`update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileUpdateStatus {
    /// Written or restored by this run
    Updated,
    /// Left alone because it differs from the bundle
    Skipped,
}

/// One path and its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUpdate {
    /// Absolute path
    pub path: PathBuf,
    /// Classification
    pub status: FileUpdateStatus,
}

/// Details of an update that changed something (or changed the version).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    /// Version recorded in the previous manifest
    pub from: String,
    /// Version recorded now
    pub to: String,
    /// Updated and skipped paths with their classification, sorted by path
    pub updates: Vec<FileUpdate>,
    /// Sorted
    pub updated: Vec<PathBuf>,
    /// Sorted
    pub skipped: Vec<PathBuf>,
    /// Sorted
    pub unchanged: Vec<PathBuf>,
    /// Sorted; `updated` plus `unchanged`
    pub installed: Vec<PathBuf>,
}

/// Result of [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// There is no manifest under the managed root
    NotInstalled,
    /// Same version and nothing updated or skipped
    UpToDate {
        /// The installed version
        version: String,
    },
    /// Something changed
    Updated(UpdateSummary),
}

#[derive(Debug)]
struct PriorEntry {
    checksum: String,
    existed: bool,
}

/// Updates the installation under `options.home`.
///
/// The project path stored in the manifest replaces `options.project_path`,
/// so the protocol block and state documents go to the project the
/// installation was made for.
///
/// # Errors
///
/// - [`crate::core::KilnError::InvalidManifest`] if the manifest exists but
///   fails validation (a `..` entry included); nothing is written in that case
/// - [`crate::core::KilnError::PathEscape`] if an entry resolves outside the
///   managed root
/// - any error of [`install`]
pub async fn update(options: &InstallOptions) -> Result<UpdateOutcome> {
    let paths = KilnPaths::resolve(options.home.as_deref())?;

    let Some(previous) = load_manifest(&paths.manifest_path)? else {
        debug!("No manifest at {}", paths.manifest_path.display());
        return Ok(UpdateOutcome::NotInstalled);
    };

    let mut prior: HashMap<PathBuf, PriorEntry> = HashMap::with_capacity(previous.files.len());
    for file in &previous.files {
        let absolute = resolve_managed_path(&paths.claude_dir, &file.path)?;
        let existed = absolute.is_file();
        prior.insert(
            absolute,
            PriorEntry {
                checksum: file.checksum.clone(),
                existed,
            },
        );
    }

    let mut install_options = options.clone();
    install_options.project_path = previous.resolved_project_path();
    let report = install(&install_options)?;

    let mut installed = report.installed;
    let mut skipped = report.skipped;
    installed.sort();
    skipped.sort();

    let mut updated = Vec::new();
    let mut unchanged = Vec::new();
    for path in &installed {
        let current = compute_checksum(path)?;
        let is_unchanged = prior
            .get(path)
            .is_some_and(|entry| entry.existed && entry.checksum == current);
        if is_unchanged {
            unchanged.push(path.clone());
        } else {
            updated.push(path.clone());
        }
    }

    let from = previous.kiln_version;
    let to = report.manifest.kiln_version;
    info!(
        "Update {} -> {}: {} updated, {} unchanged, {} skipped",
        from,
        to,
        updated.len(),
        unchanged.len(),
        skipped.len()
    );

    if from == to && updated.is_empty() && skipped.is_empty() {
        return Ok(UpdateOutcome::UpToDate {
            version: to,
        });
    }

    let mut updates: Vec<FileUpdate> = updated
        .iter()
        .map(|p| (p, FileUpdateStatus::Updated))
        .chain(skipped.iter().map(|p| (p, FileUpdateStatus::Skipped)))
        .map(|(path, status)| FileUpdate {
            path: path.clone(),
            status,
        })
        .collect();
    updates.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(UpdateOutcome::Updated(UpdateSummary {
        from,
        to,
        updates,
        updated,
        skipped,
        unchanged,
        installed,
    }))
}
