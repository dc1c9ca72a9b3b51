//! Removal of everything install put under the managed root.
//!
//! Uninstall only deletes what the manifest lists. The manifest is validated
//! and every entry is resolved through the traversal guard *before* the
//! first file is deleted, so a tampered manifest deletes nothing at all.
//!
//! After the files: the protocol block is removed from the host document,
//! managed directories left empty are pruned (deepest first, never the
//! managed root itself), and finally the manifest is deleted. The operation
//! is best effort and not transactional; running it again after a partial
//! failure picks up where it stopped, as long as the manifest is still there.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::manifest::load_manifest;
use crate::markers::remove_block;
use crate::paths::KilnPaths;
use crate::utils::fs::{remove_dir_if_empty, remove_file_if_exists};
use crate::utils::path_validation::resolve_managed_path;

/// Inputs of [`uninstall`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallOptions {
    /// Base directory override; the user's home when `None`
    pub home: Option<PathBuf>,
}

/// Details of a completed uninstall.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UninstallSummary {
    /// Files deleted, in manifest order
    pub removed: Vec<PathBuf>,
    /// Listed files that were already gone
    pub not_found: Vec<PathBuf>,
    /// Host document the protocol block was removed from
    pub protocol_removed_from: Option<PathBuf>,
    /// Directories pruned because they ended up empty
    pub pruned_dirs: Vec<PathBuf>,
}

/// Result of [`uninstall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// There is no manifest under the managed root
    NotInstalled,
    /// The listed files were processed
    Removed(UninstallSummary),
}

/// Uninstalls the installation under `options.home`.
///
/// # Errors
///
/// - [`crate::core::KilnError::InvalidManifest`] if the manifest fails
///   validation (a `..` entry included)
/// - [`crate::core::KilnError::PathTraversal`] /
///   [`crate::core::KilnError::PathEscape`] for an entry the guard rejects
/// - any deletion failure other than "not found" (permission denied)
pub fn uninstall(options: &UninstallOptions) -> Result<UninstallOutcome> {
    let paths = KilnPaths::resolve(options.home.as_deref())?;

    let Some(manifest) = load_manifest(&paths.manifest_path)? else {
        debug!("No manifest at {}", paths.manifest_path.display());
        return Ok(UninstallOutcome::NotInstalled);
    };

    let targets = manifest
        .files
        .iter()
        .map(|file| resolve_managed_path(&paths.claude_dir, &file.path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut summary = UninstallSummary::default();
    for target in &targets {
        if remove_file_if_exists(target)? {
            summary.removed.push(target.clone());
        } else {
            summary.not_found.push(target.clone());
        }
    }

    if let Some(host_document) = manifest.resolved_host_document()
        && remove_block(&host_document, &manifest.protocol_markers)
            .with_context(|| format!("Failed to remove protocol block from {}", host_document.display()))?
    {
        summary.protocol_removed_from = Some(host_document);
    }

    for dir in prune_candidates(&paths, &targets) {
        if remove_dir_if_empty(&dir)? {
            summary.pruned_dirs.push(dir);
        }
    }

    remove_file_if_exists(&paths.manifest_path)?;
    if remove_dir_if_empty(&paths.kilntwo_dir)? {
        summary.pruned_dirs.push(paths.kilntwo_dir.clone());
    }

    info!(
        "Uninstalled from {}: {} removed, {} already gone",
        paths.claude_dir.display(),
        summary.removed.len(),
        summary.not_found.len()
    );
    Ok(UninstallOutcome::Removed(summary))
}

/// Parents of every target up to (not including) the managed root, plus the
/// standard managed directories, deepest first.
fn prune_candidates(paths: &KilnPaths, targets: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: BTreeSet<PathBuf> = [
        &paths.agents_dir,
        &paths.commands_dir,
        &paths.skills_dir,
        &paths.templates_dir,
        &paths.hook_scripts_dir,
        &paths.hooks_dir,
    ]
    .into_iter()
    .cloned()
    .collect();

    for target in targets {
        let mut current: Option<&Path> = target.parent();
        while let Some(dir) = current {
            if dir == paths.claude_dir || !dir.starts_with(&paths.claude_dir) {
                break;
            }
            dirs.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }

    let mut ordered: Vec<PathBuf> = dirs.into_iter().collect();
    ordered.sort_by(|a, b| {
        b.components().count().cmp(&a.components().count()).then_with(|| a.cmp(b))
    });
    ordered
}
