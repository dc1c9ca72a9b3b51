//! Installation of the asset bundle into a managed root.
//!
//! [`install`] is the one place that writes managed files. Update re-runs it
//! and diffs the result against the previous manifest, so everything install
//! does must be safe to repeat.
//!
//! # Installation Process
//!
//! 1. **Resolve paths** from the base-directory override
//! 2. **Sync each category** ([`AssetCategory::ALL`]) under the conflict
//!    decision table of [`crate::sync`]
//! 3. **Merge the hooks document** into `<root>/hooks/hooks.json`
//! 4. **Inject the protocol block** into `<project>/CLAUDE.md`
//! 5. **Check `.gitignore`** for rules hiding kilntwo's trees (warn only)
//! 6. **Seed first-run project state** ([`state`])
//! 7. **Write the manifest** listing every installed file with a fresh
//!    checksum
//!
//! Steps 4-6 only run when a project path is given.
//!
//! # What the manifest lists
//!
//! Only files whose content now matches the bundle (copied or identical). A
//! conflicted file is reported in [`InstallReport::skipped`] and left out, as
//! are the hooks document and the state documents, which hold operator data.

pub mod state;

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::constants::{PROTOCOL_ASSET, bundle_version};
use crate::core::{AssetCategory, KilnError};
use crate::hooks::{HookMergeStatus, install_hooks_document};
use crate::manifest::{Manifest, ManifestFile, ProtocolMarkers, compute_checksum, write_manifest};
use crate::markers::{InjectOutcome, inject_block};
use crate::paths::{KilnPaths, project_claude_md};
use crate::sync::{SyncPolicy, SyncReport, sync_tree};
use crate::utils::fs::ensure_dir;
use crate::utils::path_validation::relative_to_root;

pub use state::{ModelMode, StateReport};

/// Inputs of [`install`].
///
/// Built with [`InstallOptions::new`] and the `with_*` methods:
///
/// ```rust,no_run
/// use kilntwo::installer::InstallOptions;
///
/// let options = InstallOptions::new("/opt/kilntwo/assets")
///     .with_home("/work/app")
///     .with_project("/work/app")
///     .with_force(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Base directory override; the user's home when `None`
    pub home: Option<PathBuf>,
    /// Project receiving the protocol block and state documents
    pub project_path: Option<PathBuf>,
    /// Root of the asset bundle
    pub assets_dir: PathBuf,
    /// Overwrite managed files that differ from the bundle
    pub force: bool,
    /// The managed root is shared across projects (affects the ignore check)
    pub global: bool,
    /// Version recorded in the manifest
    pub bundle_version: String,
    /// Recorded in the project config
    pub model_mode: ModelMode,
    /// Recorded in the project config
    pub use_teams: bool,
}

impl InstallOptions {
    /// Options for installing the bundle at `assets_dir` with every other
    /// setting at its default.
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            home: None,
            project_path: None,
            assets_dir: assets_dir.into(),
            force: false,
            global: false,
            bundle_version: bundle_version(),
            model_mode: ModelMode::default(),
            use_teams: true,
        }
    }

    /// Sets the base directory override.
    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Sets the project.
    #[must_use]
    pub fn with_project(mut self, project: impl Into<PathBuf>) -> Self {
        self.project_path = Some(project.into());
        self
    }

    /// Sets `force`.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Sets `global`.
    #[must_use]
    pub const fn with_global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Overrides the version recorded in the manifest.
    #[must_use]
    pub fn with_bundle_version(mut self, version: impl Into<String>) -> Self {
        self.bundle_version = version.into();
        self
    }

    /// Sets the model mode.
    #[must_use]
    pub const fn with_model_mode(mut self, mode: ModelMode) -> Self {
        self.model_mode = mode;
        self
    }

    /// Sets the teams preference.
    #[must_use]
    pub const fn with_teams(mut self, use_teams: bool) -> Self {
        self.use_teams = use_teams;
        self
    }
}

/// Sync result of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    /// The category
    pub category: AssetCategory,
    /// Its file records and warnings
    pub report: SyncReport,
}

/// Result of [`install`].
#[derive(Debug, Clone)]
pub struct InstallReport {
    /// Resolved locations
    pub paths: KilnPaths,
    /// Absolute paths that match the bundle (copied or identical)
    pub installed: Vec<PathBuf>,
    /// Absolute paths left alone because they differ from the bundle
    pub skipped: Vec<PathBuf>,
    /// Per-category results, in install order
    pub categories: Vec<CategoryReport>,
    /// What happened to the hooks document
    pub hooks_status: HookMergeStatus,
    /// What happened to the host document, when a project was given
    pub protocol: Option<InjectOutcome>,
    /// First-run state, when a project was given
    pub state: Option<StateReport>,
    /// The manifest that was written
    pub manifest: Manifest,
    /// Every non-fatal problem, in the order it occurred
    pub warnings: Vec<String>,
}

impl InstallReport {
    /// The sync result of one category.
    #[must_use]
    pub fn category(&self, category: AssetCategory) -> Option<&SyncReport> {
        self.categories.iter().find(|c| c.category == category).map(|c| &c.report)
    }
}

/// Installs the asset bundle.
///
/// # Errors
///
/// - [`KilnError::AssetsNotFound`] if the bundle directory does not exist
/// - [`KilnError::ConfigurationError`] if no home override is given and the
///   home directory cannot be resolved
/// - any I/O failure while writing managed files or the manifest
///
/// Conflicts, missing bundle categories and unparseable hooks documents are
/// warnings, not errors.
pub fn install(options: &InstallOptions) -> Result<InstallReport> {
    if !options.assets_dir.is_dir() {
        return Err(KilnError::AssetsNotFound {
            path: options.assets_dir.display().to_string(),
        }
        .into());
    }

    let paths = KilnPaths::resolve(options.home.as_deref())?;
    ensure_dir(&paths.claude_dir)?;
    info!("Installing {} into {}", options.assets_dir.display(), paths.claude_dir.display());

    let policy = SyncPolicy {
        force: options.force,
    };
    let mut warnings = Vec::new();
    let mut categories = Vec::new();
    let mut combined = SyncReport::default();

    for category in AssetCategory::ALL {
        let report = sync_tree(
            &category.source_dir(&options.assets_dir),
            &category.dest_dir(&paths),
            category.scope(),
            policy,
        )
        .with_context(|| format!("Failed to install {category}"))?;

        info!(
            "{}: {} copied, {} unchanged, {} conflicts",
            category,
            report.copied(),
            report.identical(),
            report.conflicts()
        );
        warnings.extend(report.warnings().iter().cloned());
        combined = combined.combine(report.clone());
        categories.push(CategoryReport {
            category,
            report,
        });
    }

    let hooks = install_hooks_document(&options.assets_dir.join("hooks").join("hooks.json"), &paths.hooks_json_path)?;
    warnings.extend(hooks.warnings);

    let markers = ProtocolMarkers::default();
    let mut protocol = None;
    let mut state = None;

    if let Some(project) = options.project_path.as_deref() {
        protocol = inject_protocol(&options.assets_dir, project, &markers, &mut warnings)?;
        warnings.extend(state::check_gitignore(project, options.global));

        let report = state::initialize_project_state(&state::StateOptions {
            project,
            templates_dir: &options.assets_dir.join("templates"),
            memory_dir: &paths.project_memory_dir(project),
            model_mode: options.model_mode,
            use_teams: options.use_teams,
        })?;
        warnings.extend(report.warnings.iter().cloned());
        state = Some(report);
    }

    let installed = combined.installed_paths();
    let skipped = combined.conflict_paths();

    let mut files = Vec::with_capacity(installed.len());
    for path in &installed {
        let Some(relative) = relative_to_root(&paths.claude_dir, path) else {
            warn!("Not recording {} outside {}", path.display(), paths.claude_dir.display());
            continue;
        };
        files.push(ManifestFile {
            path: relative,
            checksum: compute_checksum(path)?,
        });
    }

    let manifest = Manifest::new(&options.bundle_version, files, options.project_path.as_deref());
    write_manifest(&manifest, &paths.manifest_path)?;
    debug!("Wrote manifest with {} entries to {}", manifest.files.len(), paths.manifest_path.display());

    Ok(InstallReport {
        paths,
        installed,
        skipped,
        categories,
        hooks_status: hooks.status,
        protocol,
        state,
        manifest,
        warnings,
    })
}

fn inject_protocol(
    assets_dir: &Path,
    project: &Path,
    markers: &ProtocolMarkers,
    warnings: &mut Vec<String>,
) -> Result<Option<InjectOutcome>> {
    let body_path = assets_dir.join(PROTOCOL_ASSET);
    let body = match fs::read_to_string(&body_path) {
        Ok(body) => body,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let warning = format!("Missing protocol document: {}", body_path.display());
            warn!("{}", warning);
            warnings.push(warning);
            return Ok(None);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", body_path.display()));
        }
    };

    let outcome = inject_block(&project_claude_md(project), markers, &body)?;
    Ok(Some(outcome))
}
