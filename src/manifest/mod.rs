//! The install manifest (`<base>/.claude/kilntwo/manifest.json`).
//!
//! The manifest is kilntwo's only record of what it put on disk. Install
//! writes it, update reads the previous one before rewriting it through
//! install, and uninstall and doctor only read it.
//!
//! # Format
//!
//! ```json
//! {
//!   "manifestVersion": 1,
//!   "kilnVersion": "0.1.0",
//!   "installedAt": "2026-10-14T09:30:00Z",
//!   "files": [
//!     { "path": "agents/kiln-planner.md", "checksum": "sha256:..." }
//!   ],
//!   "protocolMarkers": {
//!     "begin": "<!-- kiln:protocol:begin -->",
//!     "end": "<!-- kiln:protocol:end -->"
//!   },
//!   "claudeMdPath": "/work/app/CLAUDE.md",
//!   "projectPath": "/work/app"
//! }
//! ```
//!
//! `files[].path` is relative to the managed root and always uses forward
//! slashes. Because the file is editable by anyone with access to the managed
//! root, a manifest read from disk is held as a raw [`serde_json::Value`]
//! ([`ManifestState::Present`]) until [`validation::validate`] has accepted it.
//! Only then does it become a typed [`Manifest`].
//!
//! # Reading
//!
//! A missing file and a file that is not JSON both read as
//! [`ManifestState::Absent`]. Other read errors (permission denied) propagate.

pub mod checksum;
pub mod validation;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{HOST_DOCUMENT_NAME, MANIFEST_VERSION, PROTOCOL_BEGIN, PROTOCOL_END};
use crate::core::KilnError;
use crate::utils::fs::write_json_file;

pub use checksum::{compute_checksum, verify_checksum};
pub use validation::{Validation, validate};

/// Result of reading the manifest file.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestState {
    /// The file exists and parsed as JSON. Not yet validated.
    Present(Value),
    /// No file, or a file that is not JSON.
    Absent,
}

/// One managed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Path relative to the managed root, forward slashes
    pub path: String,
    /// `sha256:<hex>` of the file as installed
    pub checksum: String,
}

/// Begin/end delimiters of the block injected into the host document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMarkers {
    /// First line of the block
    pub begin: String,
    /// Last line of the block
    pub end: String,
}

impl Default for ProtocolMarkers {
    fn default() -> Self {
        Self {
            begin: PROTOCOL_BEGIN.to_string(),
            end: PROTOCOL_END.to_string(),
        }
    }
}

/// Legacy nesting of the project fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallTarget {
    /// Host document of the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_md_path: Option<String>,
    /// Project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
}

/// A validated install manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Schema version
    pub manifest_version: u64,
    /// Version of the installed asset bundle
    pub kiln_version: String,
    /// RFC 3339 time of the install
    pub installed_at: String,
    /// Every managed file, in install order
    pub files: Vec<ManifestFile>,
    /// Delimiters of the injected protocol block
    pub protocol_markers: ProtocolMarkers,
    /// Host document the protocol block was injected into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_md_path: Option<String>,
    /// Project root passed to install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    /// Older manifests nest the project fields here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_target: Option<InstallTarget>,
}

impl Manifest {
    /// Creates a manifest stamped with the current time and default markers.
    ///
    /// When `project_path` is given, both the top-level and the
    /// `installTarget` project fields are filled so that older readers find
    /// them too.
    #[must_use]
    pub fn new(kiln_version: impl Into<String>, files: Vec<ManifestFile>, project_path: Option<&Path>) -> Self {
        let project = project_path.map(|p| p.display().to_string());
        let claude_md = project_path.map(|p| p.join(HOST_DOCUMENT_NAME).display().to_string());

        Self {
            manifest_version: MANIFEST_VERSION,
            kiln_version: kiln_version.into(),
            installed_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            files,
            protocol_markers: ProtocolMarkers::default(),
            install_target: project.as_ref().map(|_| InstallTarget {
                claude_md_path: claude_md.clone(),
                project_path: project.clone(),
            }),
            claude_md_path: claude_md,
            project_path: project,
        }
    }

    /// Converts a raw record into a typed manifest.
    ///
    /// # Errors
    ///
    /// Returns [`KilnError::InvalidManifest`] listing every violation reported by
    /// [`validate`].
    pub fn from_value(raw: &Value) -> Result<Self, KilnError> {
        let validation = validate(raw);
        if !validation.valid {
            return Err(KilnError::InvalidManifest {
                errors: validation.errors,
            });
        }

        serde_json::from_value(raw.clone()).map_err(|e| KilnError::InvalidManifest {
            errors: vec![e.to_string()],
        })
    }

    /// The project root this manifest was installed for.
    ///
    /// `projectPath`, then the directory of `claudeMdPath`, then the same two
    /// under `installTarget`. Empty strings count as absent.
    #[must_use]
    pub fn resolved_project_path(&self) -> Option<PathBuf> {
        let target = self.install_target.as_ref();

        non_empty(self.project_path.as_deref())
            .map(PathBuf::from)
            .or_else(|| non_empty(self.claude_md_path.as_deref()).and_then(parent_dir))
            .or_else(|| non_empty(target.and_then(|t| t.project_path.as_deref())).map(PathBuf::from))
            .or_else(|| non_empty(target.and_then(|t| t.claude_md_path.as_deref())).and_then(parent_dir))
    }

    /// The host document holding the protocol block.
    ///
    /// `claudeMdPath`, then `installTarget.claudeMdPath`, then `CLAUDE.md`
    /// under `projectPath` and under `installTarget.projectPath`.
    #[must_use]
    pub fn resolved_host_document(&self) -> Option<PathBuf> {
        let target = self.install_target.as_ref();

        non_empty(self.claude_md_path.as_deref())
            .map(PathBuf::from)
            .or_else(|| non_empty(target.and_then(|t| t.claude_md_path.as_deref())).map(PathBuf::from))
            .or_else(|| non_empty(self.project_path.as_deref()).map(|p| Path::new(p).join(HOST_DOCUMENT_NAME)))
            .or_else(|| {
                non_empty(target.and_then(|t| t.project_path.as_deref()))
                    .map(|p| Path::new(p).join(HOST_DOCUMENT_NAME))
            })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parent_dir(path: &str) -> Option<PathBuf> {
    Path::new(path).parent().map(Path::to_path_buf)
}

/// Reads the manifest file.
///
/// # Errors
///
/// Only I/O failures other than "not found" are errors.
pub fn read_manifest(path: &Path) -> Result<ManifestState> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ManifestState::Absent),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read manifest: {}", path.display()));
        }
    };

    match serde_json::from_str(&content) {
        Ok(raw) => Ok(ManifestState::Present(raw)),
        Err(e) => {
            debug!("Ignoring unparseable manifest {}: {}", path.display(), e);
            Ok(ManifestState::Absent)
        }
    }
}

/// Reads and validates the manifest.
///
/// Returns `Ok(None)` when there is no manifest.
///
/// # Errors
///
/// [`KilnError::InvalidManifest`] when the manifest exists but fails
/// validation, or any read error from [`read_manifest`].
pub fn load_manifest(path: &Path) -> Result<Option<Manifest>> {
    match read_manifest(path)? {
        ManifestState::Absent => Ok(None),
        ManifestState::Present(raw) => Ok(Some(Manifest::from_value(&raw)?)),
    }
}

/// Writes the manifest as pretty JSON with a trailing newline, atomically,
/// creating parent directories.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    write_json_file(path, manifest)
        .with_context(|| format!("Failed to write manifest: {}", path.display()))
}
