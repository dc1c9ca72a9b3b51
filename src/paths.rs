//! Canonical filesystem locations
//!
//! Every orchestrator resolves its own [`KilnPaths`] from an explicit base
//! directory override (falling back to the user's home directory), so nothing
//! here depends on process-wide state such as the working directory.
//!
//! ```text
//! <base>/.claude/                      managed root
//! ├── agents/                          agent definitions
//! ├── commands/kiln/                   command scripts
//! ├── hooks/scripts/ + hooks.json      hook scripts and merged hooks document
//! ├── settings.json                    host settings (read by doctor)
//! ├── projects/<encoded>/memory/       per-project memory
//! └── kilntwo/
//!     ├── skills/
//!     ├── templates/
//!     └── manifest.json
//! ```

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::constants::{HOST_DOCUMENT_NAME, MANAGED_ROOT_NAME, NAMESPACE_DIR, STATE_DIR_NAME};
use crate::core::KilnError;

/// All locations derived from one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KilnPaths {
    /// The base directory (`--home` override or the user's home)
    pub base: PathBuf,
    /// Managed root, `<base>/.claude`
    pub claude_dir: PathBuf,
    /// `<root>/agents`
    pub agents_dir: PathBuf,
    /// `<root>/commands/kiln`
    pub commands_dir: PathBuf,
    /// Namespaced sub-root, `<root>/kilntwo`
    pub kilntwo_dir: PathBuf,
    /// `<root>/kilntwo/skills`
    pub skills_dir: PathBuf,
    /// `<root>/kilntwo/templates`
    pub templates_dir: PathBuf,
    /// `<root>/kilntwo/manifest.json`
    pub manifest_path: PathBuf,
    /// `<root>/hooks`
    pub hooks_dir: PathBuf,
    /// `<root>/hooks/scripts`
    pub hook_scripts_dir: PathBuf,
    /// `<root>/hooks/hooks.json`
    pub hooks_json_path: PathBuf,
    /// `<root>/settings.json`
    pub settings_path: PathBuf,
}

impl KilnPaths {
    /// Resolves every location from `home_override`, or from the user's home
    /// directory when no override is given.
    ///
    /// # Errors
    ///
    /// Returns [`KilnError::ConfigurationError`] when no override is given and
    /// the home directory cannot be determined. A relative override is taken
    /// relative to the current directory.
    pub fn resolve(home_override: Option<&Path>) -> Result<Self, KilnError> {
        let base = resolve_base(home_override)?;
        Ok(Self::from_base(base))
    }

    /// Derives every location from an already-known base directory.
    #[must_use]
    pub fn from_base(base: PathBuf) -> Self {
        let claude_dir = base.join(MANAGED_ROOT_NAME);
        let kilntwo_dir = claude_dir.join(NAMESPACE_DIR);
        let hooks_dir = claude_dir.join("hooks");

        Self {
            agents_dir: claude_dir.join("agents"),
            commands_dir: claude_dir.join("commands").join("kiln"),
            skills_dir: kilntwo_dir.join("skills"),
            templates_dir: kilntwo_dir.join("templates"),
            manifest_path: kilntwo_dir.join("manifest.json"),
            hook_scripts_dir: hooks_dir.join("scripts"),
            hooks_json_path: hooks_dir.join("hooks.json"),
            settings_path: claude_dir.join("settings.json"),
            hooks_dir,
            kilntwo_dir,
            claude_dir,
            base,
        }
    }

    /// The per-project memory directory,
    /// `<base>/.claude/projects/<encoded project path>/memory`.
    #[must_use]
    pub fn project_memory_dir(&self, project_path: &Path) -> PathBuf {
        self.claude_dir
            .join("projects")
            .join(encode_project_path(&project_path.to_string_lossy()))
            .join("memory")
    }
}

/// The base as an absolute path, so every path derived from it compares
/// equal to the resolved form of a manifest entry.
fn resolve_base(home_override: Option<&Path>) -> Result<PathBuf, KilnError> {
    let base = match home_override {
        Some(home) => home.to_path_buf(),
        None => dirs::home_dir().ok_or_else(|| KilnError::ConfigurationError {
            message: "unable to determine home directory".to_string(),
        })?,
    };
    std::path::absolute(&base).map_err(|e| KilnError::ConfigurationError {
        message: format!("cannot make {} absolute: {e}", base.display()),
    })
}

/// Encodes an absolute path into a single filesystem-safe path segment.
///
/// Runs of `/` or `\` become `-`, each of `: * ? " < > |` becomes `-`, and
/// runs of `-` collapse to one.
///
/// This encoding is lossy: `/a/b-c` and `/a-b/c` both become `-a-b-c`. Memory
/// directories already on disk are named with it, so it must not change.
#[must_use]
pub fn encode_project_path(absolute_path: &str) -> String {
    let mut encoded = absolute_path.to_string();
    for pattern in [r"[\\/]+", r#"[:*?"<>|]"#, r"-+"] {
        if let Ok(re) = Regex::new(pattern) {
            encoded = re.replace_all(&encoded, "-").into_owned();
        }
    }
    encoded
}

/// The per-project memory directory for `project_path` under the base given
/// by `home_override` (or the user's home).
///
/// # Errors
///
/// Fails like [`KilnPaths::resolve`].
pub fn project_memory_dir(home_override: Option<&Path>, project_path: &Path) -> Result<PathBuf, KilnError> {
    Ok(KilnPaths::resolve(home_override)?.project_memory_dir(project_path))
}

/// The host document of a project, `<project>/CLAUDE.md`.
#[must_use]
pub fn project_claude_md(project_path: &Path) -> PathBuf {
    project_path.join(HOST_DOCUMENT_NAME)
}

/// The project state directory, `<project>/.kiln`.
#[must_use]
pub fn project_state_dir(project_path: &Path) -> PathBuf {
    project_path.join(STATE_DIR_NAME)
}
