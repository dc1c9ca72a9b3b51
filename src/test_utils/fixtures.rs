//! On-disk fixtures: an asset bundle and a workspace to install into.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Hooks document shipped by [`AssetBundleFixture::standard`].
pub const STANDARD_HOOKS_JSON: &str = r#"{
  "hooks": [
    { "event": "Stop", "type": "command", "command": "$CLAUDE_PROJECT_DIR/.claude/hooks/scripts/kiln-stop.sh" },
    { "event": "PreToolUse", "type": "command", "command": "$CLAUDE_PROJECT_DIR/.claude/hooks/scripts/kiln-guard.sh" }
  ]
}
"#;

/// Files of the standard bundle that end up listed in the manifest, relative
/// to the managed root.
pub const STANDARD_MANAGED_PATHS: &[&str] = &[
    "agents/kiln-planner.md",
    "agents/kiln-reviewer.md",
    "kilntwo/skills/kiln-core/SKILL.md",
    "kilntwo/skills/kiln-core/reference/phases.md",
    "commands/kiln/fire.md",
    "commands/kiln/status.md",
    "hooks/scripts/kiln-guard.sh",
    "hooks/scripts/kiln-stop.sh",
    "kilntwo/templates/MEMORY.md",
    "kilntwo/templates/STATE.md.tmpl",
    "kilntwo/templates/config.json.tmpl",
];

/// A temporary asset bundle directory.
///
/// The directory is deleted when the fixture is dropped.
pub struct AssetBundleFixture {
    dir: TempDir,
}

impl AssetBundleFixture {
    /// An empty bundle directory.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("Failed to create asset bundle directory")?,
        })
    }

    /// A small bundle covering every category, the hooks document, the
    /// protocol body and the state templates.
    pub fn standard() -> Result<Self> {
        let bundle = Self::empty()?;
        bundle.write("agents/kiln-planner.md", "# Planner\n\nPlans the work.\n")?;
        bundle.write("agents/kiln-reviewer.md", "# Reviewer\n\nReviews the work.\n")?;
        bundle.write("agents/README.txt", "not an agent\n")?;
        bundle.write("skills/kiln-core/SKILL.md", "# Kiln core\n")?;
        bundle.write("skills/kiln-core/reference/phases.md", "plan, execute, verify\n")?;
        bundle.write("commands/kiln/fire.md", "Light the kiln.\n")?;
        bundle.write("commands/kiln/status.md", "Where am I?\n")?;
        bundle.write("hooks/scripts/kiln-stop.sh", "#!/bin/sh\nexit 0\n")?;
        bundle.write("hooks/scripts/kiln-guard.sh", "#!/bin/sh\nexit 0\n")?;
        bundle.write("hooks/hooks.json", STANDARD_HOOKS_JSON)?;
        bundle.write("templates/MEMORY.md", "# Project memory\n")?;
        bundle.write("templates/STATE.md.tmpl", "# {{project_name}}\n\nStep: {{current_step}} ({{step_status}})\n")?;
        bundle.write("templates/config.json.tmpl", "{\n  \"version\": 1,\n  \"preferences\": {}\n}\n")?;
        bundle.write("protocol.md", "## Kiln protocol\n\nFollow the pipeline.\n")?;
        Ok(bundle)
    }

    /// Bundle root.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a file relative to the bundle root, creating parents.
    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Deletes a file relative to the bundle root.
    pub fn remove(&self, relative: &str) -> Result<()> {
        let path = self.dir.path().join(relative);
        fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))
    }
}

/// A temporary home directory and project directory.
pub struct WorkspaceFixture {
    dir: TempDir,
}

impl WorkspaceFixture {
    /// Creates `home/` and `project/` inside a fresh temporary directory.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create workspace directory")?;
        fs::create_dir_all(dir.path().join("home"))?;
        fs::create_dir_all(dir.path().join("project"))?;
        Ok(Self {
            dir,
        })
    }

    /// The base directory used as the `--home` override.
    #[must_use]
    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// The project directory.
    #[must_use]
    pub fn project(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    /// The managed root under the home directory.
    #[must_use]
    pub fn claude_dir(&self) -> PathBuf {
        self.home().join(".claude")
    }

    /// Reads a file relative to the managed root.
    pub fn read_managed(&self, relative: &str) -> Result<String> {
        let path = self.claude_dir().join(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Writes a file relative to the managed root, creating parents.
    pub fn write_managed(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.claude_dir().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}
