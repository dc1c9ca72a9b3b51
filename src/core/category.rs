//! Asset categories managed by kilntwo
//!
//! The asset bundle is split into five categories. Each category has its own
//! source directory inside the bundle, its own destination inside the managed
//! root, and its own traversal shape:
//!
//! | Category    | Bundle source       | Shape                                 |
//! |-------------|---------------------|---------------------------------------|
//! | `agents`    | `agents/`           | flat `*.md` files                     |
//! | `skills`    | `skills/`           | each subdirectory, copied recursively |
//! | `commands`  | `commands/`         | each subdirectory, copied recursively |
//! | `hooks`     | `hooks/scripts/`    | flat `*.sh` files (+ hooks.json merge)|
//! | `templates` | `templates/`        | full recursive copy                   |
//!
//! # Examples
//!
//! ```rust
//! use kilntwo::core::AssetCategory;
//!
//! let category: AssetCategory = "skills".parse().unwrap();
//! assert_eq!(category, AssetCategory::Skills);
//! assert_eq!(category.to_string(), "skills");
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::KilnPaths;
use crate::sync::SyncScope;

/// One asset category of the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    /// Agent definitions
    Agents,
    /// Skill documents, one directory per skill
    Skills,
    /// Command scripts, one directory per command namespace
    Commands,
    /// Hook scripts (the hooks document is merged separately)
    Hooks,
    /// Templates used for first-run state documents
    Templates,
}

impl AssetCategory {
    /// Every category, in install order.
    pub const ALL: [Self; 5] = [
        Self::Agents,
        Self::Skills,
        Self::Commands,
        Self::Hooks,
        Self::Templates,
    ];

    /// Source directory of this category inside the asset bundle.
    #[must_use]
    pub fn source_dir(self, assets_dir: &Path) -> PathBuf {
        match self {
            Self::Agents => assets_dir.join("agents"),
            Self::Skills => assets_dir.join("skills"),
            Self::Commands => assets_dir.join("commands"),
            Self::Hooks => assets_dir.join("hooks").join("scripts"),
            Self::Templates => assets_dir.join("templates"),
        }
    }

    /// Destination directory of this category inside the managed root.
    #[must_use]
    pub fn dest_dir(self, paths: &KilnPaths) -> PathBuf {
        match self {
            Self::Agents => paths.agents_dir.clone(),
            Self::Skills => paths.skills_dir.clone(),
            // one subdirectory per namespace lands directly under commands/
            Self::Commands => paths.claude_dir.join("commands"),
            Self::Hooks => paths.hook_scripts_dir.clone(),
            Self::Templates => paths.templates_dir.clone(),
        }
    }

    /// How the source directory is traversed.
    #[must_use]
    pub const fn scope(self) -> SyncScope {
        match self {
            Self::Agents => SyncScope::Flat {
                extension: "md",
            },
            Self::Skills | Self::Commands => SyncScope::Subdirectories,
            Self::Hooks => SyncScope::Flat {
                extension: "sh",
            },
            Self::Templates => SyncScope::Recursive,
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agents => write!(f, "agents"),
            Self::Skills => write!(f, "skills"),
            Self::Commands => write!(f, "commands"),
            Self::Hooks => write!(f, "hooks"),
            Self::Templates => write!(f, "templates"),
        }
    }
}

impl std::str::FromStr for AssetCategory {
    type Err = crate::core::KilnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agent" | "agents" => Ok(Self::Agents),
            "skill" | "skills" => Ok(Self::Skills),
            "command" | "commands" => Ok(Self::Commands),
            "hook" | "hooks" => Ok(Self::Hooks),
            "template" | "templates" => Ok(Self::Templates),
            _ => Err(crate::core::KilnError::ConfigurationError {
                message: format!("unknown asset category: {s}"),
            }),
        }
    }
}
