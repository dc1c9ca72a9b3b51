//! User configuration file (`~/.kilntwo/config.toml`).
//!
//! The file is optional. A missing file yields [`KilnConfig::default`]; a file
//! that exists but does not parse is an error, so a typo never silently falls
//! back to defaults.
//!
//! # File Format
//!
//! ```toml
//! # Where the asset bundle lives (tilde and $VARS are expanded)
//! assets_dir = "~/src/kilntwo/assets"
//!
//! # Executables doctor requires on PATH
//! required_clis = ["claude", "git"]
//! ```
//!
//! # Location
//!
//! `~/.kilntwo/config.toml` by default; `--config <FILE>` or `KILNTWO_CONFIG`
//! point elsewhere.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::DEFAULT_REQUIRED_CLIS;

fn default_required_clis() -> Vec<String> {
    DEFAULT_REQUIRED_CLIS.iter().map(ToString::to_string).collect()
}

fn is_default_required_clis(clis: &[String]) -> bool {
    clis.iter().map(String::as_str).eq(DEFAULT_REQUIRED_CLIS.iter().copied())
}

/// Contents of the user configuration file.
///
/// # Examples
///
/// ```rust
/// use kilntwo::config::KilnConfig;
///
/// let config: KilnConfig = toml::from_str(r#"assets_dir = "/opt/kilntwo/assets""#).unwrap();
/// assert_eq!(config.required_clis, ["claude", "codex", "git"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Asset bundle directory, as written in the file (unexpanded).
    ///
    /// Use [`KilnConfig::expanded_assets_dir`] to get a usable path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<String>,

    /// Executables doctor reports on.
    #[serde(default = "default_required_clis", skip_serializing_if = "is_default_required_clis")]
    pub required_clis: Vec<String>,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            assets_dir: None,
            required_clis: default_required_clis(),
        }
    }
}

impl KilnConfig {
    /// Loads the file at `path`, or at [`KilnConfig::default_path`] when
    /// `path` is `None`. A missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(_) => return Ok(Self::default()),
            },
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Loads a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Writes the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// `~/.kilntwo/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
        Ok(home.join(".kilntwo").join("config.toml"))
    }

    /// [`KilnConfig::assets_dir`] with `~` and environment variables expanded.
    ///
    /// # Errors
    ///
    /// Returns an error naming the variable when expansion fails.
    pub fn expanded_assets_dir(&self) -> Result<Option<PathBuf>> {
        let Some(raw) = self.assets_dir.as_deref() else {
            return Ok(None);
        };
        let expanded = shellexpand::full(raw).with_context(|| format!("Failed to expand assets_dir: {raw}"))?;
        Ok(Some(PathBuf::from(expanded.as_ref())))
    }
}
