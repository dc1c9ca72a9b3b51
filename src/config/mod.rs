//! Configuration for kilntwo
//!
//! - [`KilnConfig`]: the optional user configuration file
//! - [`resolve_assets_dir`]: where the asset bundle is read from
//!
//! # Asset bundle resolution
//!
//! The first candidate that names an existing directory wins:
//!
//! 1. `--assets <DIR>`
//! 2. `KILNTWO_ASSETS`
//! 3. `assets_dir` in the config file
//! 4. `<exe dir>/assets`
//! 5. `<exe dir>/../share/kilntwo/assets`
//!
//! An explicitly given location (1-3) that does not exist is still an error
//! rather than a fallthrough, so a typo is reported instead of silently
//! installing a different bundle.

mod global;

pub use global::KilnConfig;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::KilnError;

/// Environment variable naming the asset bundle directory.
pub const ASSETS_ENV: &str = "KILNTWO_ASSETS";

/// Resolves the asset bundle directory for this process.
///
/// # Errors
///
/// [`KilnError::AssetsNotFound`] when an explicit location does not exist or
/// no default location exists.
pub fn resolve_assets_dir(flag: Option<&Path>, config: &KilnConfig) -> Result<PathBuf> {
    let env = std::env::var_os(ASSETS_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);
    let exe_dir = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_assets_dir_from(flag, env, config.expanded_assets_dir()?, exe_dir.as_deref())
}

/// [`resolve_assets_dir`] with every input given explicitly.
///
/// # Errors
///
/// Same as [`resolve_assets_dir`].
pub fn resolve_assets_dir_from(
    flag: Option<&Path>,
    env: Option<PathBuf>,
    configured: Option<PathBuf>,
    exe_dir: Option<&Path>,
) -> Result<PathBuf> {
    let explicit = flag.map(Path::to_path_buf).or(env).or(configured);
    if let Some(dir) = explicit {
        if dir.is_dir() {
            return Ok(dir);
        }
        return Err(KilnError::AssetsNotFound {
            path: dir.display().to_string(),
        }
        .into());
    }

    let Some(exe_dir) = exe_dir else {
        return Err(KilnError::AssetsNotFound {
            path: "<unknown executable directory>".to_string(),
        }
        .into());
    };

    let candidates = [
        exe_dir.join("assets"),
        exe_dir.join("..").join("share").join("kilntwo").join("assets"),
    ];
    for candidate in &candidates {
        debug!("Looking for asset bundle at {}", candidate.display());
        if candidate.is_dir() {
            return Ok(candidate.clone());
        }
    }

    Err(KilnError::AssetsNotFound {
        path: candidates[candidates.len() - 1].display().to_string(),
    }
    .into())
}
