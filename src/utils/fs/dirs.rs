//! Directory and file removal helpers.
//!
//! Creation tolerates an existing directory; removal tolerates a missing
//! target. Uninstall relies on both so that repeated runs never fail on state
//! a previous run already cleaned up.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Errors
///
/// Returns an error if the path exists but is not a directory, or if creation
/// fails (permission denied, read-only filesystem, ...).
///
/// # Examples
///
/// ```rust,no_run
/// use kilntwo::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new("output/agents/subdir"))?;
/// ensure_dir(Path::new("output/agents/subdir"))?; // already there: fine
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Ensures that the parent directory of a file path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Deletes a file, treating "already absent" as success.
///
/// Returns `true` when a file was deleted and `false` when there was nothing
/// to delete.
///
/// # Errors
///
/// Any failure other than [`ErrorKind::NotFound`] (permission denied in
/// particular) is returned to the caller.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to remove file: {}", path.display()))
        }
    }
}

/// Removes a directory only if it is empty.
///
/// Returns `true` when the directory was removed. A missing or non-empty
/// directory is not an error and returns `false`.
///
/// # Errors
///
/// Other failures (permission denied) are returned to the caller.
pub fn remove_dir_if_empty(path: &Path) -> Result<bool> {
    match fs::remove_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::DirectoryNotEmpty) => {
            Ok(false)
        }
        // removing a regular file through remove_dir fails with NotADirectory
        Err(e) if e.kind() == ErrorKind::NotADirectory => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to remove directory: {}", path.display()))
        }
    }
}
