//! SHA-256 checksums for managed files.
//!
//! Every entry in the manifest records `sha256:<lowercase hex>` of the file as
//! it was written at install time. Update compares against it to decide
//! whether a file changed, and strict doctor to detect drift.
//!
//! The algorithm is part of the on-disk format. Switching it would make every
//! existing manifest report a mismatch for every file.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::core::KilnError;

/// Prefix of every checksum string.
pub const CHECKSUM_PREFIX: &str = "sha256:";

/// Computes the checksum of a file.
///
/// # Arguments
///
/// * `path` - Path to the file to checksum
///
/// # Returns
///
/// * `Ok(String)` - Checksum in the format `sha256:<hex>` (71 characters)
/// * `Err` - [`KilnError::FileNotFound`] when the file does not exist, so
///   callers can tell "missing" from "unreadable"; any other read failure
///   carries the path as context
///
/// # Examples
///
/// ```rust,no_run
/// use kilntwo::manifest::checksum::compute_checksum;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let checksum = compute_checksum(Path::new(".claude/agents/kiln-planner.md"))?;
/// assert!(checksum.starts_with("sha256:"));
/// # Ok(())
/// # }
/// ```
pub fn compute_checksum(path: &Path) -> Result<String> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(KilnError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Cannot read file for checksum calculation: {}", path.display())
            });
        }
    };

    Ok(checksum_bytes(&content))
}

/// Checksum of an in-memory buffer, same format as [`compute_checksum`].
#[must_use]
pub fn checksum_bytes(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{CHECKSUM_PREFIX}{}", hex::encode(hasher.finalize()))
}

/// Verifies a file against an expected checksum.
///
/// # Errors
///
/// Fails like [`compute_checksum`]; a missing file is an error, not `false`.
pub fn verify_checksum(path: &Path, expected: &str) -> Result<bool> {
    Ok(compute_checksum(path)? == expected)
}

/// Returns `true` if `error` is the missing-file error of [`compute_checksum`].
#[must_use]
pub fn is_not_found(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<KilnError>(), Some(KilnError::FileNotFound { .. }))
}
