//! Atomic file write operations using temp-and-rename strategy.
//!
//! Used for every JSON document kilntwo owns or rewrites (manifest, merged
//! hooks document, first-run config) so that an interrupted run never leaves a
//! half-written file for the host to parse.

use crate::utils::fs::dirs::ensure_dir;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Safely writes a string to a file using atomic operations.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Atomically replaces `path` with `content`.
///
/// The bytes go to a uniquely named temporary file in the target's directory,
/// are synced, and the temporary file is then renamed over `path`. Readers see
/// either the old document or the new one. Missing parent directories are
/// created.
///
/// # Examples
///
/// ```rust,no_run
/// use kilntwo::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new(".claude/hooks/hooks.json"), b"{\"hooks\":{}}\n")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;

    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to stage a write in {}", dir.display()))?;
    staged
        .write_all(content)
        .and_then(|()| staged.as_file().sync_all())
        .with_context(|| format!("Failed to write staged content for {}", path.display()))?;

    staged
        .persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_parents() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("nested").join("dir").join("doc.json");

        atomic_write(&target, b"{}").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");
        // only the target is left behind
        assert_eq!(std::fs::read_dir(target.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_safe_write_overwrites() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("doc.md");

        safe_write(&target, "first").unwrap();
        safe_write(&target, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
    }
}
