//! Path validation for manifest-controlled paths.
//!
//! The manifest is a plain JSON file that anyone with write access to the
//! managed root can edit. Every path read from it is therefore untrusted and
//! goes through [`resolve_managed_path`] before any filesystem operation:
//!
//! 1. a `..` segment (with either separator) is rejected outright as
//!    [`KilnError::PathTraversal`];
//! 2. the remaining path is joined to the managed root, `.` segments are
//!    dropped, and the result must start with the root *plus a trailing
//!    separator*, otherwise [`KilnError::PathEscape`]. The trailing separator
//!    keeps a sibling such as `.claude-evil` from matching `.claude`.
//!
//! The check is lexical. Paths are never canonicalized because the target
//! commonly does not exist yet (update restores deleted files).

use std::path::{Component, Path, PathBuf};

use crate::core::KilnError;

/// Returns `true` if `path` contains a `..` segment.
///
/// Both `/` and `\` count as separators so that a manifest written on one
/// platform cannot smuggle a traversal past another.
///
/// # Examples
///
/// ```rust
/// use kilntwo::utils::path_validation::has_traversal_segment;
///
/// assert!(has_traversal_segment("../../.ssh/config"));
/// assert!(has_traversal_segment("agents\\..\\..\\x"));
/// assert!(!has_traversal_segment("agents/..hidden.md"));
/// ```
#[must_use]
pub fn has_traversal_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Resolves a manifest path against the managed root.
///
/// # Arguments
/// * `root` - The managed root (`<base>/.claude`)
/// * `relative` - The path exactly as stored in the manifest
///
/// # Returns
/// The absolute path inside `root`
///
/// # Errors
/// - [`KilnError::PathTraversal`] if `relative` contains a `..` segment
/// - [`KilnError::PathEscape`] if the joined path is not strictly inside `root`
///   (absolute entries, drive prefixes, or an entry naming the root itself)
pub fn resolve_managed_path(root: &Path, relative: &str) -> Result<PathBuf, KilnError> {
    if has_traversal_segment(relative) {
        return Err(KilnError::PathTraversal {
            path: relative.to_string(),
        });
    }

    let joined = lexically_normalize(&root.join(relative));
    let root = lexically_normalize(root);

    let mut prefix = root.to_string_lossy().into_owned();
    if !prefix.ends_with(std::path::MAIN_SEPARATOR) {
        prefix.push(std::path::MAIN_SEPARATOR);
    }

    if !joined.to_string_lossy().starts_with(&prefix) {
        return Err(KilnError::PathEscape {
            path: relative.to_string(),
        });
    }

    Ok(joined)
}

/// Drops `.` components without touching the filesystem.
fn lexically_normalize(path: &Path) -> PathBuf {
    path.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

/// Converts a path relative to the managed root into the form stored in the
/// manifest (forward slashes on every platform).
///
/// # Examples
///
/// ```rust
/// use kilntwo::utils::path_validation::normalize_path_for_storage;
/// use std::path::Path;
///
/// assert_eq!(normalize_path_for_storage(Path::new("agents/kiln-planner.md")), "agents/kiln-planner.md");
/// ```
#[must_use]
pub fn normalize_path_for_storage(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// The manifest form of `absolute`, relative to `root`.
///
/// Returns `None` when `absolute` is not under `root`.
#[must_use]
pub fn relative_to_root(root: &Path, absolute: &Path) -> Option<String> {
    absolute.strip_prefix(root).ok().map(normalize_path_for_storage)
}
