//! Filesystem and path utilities shared by the orchestrators
//!
//! - [`fs`] - atomic writes, JSON documents, tolerant create/remove
//! - [`path_validation`] - the traversal guard applied to every manifest path

pub mod fs;
pub mod path_validation;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use path_validation::{has_traversal_segment, resolve_managed_path};
