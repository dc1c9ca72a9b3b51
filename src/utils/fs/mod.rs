//! File system utilities
//!
//! - **Atomic writes** for every JSON document kilntwo rewrites
//! - **Idempotent removal**: deleting something already gone is success
//! - **Tolerant creation**: creating a directory that exists is success
//!
//! # Examples
//!
//! ```rust,no_run
//! use kilntwo::utils::fs::{ensure_dir, remove_file_if_exists, safe_write};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("output/agents"))?;
//! safe_write(Path::new("output/agents/a.md"), "# Agent")?;
//! remove_file_if_exists(Path::new("output/agents/a.md"))?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod formats;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_dir, ensure_parent_dir, remove_dir_if_empty, remove_file_if_exists};
pub use formats::{read_json_file, to_pretty_json, write_json_file};
