//! kilntwo - installer for the kiln coding-agent bundle
//!
//! kilntwo copies a bundle of agent assets (agent definitions, skills,
//! commands, hook scripts and templates) into a managed `.claude` directory,
//! records every file it owns in a manifest with a SHA-256 checksum, and uses
//! that manifest to update, uninstall and diagnose the installation without
//! ever touching files it does not own.
//!
//! # Architecture Overview
//!
//! - Install is the only writer of managed files. Update re-runs install and
//!   diffs the result against the previous manifest.
//! - Uninstall and strict doctor read the manifest, which is editable by
//!   anyone with access to the managed root, so every entry goes through the
//!   traversal guard in [`utils::path_validation`] before use.
//! - A file that exists and differs from the bundle is an operator edit: it
//!   is reported and left alone unless `force` is set.
//!
//! # Core Modules
//!
//! - [`installer`] - the install orchestrator and first-run project state
//! - [`update`] - the update orchestrator
//! - [`uninstall`] - the uninstall orchestrator
//! - [`doctor`] - environment and installation diagnostics
//!
//! ## Building Blocks
//! - [`manifest`] - manifest model, validation and checksums
//! - [`sync`] - conflict-aware file tree copy
//! - [`hooks`] - hooks document merge
//! - [`markers`] - managed block injection into the host document
//! - [`paths`] - canonical filesystem layout
//!
//! ## Supporting Modules
//! - [`cli`] - command-line interface
//! - [`config`] - configuration file and asset bundle lookup
//! - [`core`] - error types and asset categories
//! - [`constants`] - on-disk names, markers and version floors
//! - [`utils`] - filesystem helpers and the path guard
//!
//! # Example
//!
//! ```rust,no_run
//! use kilntwo::installer::{InstallOptions, install};
//! use kilntwo::uninstall::{UninstallOptions, uninstall};
//!
//! # fn example() -> anyhow::Result<()> {
//! let options = InstallOptions::new("/opt/kilntwo/assets")
//!     .with_home("/work/app")
//!     .with_project("/work/app");
//! let report = install(&options)?;
//! println!("{} files installed, {} skipped", report.installed.len(), report.skipped.len());
//!
//! uninstall(&UninstallOptions {
//!     home: Some("/work/app".into()),
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod doctor;
pub mod hooks;
pub mod installer;
pub mod manifest;
pub mod markers;
pub mod paths;
pub mod sync;
pub mod uninstall;
pub mod update;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
