//! Integration test suite for kilntwo
//!
//! End-to-end tests driving the public orchestrators and the `kilntwo`
//! binary against temporary directories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **install**: fresh install, reinstall, conflicts, project state
//! - **update**: restoring deleted files, preserving edits, up-to-date runs
//! - **uninstall**: removal, pruning, host document cleanup
//! - **doctor**: report contents and strict checksum verification
//! - **security**: tampered manifests rejected by every reader
//! - **hooks**: hooks document merging on disk
//! - **cli**: the binary, via `assert_cmd`

mod cli;
mod doctor;
mod hooks;
mod install;
mod security;
mod uninstall;
mod update;
