//! Test utilities for kilntwo
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite:
//! - [`AssetBundleFixture`] - a temporary asset bundle, empty or standard
//! - [`WorkspaceFixture`] - a temporary home directory plus project directory
//! - [`init_test_logging`] - one-time tracing setup that writes to the test
//!   harness
//!
//! # Example
//!
//! ```rust,no_run
//! use kilntwo::installer::{InstallOptions, install};
//! use kilntwo::test_utils::{AssetBundleFixture, WorkspaceFixture};
//!
//! # fn example() -> anyhow::Result<()> {
//! let bundle = AssetBundleFixture::standard()?;
//! let workspace = WorkspaceFixture::new()?;
//!
//! let options = InstallOptions::new(bundle.path()).with_home(workspace.home());
//! let report = install(&options)?;
//! assert!(report.skipped.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::{AssetBundleFixture, STANDARD_HOOKS_JSON, STANDARD_MANAGED_PATHS, WorkspaceFixture};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honored, and without either nothing is logged.
///
/// ```bash
/// RUST_LOG=kilntwo=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
