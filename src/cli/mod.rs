//! Command-line interface for kilntwo.
//!
//! Each command lives in its own module with its own argument struct and an
//! `execute` method; this module holds the top-level parser, the global
//! flags and the dispatch.
//!
//! # Available Commands
//!
//! - `install` - copy the asset bundle into the managed root
//! - `update` - re-install and report what changed
//! - `uninstall` - remove every file the manifest lists
//! - `doctor` - diagnose the environment and the installation
//!
//! # Global Options
//!
//! - `--home <DIR>` (`KILNTWO_HOME`) - base directory used with `--global`
//! - `--config <FILE>` (`KILNTWO_CONFIG`) - configuration file
//! - `-v/--verbose` - debug logging
//! - `-q/--quiet` - errors only
//!
//! # Example
//!
//! ```bash
//! kilntwo install --project ~/src/app
//! kilntwo doctor --strict --project ~/src/app
//! kilntwo uninstall --project ~/src/app
//! ```

pub mod common;
mod doctor;
mod install;
mod uninstall;
mod update;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::config::KilnConfig;
use common::CommandContext;

/// Top-level parser.
#[derive(Parser, Debug)]
#[command(
    name = "kilntwo",
    about = "Install, update, uninstall and diagnose the kiln agent bundle",
    version,
    long_about = "kilntwo manages a bundle of coding-agent assets (agents, skills, commands, hooks and templates) \
                  inside a .claude directory, tracking every file it owns in a manifest."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Base directory used instead of the home directory with --global
    #[arg(long, global = true, env = "KILNTWO_HOME", value_name = "DIR")]
    home: Option<PathBuf>,

    /// Configuration file (default: ~/.kilntwo/config.toml)
    #[arg(long, global = true, env = "KILNTWO_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install the asset bundle.
    ///
    /// Files that already exist and differ from the bundle are left alone
    /// and reported, unless --force is given.
    Install(install::InstallCommand),

    /// Update an existing installation, restoring deleted files.
    Update(update::UpdateCommand),

    /// Remove every file recorded in the manifest.
    Uninstall(uninstall::UninstallCommand),

    /// Check the environment and the installation. Exits 1 when a check fails.
    Doctor(doctor::DoctorCommand),
}

impl Cli {
    /// Log filter implied by `--verbose` / `--quiet`; `RUST_LOG` overrides it.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Runs the selected command.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error of the command. A doctor report that is
    /// not ok is not an error; it yields exit code 1.
    pub async fn execute(self) -> Result<ExitCode> {
        let config = KilnConfig::load_with_optional(self.config.clone()).await?;
        debug!("Loaded configuration: {:?}", config);

        let ctx = CommandContext {
            home: self.home,
            config,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Install(cmd) => cmd.execute(&ctx)?,
            Commands::Update(cmd) => cmd.execute(&ctx).await?,
            Commands::Uninstall(cmd) => cmd.execute(&ctx)?,
            Commands::Doctor(cmd) => {
                if !cmd.execute(&ctx)? {
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Ok(ExitCode::SUCCESS)
    }
}
