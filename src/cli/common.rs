//! Pieces shared by every command: target selection and output helpers.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::KilnConfig;

/// Where a command operates.
///
/// Without `--global` the project directory (default: the current directory)
/// is also the base, so the managed root is `<project>/.claude`. With
/// `--global` the base is the user's home, or `--home` when given.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Use the user-wide managed root (~/.claude) instead of the project's
    #[arg(long)]
    pub global: bool,

    /// Project directory (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub project: Option<PathBuf>,
}

/// Settings every command receives from the top-level parser.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    /// `--home` / `KILNTWO_HOME`
    pub home: Option<PathBuf>,
    /// The loaded configuration file
    pub config: KilnConfig,
    /// `--quiet`
    pub quiet: bool,
}

/// A resolved [`TargetArgs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Base directory override; `None` means the user's home
    pub base: Option<PathBuf>,
    /// The absolute project directory
    pub project: PathBuf,
    /// `--global` was given
    pub global: bool,
}

impl TargetArgs {
    /// Resolves the base directory and project directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn resolve(&self, home: Option<&Path>) -> Result<Target> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Ok(self.resolve_from(home, &cwd))
    }

    /// [`TargetArgs::resolve`] relative to an explicit working directory.
    #[must_use]
    pub fn resolve_from(&self, home: Option<&Path>, cwd: &Path) -> Target {
        let project = match &self.project {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => cwd.join(p),
            None => cwd.to_path_buf(),
        };
        let base = if self.global {
            home.map(Path::to_path_buf)
        } else {
            Some(project.clone())
        };
        Target {
            base,
            project,
            global: self.global,
        }
    }
}

/// Prints a section of warnings, if any.
pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    for warning in warnings {
        println!("  {} {}", "!".yellow().bold(), warning);
    }
}

/// Prints a list of paths under a heading, skipping empty lists.
pub fn print_paths(heading: &str, paths: &[PathBuf]) {
    if paths.is_empty() {
        return;
    }
    println!("  {heading}:");
    for path in paths {
        println!("    {}", path.display());
    }
}
