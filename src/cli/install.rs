//! `kilntwo install`: copy the asset bundle into the managed root.
//!
//! # Examples
//!
//! ```bash
//! # Install into ./.claude for the current project
//! kilntwo install
//!
//! # Install into ~/.claude, seeding state for another project
//! kilntwo install --global --project ~/src/app
//!
//! # Overwrite managed files that were edited locally
//! kilntwo install --force
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{CommandContext, TargetArgs, print_paths, print_warnings};
use crate::config::resolve_assets_dir;
use crate::doctor::{CommandLocator, WhichLocator};
use crate::installer::{InstallOptions, InstallReport, ModelMode, install};

/// Options shared by install and update.
#[derive(Args, Debug, Clone, Default)]
pub struct BundleArgs {
    /// Overwrite managed files that differ from the bundle
    #[arg(short, long)]
    pub force: bool,

    /// Asset bundle directory (default: KILNTWO_ASSETS, the config file, or
    /// next to the executable)
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Record that agent teams are not used
    #[arg(long)]
    pub no_teams: bool,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl BundleArgs {
    /// Builds [`InstallOptions`] from the flags and the context.
    ///
    /// # Errors
    ///
    /// Fails when the asset bundle cannot be located or the current directory
    /// cannot be determined.
    pub fn install_options(&self, ctx: &CommandContext) -> Result<InstallOptions> {
        let assets_dir = resolve_assets_dir(self.assets.as_deref(), &ctx.config)?;
        let target = self.target.resolve(ctx.home.as_deref())?;

        let model_mode = if WhichLocator.locate("codex").is_some() {
            ModelMode::MultiModel
        } else {
            ModelMode::ClaudeOnly
        };

        let mut options = InstallOptions::new(assets_dir)
            .with_project(target.project)
            .with_force(self.force)
            .with_global(target.global)
            .with_model_mode(model_mode)
            .with_teams(!self.no_teams);
        options.home = target.base;
        Ok(options)
    }
}

/// Command to install the asset bundle.
#[derive(Args, Debug)]
pub struct InstallCommand {
    #[command(flatten)]
    bundle: BundleArgs,
}

impl InstallCommand {
    #[cfg(test)]
    pub(super) const fn bundle(&self) -> &BundleArgs {
        &self.bundle
    }

    /// Runs the install.
    ///
    /// # Errors
    ///
    /// Propagates every fatal error of [`install`].
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let options = self.bundle.install_options(ctx)?;
        let report = install(&options)?;
        if !ctx.quiet {
            print_install_summary(&options, &report);
        }
        Ok(())
    }
}

fn print_install_summary(options: &InstallOptions, report: &InstallReport) {
    println!("{}", "The kiln is lit".green().bold());
    println!("  {}", report.paths.claude_dir.display());

    let scope = if options.global { "global" } else { "project" };
    let teams = if options.use_teams { "teams" } else { "solo" };
    println!("  {}  ·  {}  ·  {}", options.model_mode, teams, scope);

    for category in &report.categories {
        println!(
            "  {:<10} {} copied, {} unchanged, {} conflicts",
            category.category.to_string(),
            category.report.copied(),
            category.report.identical(),
            category.report.conflicts()
        );
    }
    println!("  {:<10} {}", "hooks.json", report.hooks_status);
    if let Some(state) = &report.state {
        println!("  {:<10} {}", "project", state.project_type);
    }

    print_paths("Skipped (differs from the bundle, use --force)", &report.skipped);
    print_warnings(&report.warnings);
}
