//! `kilntwo update`: bring an existing installation up to the bundle.
//!
//! Deleted managed files are restored. Files edited locally are reported as
//! skipped and left alone unless `--force` is given. The project recorded in
//! the manifest receives the protocol block and state documents, whatever
//! `--project` says; `--project` only selects the managed root when
//! `--global` is not given.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, print_paths};
use super::install::BundleArgs;
use crate::update::{UpdateOutcome, update};

/// Command to update an installation.
#[derive(Args, Debug)]
pub struct UpdateCommand {
    #[command(flatten)]
    bundle: BundleArgs,
}

impl UpdateCommand {
    /// Runs the update.
    ///
    /// # Errors
    ///
    /// Propagates every fatal error of [`update`], including an invalid
    /// manifest.
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let options = self.bundle.install_options(ctx)?;
        let outcome = update(&options).await?;
        if ctx.quiet {
            return Ok(());
        }

        match outcome {
            UpdateOutcome::NotInstalled => {
                println!("{}", "kilntwo is not installed here; run `kilntwo install` first".yellow());
            }
            UpdateOutcome::UpToDate {
                version,
            } => {
                println!("{} (v{})", "Already up to date".green().bold(), version);
            }
            UpdateOutcome::Updated(summary) => {
                println!("{} v{} -> v{}", "Updated".green().bold(), summary.from, summary.to);
                println!(
                    "  {} updated, {} unchanged, {} skipped",
                    summary.updated.len(),
                    summary.unchanged.len(),
                    summary.skipped.len()
                );
                print_paths("Updated", &summary.updated);
                print_paths("Skipped (differs from the bundle, use --force)", &summary.skipped);
            }
        }
        Ok(())
    }
}
