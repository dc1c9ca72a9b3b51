//! `kilntwo uninstall`: remove every file the manifest lists.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, TargetArgs, print_paths};
use crate::uninstall::{UninstallOptions, UninstallOutcome, uninstall};

/// Command to uninstall.
#[derive(Args, Debug)]
pub struct UninstallCommand {
    #[command(flatten)]
    target: TargetArgs,
}

impl UninstallCommand {
    /// Runs the uninstall.
    ///
    /// # Errors
    ///
    /// Propagates every fatal error of [`uninstall`]; a manifest entry
    /// pointing outside the managed root aborts before anything is deleted.
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let target = self.target.resolve(ctx.home.as_deref())?;
        let outcome = uninstall(&UninstallOptions {
            home: target.base,
        })?;
        if ctx.quiet {
            return Ok(());
        }

        match outcome {
            UninstallOutcome::NotInstalled => {
                println!("{}", "kilntwo is not installed here; nothing to remove".yellow());
            }
            UninstallOutcome::Removed(summary) => {
                println!(
                    "{} {} file(s), {} already gone",
                    "Removed".green().bold(),
                    summary.removed.len(),
                    summary.not_found.len()
                );
                if let Some(host_document) = &summary.protocol_removed_from {
                    println!("  protocol block removed from {}", host_document.display());
                }
                print_paths("Already gone", &summary.not_found);
            }
        }
        Ok(())
    }
}
