//! `kilntwo doctor`: diagnose the environment and the installation.
//!
//! Exits 1 when any check fails. `--json` prints the report as
//! `{"ok": bool, "checks": [{"name", "status", "message"}]}`.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::common::{CommandContext, TargetArgs};
use crate::doctor::{CheckStatus, DoctorOptions, DoctorReport, WhichLocator, doctor};

/// Command to run diagnostics.
#[derive(Args, Debug)]
pub struct DoctorCommand {
    /// Also verify every managed file against its recorded checksum
    #[arg(long)]
    strict: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    target: TargetArgs,
}

impl DoctorCommand {
    /// Runs the checks and returns whether the report is ok.
    ///
    /// # Errors
    ///
    /// Fails only when the base directory cannot be resolved or the report
    /// cannot be serialized.
    pub fn execute(self, ctx: &CommandContext) -> Result<bool> {
        let target = self.target.resolve(ctx.home.as_deref())?;
        let options = DoctorOptions {
            home: target.base,
            strict: self.strict,
            required_clis: ctx.config.required_clis.clone(),
            ..DoctorOptions::default()
        };
        let report = doctor(&options, &WhichLocator)?;

        if self.json {
            let json = serde_json::to_string_pretty(&report).context("Failed to serialize doctor report")?;
            println!("{json}");
        } else if !ctx.quiet || !report.ok {
            print_report(&report);
        }
        Ok(report.ok)
    }
}

fn print_report(report: &DoctorReport) {
    for check in &report.checks {
        let status = match check.status {
            CheckStatus::Pass => "pass".green(),
            CheckStatus::Warn => "warn".yellow(),
            CheckStatus::Fail => "fail".red().bold(),
        };
        println!("  [{}] {:<14} {}", status, check.name, check.message);
    }
    println!();
    if report.ok {
        println!("{}", "All required checks passed".green().bold());
    } else {
        println!("{}", "Some checks failed".red().bold());
    }
}
