//! Environment diagnostics.
//!
//! [`doctor`] runs every check, unlike install, and collects the results into
//! a [`DoctorReport`]. A failing check never stops the following ones; the
//! report is `ok` only when no check failed. Warnings are informational.
//!
//! | check | pass | warn | fail |
//! |-------|------|------|------|
//! | `tool-version` | at or above the floor | older than the installed bundle | below the floor |
//! | `<cli>-cli` | found on `PATH` | | not found |
//! | `claude-dir` | exists and writable | | missing or read-only |
//! | `teams-enabled` | `teams` set in settings | anything else | |
//! | `manifest` | valid | absent | invalid |
//! | `checksums` (strict) | all match | absent, or mismatches | invalid or escaping entry |
//!
//! Executable lookup goes through [`CommandLocator`] so tests can decide which
//! tools "exist".

use anyhow::Result;
use semver::Version;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{DEFAULT_REQUIRED_CLIS, MINIMUM_TOOL_VERSION, bundle_version};
use crate::core::KilnError;
use crate::manifest::checksum::is_not_found;
use crate::manifest::{ManifestState, read_manifest, validate, verify_checksum};
use crate::paths::KilnPaths;
use crate::utils::path_validation::resolve_managed_path;

/// Finds executables by name.
pub trait CommandLocator {
    /// Full path to `name`, if it can be found.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// [`CommandLocator`] backed by a `PATH` search.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhichLocator;

impl CommandLocator for WhichLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

/// Result of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// Healthy
    Pass,
    /// Worth knowing, not fatal
    Warn,
    /// Makes the report not ok
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// One named diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    /// Stable identifier, e.g. `claude-dir`
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
    /// Human-readable detail
    pub message: String,
}

impl Check {
    fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
        }
    }
}

/// Result of [`doctor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorReport {
    /// No check failed
    pub ok: bool,
    /// Every check in the order it ran
    pub checks: Vec<Check>,
}

impl DoctorReport {
    /// The check called `name`.
    #[must_use]
    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Inputs of [`doctor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorOptions {
    /// Base directory override; the user's home when `None`
    pub home: Option<PathBuf>,
    /// Also verify every manifest entry's checksum
    pub strict: bool,
    /// Executables that must be on `PATH`
    pub required_clis: Vec<String>,
    /// Version of the running tool
    pub tool_version: String,
}

impl Default for DoctorOptions {
    fn default() -> Self {
        Self {
            home: None,
            strict: false,
            required_clis: DEFAULT_REQUIRED_CLIS.iter().map(ToString::to_string).collect(),
            tool_version: bundle_version(),
        }
    }
}

/// Runs every check.
///
/// # Errors
///
/// Only fails when the base directory cannot be resolved; every problem with
/// the installation itself, an unreadable manifest included, is reported as a
/// check.
pub fn doctor(options: &DoctorOptions, locator: &dyn CommandLocator) -> Result<DoctorReport> {
    let paths = KilnPaths::resolve(options.home.as_deref())?;
    let manifest = read_manifest(&paths.manifest_path).map_err(|e| {
        debug!("Cannot read manifest: {:#}", e);
        format!("{e:#}")
    });
    let absent = ManifestState::Absent;
    let readable = manifest.as_ref().unwrap_or(&absent);

    let mut checks = vec![check_tool_version(&options.tool_version, readable)];
    checks.extend(options.required_clis.iter().map(|cli| check_cli(cli, locator)));
    checks.push(check_claude_dir(&paths.claude_dir));
    checks.push(check_teams(&paths.settings_path));
    checks.push(match &manifest {
        Ok(state) => check_manifest(state),
        Err(e) => Check::new("manifest", CheckStatus::Fail, format!("cannot read manifest: {e}")),
    });
    if options.strict {
        checks.push(match &manifest {
            Ok(state) => check_checksums(&paths.claude_dir, state),
            Err(e) => Check::new("checksums", CheckStatus::Fail, format!("skipped: cannot read manifest: {e}")),
        });
    }

    let ok = checks.iter().all(|c| c.status != CheckStatus::Fail);
    debug!("Doctor ran {} checks, ok = {}", checks.len(), ok);
    Ok(DoctorReport {
        ok,
        checks,
    })
}

fn check_tool_version(tool_version: &str, manifest: &ManifestState) -> Check {
    const NAME: &str = "tool-version";

    let Ok(current) = Version::parse(tool_version) else {
        return Check::new(NAME, CheckStatus::Fail, format!("cannot parse tool version {tool_version}"));
    };
    if let Ok(floor) = Version::parse(MINIMUM_TOOL_VERSION)
        && current < floor
    {
        return Check::new(
            NAME,
            CheckStatus::Fail,
            format!("kilntwo v{current} is below the required v{floor}"),
        );
    }

    let installed = match manifest {
        ManifestState::Present(raw) => raw.get("kilnVersion").and_then(Value::as_str),
        ManifestState::Absent => None,
    };
    if let Some(installed) = installed.and_then(|v| Version::parse(v).ok())
        && current < installed
    {
        return Check::new(
            NAME,
            CheckStatus::Warn,
            format!("kilntwo v{current} is older than the installed bundle v{installed}"),
        );
    }

    Check::new(NAME, CheckStatus::Pass, format!("kilntwo v{current} (>= v{MINIMUM_TOOL_VERSION})"))
}

fn cli_hint(cli: &str) -> Option<&'static str> {
    match cli {
        "claude" => Some("install via npm i -g @anthropic-ai/claude-code"),
        "codex" => Some("install via npm i -g @openai/codex"),
        "git" => Some("pipeline requires git for branch management"),
        _ => None,
    }
}

fn check_cli(cli: &str, locator: &dyn CommandLocator) -> Check {
    let name = format!("{cli}-cli");
    match locator.locate(cli) {
        Some(path) => {
            debug!("Found {} at {}", cli, path.display());
            Check::new(name, CheckStatus::Pass, format!("{cli} CLI found"))
        }
        None => {
            let message = match cli_hint(cli) {
                Some(hint) => format!("{cli} CLI not found: {hint}"),
                None => format!("{cli} CLI not found on PATH"),
            };
            Check::new(name, CheckStatus::Fail, message)
        }
    }
}

fn check_claude_dir(claude_dir: &Path) -> Check {
    const NAME: &str = "claude-dir";

    if !claude_dir.is_dir() {
        return Check::new(NAME, CheckStatus::Fail, format!("{} is missing", claude_dir.display()));
    }
    match tempfile::NamedTempFile::new_in(claude_dir) {
        Ok(_) => Check::new(NAME, CheckStatus::Pass, format!("{} exists and is writable", claude_dir.display())),
        Err(e) => {
            debug!("Write probe in {} failed: {}", claude_dir.display(), e);
            Check::new(NAME, CheckStatus::Fail, format!("{} is not writable", claude_dir.display()))
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn check_teams(settings_path: &Path) -> Check {
    const NAME: &str = "teams-enabled";

    let teams = fs::read_to_string(settings_path)
        .ok()
        .and_then(|content| serde_json::from_str::<Value>(&content).ok())
        .and_then(|settings| settings.get("teams").map(is_truthy));

    if teams == Some(true) {
        Check::new(NAME, CheckStatus::Pass, "teams settings found")
    } else {
        Check::new(
            NAME,
            CheckStatus::Warn,
            format!("{} not found or teams not configured (non-fatal)", settings_path.display()),
        )
    }
}

fn check_manifest(manifest: &ManifestState) -> Check {
    const NAME: &str = "manifest";

    match manifest {
        ManifestState::Absent => {
            Check::new(NAME, CheckStatus::Warn, "manifest not found: run kilntwo install first")
        }
        ManifestState::Present(raw) => {
            let validation = validate(raw);
            if validation.valid {
                Check::new(NAME, CheckStatus::Pass, "manifest found and valid")
            } else {
                Check::new(
                    NAME,
                    CheckStatus::Fail,
                    format!("manifest is invalid: {}", validation.errors.join("; ")),
                )
            }
        }
    }
}

fn check_checksums(claude_dir: &Path, manifest: &ManifestState) -> Check {
    const NAME: &str = "checksums";

    let ManifestState::Present(raw) = manifest else {
        return Check::new(NAME, CheckStatus::Warn, "manifest not found: skipping checksum verification");
    };
    let validation = validate(raw);
    if !validation.valid {
        return Check::new(
            NAME,
            CheckStatus::Fail,
            format!("skipped: manifest is invalid: {}", validation.errors.join("; ")),
        );
    }

    let files = raw.get("files").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
    let total = files.len();
    let mut mismatches = 0;

    for file in files {
        let relative = file.get("path").and_then(Value::as_str).unwrap_or_default();
        let expected = file.get("checksum").and_then(Value::as_str).unwrap_or_default();

        let absolute = match resolve_managed_path(claude_dir, relative) {
            Ok(absolute) => absolute,
            Err(e @ (KilnError::PathEscape { .. } | KilnError::PathTraversal { .. })) => {
                debug!("Checksum check rejected entry: {}", e);
                return Check::new(NAME, CheckStatus::Fail, format!("path escapes managed root: {relative}"));
            }
            Err(e) => {
                return Check::new(NAME, CheckStatus::Fail, e.to_string());
            }
        };

        match verify_checksum(&absolute, expected) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Checksum mismatch: {}", absolute.display());
                mismatches += 1;
            }
            Err(e) if is_not_found(&e) => {
                debug!("Managed file is missing: {}", absolute.display());
                mismatches += 1;
            }
            Err(e) => {
                debug!("Cannot checksum {}: {:#}", absolute.display(), e);
                mismatches += 1;
            }
        }
    }

    if mismatches == 0 {
        Check::new(NAME, CheckStatus::Pass, format!("all {total} file(s) match their checksums"))
    } else {
        Check::new(
            NAME,
            CheckStatus::Warn,
            format!("{mismatches} of {total} file(s) have checksum mismatches"),
        )
    }
}
