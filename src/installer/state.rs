//! First-run project state.
//!
//! Besides the managed tree, install seeds a few documents into the project
//! the first time it runs against it:
//!
//! ```text
//! <project>/.kiln/
//! ├── docs/{TECH_STACK,PATTERNS,DECISIONS,PITFALLS}.md   empty living docs
//! ├── tracks/
//! ├── config.json                                         from config.json.tmpl
//! └── STATE.md                                            from STATE.md.tmpl
//! <base>/.claude/projects/<encoded>/memory/MEMORY.md      from MEMORY.md
//! ```
//!
//! These belong to the operator as soon as they are written. Nothing here
//! ever overwrites an existing file, and none of them are listed in the
//! manifest, so uninstall leaves them alone.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::LIVING_DOCS;
use crate::paths::project_state_dir;
use crate::utils::fs::{ensure_dir, safe_write, write_json_file};

/// Which agent CLIs the project is set up to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelMode {
    /// Only the host CLI
    #[default]
    ClaudeOnly,
    /// The host CLI plus a second model CLI
    MultiModel,
}

impl std::fmt::Display for ModelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClaudeOnly => write!(f, "claude-only"),
            Self::MultiModel => write!(f, "multi-model"),
        }
    }
}

/// Project commands discovered from `package.json` scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTooling {
    /// `test`
    pub test_runner: Option<String>,
    /// `lint`
    pub linter: Option<String>,
    /// `typecheck`, else `check`
    pub type_checker: Option<String>,
    /// `build`
    pub build_system: Option<String>,
    /// `start`, else `dev`
    pub start_command: Option<String>,
}

/// Inputs of [`initialize_project_state`].
#[derive(Debug, Clone)]
pub struct StateOptions<'a> {
    /// Project root
    pub project: &'a Path,
    /// `templates/` directory of the asset bundle
    pub templates_dir: &'a Path,
    /// Project memory directory under the managed root
    pub memory_dir: &'a Path,
    /// Recorded in `config.json`
    pub model_mode: ModelMode,
    /// Recorded in `config.json` as `preferences.useTeams`
    pub use_teams: bool,
}

/// What [`initialize_project_state`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateReport {
    /// Files written by this run
    pub created: Vec<PathBuf>,
    /// Files that already existed and were kept
    pub preserved: Vec<PathBuf>,
    /// Detected project type
    pub project_type: String,
    /// Non-fatal problems
    pub warnings: Vec<String>,
}

/// Guesses the project type from marker files in its root.
///
/// The first match wins; no marker means `greenfield`.
#[must_use]
pub fn detect_project_type(project: &Path) -> &'static str {
    const MARKERS: &[(&str, &str)] = &[
        ("package.json", "node"),
        ("Cargo.toml", "rust"),
        ("go.mod", "go"),
        ("pyproject.toml", "python"),
        ("requirements.txt", "python"),
        ("Gemfile", "ruby"),
        ("pom.xml", "java"),
        ("build.gradle", "java"),
        ("Makefile", "c-cpp"),
    ];

    MARKERS
        .iter()
        .find(|(file, _)| project.join(file).exists())
        .map_or("greenfield", |&(_, kind)| kind)
}

/// Reads tooling commands from `<project>/package.json` scripts.
///
/// A missing or unparseable `package.json` yields no commands.
#[must_use]
pub fn detect_tooling(project: &Path) -> ProjectTooling {
    let Ok(content) = fs::read_to_string(project.join("package.json")) else {
        return ProjectTooling::default();
    };
    let Ok(package) = serde_json::from_str::<Value>(&content) else {
        return ProjectTooling::default();
    };

    let script = |name: &str| {
        package
            .get("scripts")
            .and_then(|s| s.get(name))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    };

    ProjectTooling {
        test_runner: script("test"),
        linter: script("lint"),
        type_checker: script("typecheck").or_else(|| script("check")),
        build_system: script("build"),
        start_command: script("start").or_else(|| script("dev")),
    }
}

/// Replaces every `{{key}}` in `template` with its value.
///
/// Placeholders without a value are left as they are.
///
/// # Examples
///
/// ```rust
/// use kilntwo::installer::state::render_template;
///
/// let out = render_template("# {{project_name}} ({{step}})", &[("project_name", "app".to_string())]);
/// assert_eq!(out, "# app ({{step}})");
/// ```
#[must_use]
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |out, (key, value)| out.replace(&format!("{{{{{key}}}}}"), value))
}

/// Warns about ignore rules that would keep kilntwo's trees out of version
/// control. The ignore file itself is never modified.
///
/// `.kiln` is always checked; `.claude` only for project-local installs,
/// where the managed root lives inside the project.
#[must_use]
pub fn check_gitignore(project: &Path, global: bool) -> Vec<String> {
    let gitignore = project.join(".gitignore");
    let Ok(content) = fs::read_to_string(&gitignore) else {
        return Vec::new();
    };

    let ignores = |name: &str| {
        content.lines().map(str::trim).any(|line| line == name || line == format!("{name}/"))
    };

    let mut warnings = Vec::new();
    if ignores(".kiln") {
        warnings.push(format!(
            "{} ignores .kiln; remove this rule because .kiln/ should be committed",
            gitignore.display()
        ));
    }
    if !global && ignores(".claude") {
        warnings.push(format!(
            "{} ignores .claude; installed agent assets will not be committed",
            gitignore.display()
        ));
    }
    for warning in &warnings {
        warn!("{}", warning);
    }
    warnings
}

fn write_if_absent(path: &Path, content: &str, report: &mut StateReport) -> Result<()> {
    if path.exists() {
        debug!("Existing file preserved: {}", path.display());
        report.preserved.push(path.to_path_buf());
        return Ok(());
    }
    safe_write(path, content)?;
    report.created.push(path.to_path_buf());
    Ok(())
}

fn build_config(options: &StateOptions<'_>, project_type: &str, report: &mut StateReport) -> Value {
    let template_path = options.templates_dir.join("config.json.tmpl");
    let mut config = match fs::read_to_string(&template_path).map(|c| serde_json::from_str::<Value>(&c)) {
        Ok(Ok(Value::Object(map))) => map,
        Ok(_) | Err(_) => {
            report
                .warnings
                .push(format!("Could not read config template, starting from an empty config: {}", template_path.display()));
            Map::new()
        }
    };

    config.insert("projectType".to_string(), Value::String(project_type.to_string()));
    config.insert("modelMode".to_string(), Value::String(options.model_mode.to_string()));
    config.insert(
        "tooling".to_string(),
        serde_json::to_value(detect_tooling(options.project)).unwrap_or(Value::Null),
    );

    let preferences = config.entry("preferences").or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(preferences) = preferences {
        preferences.insert("useTeams".to_string(), Value::Bool(options.use_teams));
    }

    Value::Object(config)
}

fn state_values(project: &Path, model_mode: ModelMode) -> Vec<(&'static str, String)> {
    let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let project_name = project
        .file_name()
        .map_or_else(|| project.display().to_string(), |n| n.to_string_lossy().into_owned());

    vec![
        ("project_name", project_name),
        ("model_mode", model_mode.to_string()),
        ("init_timestamp", now.clone()),
        ("current_phase_number", "1".to_string()),
        ("current_phase_title", "Initialization".to_string()),
        ("current_step", "plan".to_string()),
        ("step_status", "pending".to_string()),
        ("step_started_timestamp", now.clone()),
        ("mini_verify_retries", "0".to_string()),
        ("e2e_cycles", "0".to_string()),
        ("review_cycles", "0".to_string()),
        ("regression_test_count", "0".to_string()),
        ("completed_phases_count", "0".to_string()),
        ("last_activity_timestamp", now),
        ("last_completed_action", "none".to_string()),
        ("next_expected_action", "Run /kiln:fire".to_string()),
    ]
}

/// Seeds the project state documents and the project memory file.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be created. Missing
/// templates only produce warnings.
pub fn initialize_project_state(options: &StateOptions<'_>) -> Result<StateReport> {
    let mut report = StateReport::default();
    let state_dir = project_state_dir(options.project);
    let docs_dir = state_dir.join("docs");

    ensure_dir(&docs_dir)?;
    ensure_dir(&state_dir.join("tracks"))?;

    for doc in LIVING_DOCS {
        let path = docs_dir.join(doc);
        if !path.exists() {
            safe_write(&path, "")?;
            report.created.push(path);
        }
    }

    let project_type = detect_project_type(options.project);
    report.project_type = project_type.to_string();

    let config_path = state_dir.join("config.json");
    if config_path.exists() {
        debug!("Existing file preserved: {}", config_path.display());
        report.preserved.push(config_path.clone());
    } else {
        let config = build_config(options, project_type, &mut report);
        write_json_file(&config_path, &config)?;
        report.created.push(config_path);
    }

    let state_template = options.templates_dir.join("STATE.md.tmpl");
    match fs::read_to_string(&state_template) {
        Ok(template) => {
            let rendered = render_template(&template, &state_values(options.project, options.model_mode));
            write_if_absent(&state_dir.join("STATE.md"), &rendered, &mut report)?;
        }
        Err(e) => {
            report
                .warnings
                .push(format!("Missing state template {}: {}", state_template.display(), e));
        }
    }

    let memory_template = options.templates_dir.join("MEMORY.md");
    match fs::read_to_string(&memory_template) {
        Ok(template) => {
            ensure_dir(options.memory_dir)
                .with_context(|| format!("Failed to create memory directory: {}", options.memory_dir.display()))?;
            write_if_absent(&options.memory_dir.join("MEMORY.md"), &template, &mut report)?;
        }
        Err(e) => {
            report
                .warnings
                .push(format!("Missing memory template {}: {}", memory_template.display(), e));
        }
    }

    debug!(
        "Project state in {}: {} created, {} preserved",
        state_dir.display(),
        report.created.len(),
        report.preserved.len()
    );
    Ok(report)
}
