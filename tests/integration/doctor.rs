//! Doctor against real installations.

use kilntwo::doctor::{CheckStatus, CommandLocator, DoctorOptions, doctor};
use kilntwo::installer::{InstallOptions, install};
use kilntwo::test_utils::{AssetBundleFixture, WorkspaceFixture};
use std::path::PathBuf;

struct Everything;

impl CommandLocator for Everything {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/usr/local/bin").join(name))
    }
}

struct Nothing;

impl CommandLocator for Nothing {
    fn locate(&self, _name: &str) -> Option<PathBuf> {
        None
    }
}

fn options(workspace: &WorkspaceFixture, strict: bool) -> DoctorOptions {
    DoctorOptions {
        home: Some(workspace.home()),
        strict,
        ..DoctorOptions::default()
    }
}

#[test]
fn test_every_check_runs_in_order() {
    let workspace = WorkspaceFixture::new().unwrap();

    let report = doctor(&options(&workspace, true), &Nothing).unwrap();

    let names: Vec<&str> = report.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "tool-version",
            "claude-cli",
            "codex-cli",
            "git-cli",
            "claude-dir",
            "teams-enabled",
            "manifest",
            "checksums"
        ]
    );
    assert!(!report.ok);
}

#[test]
fn test_configured_clis_replace_defaults() {
    let workspace = WorkspaceFixture::new().unwrap();
    let options = DoctorOptions {
        required_clis: vec!["git".to_string()],
        ..options(&workspace, false)
    };

    let report = doctor(&options, &Everything).unwrap();

    assert!(report.check("git-cli").is_some());
    assert!(report.check("claude-cli").is_none());
}

#[test]
fn test_installed_bundle_newer_than_tool_warns() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install(&InstallOptions::new(bundle.path()).with_home(workspace.home()).with_bundle_version("99.0.0")).unwrap();

    let report = doctor(&options(&workspace, true), &Everything).unwrap();

    assert_eq!(report.check("tool-version").unwrap().status, CheckStatus::Warn);
    assert_eq!(report.check("checksums").unwrap().status, CheckStatus::Pass);
    assert!(report.ok);
}

#[test]
fn test_json_shape() {
    let workspace = WorkspaceFixture::new().unwrap();

    let report = doctor(&options(&workspace, false), &Everything).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["ok"], false);
    let first = &json["checks"][0];
    assert!(first["name"].is_string());
    assert!(["pass", "warn", "fail"].contains(&first["status"].as_str().unwrap()));
    assert!(first["message"].is_string());
}
