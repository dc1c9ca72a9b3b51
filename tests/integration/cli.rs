//! The `kilntwo` binary end to end.

use assert_cmd::Command;
use kilntwo::test_utils::{AssetBundleFixture, WorkspaceFixture};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

fn kilntwo(workspace: &WorkspaceFixture) -> Command {
    let mut cmd = Command::cargo_bin("kilntwo").unwrap();
    cmd.env_remove("KILNTWO_ASSETS")
        .env_remove("KILNTWO_HOME")
        .env_remove("RUST_LOG")
        .env("KILNTWO_CONFIG", workspace.home().join("no-config.toml"))
        .current_dir(workspace.project());
    cmd
}

#[test]
fn test_install_doctor_uninstall() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    let project = workspace.project();

    kilntwo(&workspace)
        .arg("install")
        .arg("--assets")
        .arg(bundle.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("The kiln is lit"));

    // project-local install: the project is the base
    assert!(project.join(".claude/agents/kiln-planner.md").exists());
    assert!(project.join(".claude/kilntwo/manifest.json").exists());
    assert!(project.join("CLAUDE.md").exists());
    assert!(project.join(".kiln/STATE.md").exists());

    let output = kilntwo(&workspace).args(["doctor", "--strict", "--json"]).output().unwrap();
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let checksums = report["checks"].as_array().unwrap().iter().find(|c| c["name"] == "checksums").unwrap();
    assert_eq!(checksums["status"], "pass");
    assert_eq!(output.status.success(), report["ok"].as_bool().unwrap());

    kilntwo(&workspace)
        .arg("uninstall")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!project.join(".claude/agents").exists());
    assert!(!project.join(".claude/kilntwo/manifest.json").exists());
}

#[test]
fn test_global_install_uses_home() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();

    kilntwo(&workspace)
        .args(["install", "--global", "--quiet", "--home"])
        .arg(workspace.home())
        .arg("--assets")
        .arg(bundle.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(workspace.claude_dir().join("agents/kiln-planner.md").exists());
    assert!(!workspace.project().join(".claude/agents").exists());
    // state and protocol still go to the project
    assert!(workspace.project().join(".kiln/config.json").exists());
}

#[test]
fn test_assets_from_environment() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();

    kilntwo(&workspace).env("KILNTWO_ASSETS", bundle.path()).arg("install").assert().success();

    assert!(workspace.project().join(".claude/commands/kiln/fire.md").exists());
}

#[test]
fn test_assets_from_config_file() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    let config = workspace.home().join("config.toml");
    fs::write(&config, format!("assets_dir = {:?}\n", bundle.path().display().to_string())).unwrap();

    kilntwo(&workspace).arg("--config").arg(&config).arg("install").assert().success();

    assert!(workspace.project().join(".claude/commands/kiln/fire.md").exists());
}

#[test]
fn test_missing_assets_exits_1() {
    let workspace = WorkspaceFixture::new().unwrap();

    kilntwo(&workspace)
        .arg("install")
        .arg("--assets")
        .arg(workspace.home().join("missing"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Asset bundle not found"));
}

#[test]
fn test_update_reports_restored_file() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    kilntwo(&workspace).arg("install").arg("--assets").arg(bundle.path()).assert().success();
    fs::remove_file(workspace.project().join(".claude/agents/kiln-reviewer.md")).unwrap();

    kilntwo(&workspace)
        .arg("update")
        .arg("--assets")
        .arg(bundle.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 updated"));

    kilntwo(&workspace)
        .arg("update")
        .arg("--assets")
        .arg(bundle.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date"));
}

#[test]
fn test_update_with_relative_home_is_idempotent() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    let global = |cmd: &str| {
        let mut c = kilntwo(&workspace);
        c.args([cmd, "--global", "--home", "./h", "--assets"]).arg(bundle.path());
        c
    };

    global("install").assert().success();
    assert!(workspace.project().join("h/.claude/agents/kiln-planner.md").exists());

    global("update").assert().success().stdout(predicate::str::contains("Already up to date"));
    fs::remove_file(workspace.project().join("h/.claude/agents/kiln-planner.md")).unwrap();
    global("update").assert().success().stdout(predicate::str::contains("1 updated"));
    global("update").assert().success().stdout(predicate::str::contains("Already up to date"));
}

#[test]
fn test_uninstall_without_install() {
    let workspace = WorkspaceFixture::new().unwrap();

    kilntwo(&workspace)
        .arg("uninstall")
        .assert()
        .success()
        .stdout(predicate::str::contains("not installed"));
}

#[test]
fn test_poisoned_manifest_fails_everywhere() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    let manifest_path = workspace.project().join(".claude/kilntwo/manifest.json");
    fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
    fs::write(
        &manifest_path,
        r#"{"manifestVersion":1,"kilnVersion":"0.1.0","installedAt":"x",
            "files":[{"path":"../../etc/passwd","checksum":"sha256:00"}],
            "protocolMarkers":{"begin":"b","end":"e"}}"#,
    )
    .unwrap();

    kilntwo(&workspace)
        .arg("uninstall")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("path traversal"));
    kilntwo(&workspace).arg("update").arg("--assets").arg(bundle.path()).assert().code(1);
    kilntwo(&workspace)
        .args(["doctor", "--strict"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("manifest is invalid"));
    assert!(manifest_path.exists());
}
