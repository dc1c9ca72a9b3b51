//! Tampered manifests must never lead to reads or writes outside the managed
//! root.

use kilntwo::core::KilnError;
use kilntwo::doctor::{CheckStatus, CommandLocator, DoctorOptions, doctor};
use kilntwo::installer::InstallOptions;
use kilntwo::test_utils::{AssetBundleFixture, WorkspaceFixture};
use kilntwo::uninstall::{UninstallOptions, uninstall};
use kilntwo::update::update;
use std::fs;
use std::path::PathBuf;

struct Everything;

impl CommandLocator for Everything {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        Some(PathBuf::from("/bin").join(name))
    }
}

fn poison(workspace: &WorkspaceFixture, entry: &str) {
    let manifest = serde_json::json!({
        "manifestVersion": 1,
        "kilnVersion": "0.1.0",
        "installedAt": "2026-01-01T00:00:00Z",
        "files": [
            { "path": "agents/kiln-planner.md", "checksum": "sha256:00" },
            { "path": entry, "checksum": "sha256:00" }
        ],
        "protocolMarkers": { "begin": "<!-- b -->", "end": "<!-- e -->" }
    });
    workspace
        .write_managed("kilntwo/manifest.json", &serde_json::to_string_pretty(&manifest).unwrap())
        .unwrap();
    workspace.write_managed("agents/kiln-planner.md", "planner").unwrap();
}

/// A file next to the home directory that a `../..` entry would reach.
fn bait(workspace: &WorkspaceFixture) -> PathBuf {
    let ssh = workspace.home().join(".ssh");
    fs::create_dir_all(&ssh).unwrap();
    let config = ssh.join("config");
    fs::write(&config, "Host *\n").unwrap();
    config
}

#[test]
fn test_uninstall_rejects_traversal() {
    let workspace = WorkspaceFixture::new().unwrap();
    let bait = bait(&workspace);
    poison(&workspace, "../.ssh/config");

    let err = uninstall(&UninstallOptions {
        home: Some(workspace.home()),
    })
    .unwrap_err();

    assert!(err.to_string().contains("path traversal"));
    assert_eq!(fs::read_to_string(&bait).unwrap(), "Host *\n");
    assert!(workspace.claude_dir().join("agents/kiln-planner.md").exists());
}

#[test]
fn test_uninstall_rejects_nested_traversal() {
    let workspace = WorkspaceFixture::new().unwrap();
    let bait = bait(&workspace);
    poison(&workspace, "agents/../../.ssh/config");

    assert!(uninstall(&UninstallOptions { home: Some(workspace.home()) }).is_err());
    assert!(bait.exists());
}

#[test]
fn test_uninstall_rejects_windows_separators() {
    let workspace = WorkspaceFixture::new().unwrap();
    poison(&workspace, "..\\..\\.ssh\\config");

    let err = uninstall(&UninstallOptions {
        home: Some(workspace.home()),
    })
    .unwrap_err();
    assert!(err.to_string().contains("path traversal"));
}

#[test]
fn test_uninstall_rejects_absolute_entry() {
    let workspace = WorkspaceFixture::new().unwrap();
    let bait = bait(&workspace);
    poison(&workspace, &bait.display().to_string());

    let err = uninstall(&UninstallOptions {
        home: Some(workspace.home()),
    })
    .unwrap_err();
    let kiln = err.downcast_ref::<KilnError>().unwrap();
    assert!(kiln.is_path_violation());
    assert!(bait.exists());
    assert!(workspace.claude_dir().join("agents/kiln-planner.md").exists());
}

#[tokio::test]
async fn test_update_rejects_traversal() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    poison(&workspace, "../../.ssh/config");

    let err = update(&InstallOptions::new(bundle.path()).with_home(workspace.home())).await.unwrap_err();

    assert!(err.to_string().contains("path traversal"));
    assert!(!workspace.claude_dir().join("commands").exists());
}

#[test]
fn test_strict_doctor_fails_on_traversal() {
    let workspace = WorkspaceFixture::new().unwrap();
    poison(&workspace, "../../.ssh/config");

    let report = doctor(
        &DoctorOptions {
            home: Some(workspace.home()),
            strict: true,
            ..DoctorOptions::default()
        },
        &Everything,
    )
    .unwrap();

    assert!(!report.ok);
    let checksums = report.check("checksums").unwrap();
    assert_eq!(checksums.status, CheckStatus::Fail);
    assert!(checksums.message.contains("invalid"));
}
