//! Uninstall workflows.

use kilntwo::installer::{InstallOptions, install};
use kilntwo::test_utils::{AssetBundleFixture, STANDARD_MANAGED_PATHS, WorkspaceFixture};
use kilntwo::uninstall::{UninstallOptions, UninstallOutcome, uninstall};
use std::fs;

fn install_into(bundle: &AssetBundleFixture, workspace: &WorkspaceFixture) {
    install(
        &InstallOptions::new(bundle.path()).with_home(workspace.home()).with_project(workspace.project()),
    )
    .unwrap();
}

fn uninstall_from(workspace: &WorkspaceFixture) -> UninstallOutcome {
    uninstall(&UninstallOptions {
        home: Some(workspace.home()),
    })
    .unwrap()
}

#[test]
fn test_uninstall_restores_host_document() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    let doc = workspace.project().join("CLAUDE.md");
    fs::write(&doc, "# Team notes\n\nBe kind.\n").unwrap();
    install_into(&bundle, &workspace);
    assert!(fs::read_to_string(&doc).unwrap().contains("kiln:protocol:begin"));

    let UninstallOutcome::Removed(summary) = uninstall_from(&workspace) else {
        panic!("expected removal");
    };

    assert_eq!(summary.removed.len(), STANDARD_MANAGED_PATHS.len());
    assert!(summary.not_found.is_empty());
    assert_eq!(fs::read_to_string(&doc).unwrap(), "# Team notes\n\nBe kind.\n");
}

#[test]
fn test_host_document_created_by_install_ends_empty() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install_into(&bundle, &workspace);

    uninstall_from(&workspace);

    assert_eq!(fs::read_to_string(workspace.project().join("CLAUDE.md")).unwrap(), "");
}

#[test]
fn test_uninstall_leaves_operator_data() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install_into(&bundle, &workspace);
    workspace.write_managed("commands/kiln/mine.md", "my command\n").unwrap();
    workspace.write_managed("settings.json", "{}").unwrap();

    uninstall_from(&workspace);

    let claude = workspace.claude_dir();
    assert_eq!(workspace.read_managed("commands/kiln/mine.md").unwrap(), "my command\n");
    assert!(claude.join("settings.json").exists());
    assert!(claude.join("hooks/hooks.json").exists());
    assert!(!claude.join("kilntwo/manifest.json").exists());
    assert!(!claude.join("agents").exists());
    assert!(workspace.project().join(".kiln/config.json").exists());
}

#[test]
fn test_uninstall_twice() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install_into(&bundle, &workspace);

    assert!(matches!(uninstall_from(&workspace), UninstallOutcome::Removed(_)));
    assert_eq!(uninstall_from(&workspace), UninstallOutcome::NotInstalled);
}

#[test]
fn test_missing_files_are_reported() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install_into(&bundle, &workspace);
    fs::remove_dir_all(workspace.claude_dir().join("kilntwo/skills")).unwrap();

    let UninstallOutcome::Removed(summary) = uninstall_from(&workspace) else {
        panic!("expected removal");
    };

    assert_eq!(summary.not_found.len(), 2);
    assert_eq!(summary.removed.len(), STANDARD_MANAGED_PATHS.len() - 2);
}
