//! Update workflows.

use kilntwo::installer::{InstallOptions, install};
use kilntwo::manifest::load_manifest;
use kilntwo::test_utils::{AssetBundleFixture, WorkspaceFixture};
use kilntwo::update::{FileUpdateStatus, UpdateOutcome, update};
use std::fs;

fn options(bundle: &AssetBundleFixture, workspace: &WorkspaceFixture) -> InstallOptions {
    InstallOptions::new(bundle.path())
        .with_home(workspace.home())
        .with_project(workspace.project())
        .with_bundle_version("1.0.0")
}

#[tokio::test]
async fn test_hand_edited_agent_is_skipped() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install(&options(&bundle, &workspace)).unwrap();
    workspace.write_managed("agents/kiln-reviewer.md", "# My reviewer\n").unwrap();

    let UpdateOutcome::Updated(summary) = update(&options(&bundle, &workspace)).await.unwrap() else {
        panic!("expected an update");
    };

    let reviewer = workspace.claude_dir().join("agents/kiln-reviewer.md");
    assert_eq!(workspace.read_managed("agents/kiln-reviewer.md").unwrap(), "# My reviewer\n");
    assert!(summary.skipped.contains(&reviewer));
    assert!(!summary.updated.contains(&reviewer));

    // the edited file is no longer managed
    let manifest = load_manifest(&workspace.claude_dir().join("kilntwo/manifest.json")).unwrap().unwrap();
    assert!(!manifest.files.iter().any(|f| f.path == "agents/kiln-reviewer.md"));
}

#[tokio::test]
async fn test_deleted_command_is_restored() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install(&options(&bundle, &workspace)).unwrap();
    let status = workspace.claude_dir().join("commands/kiln/status.md");
    fs::remove_file(&status).unwrap();

    let UpdateOutcome::Updated(summary) = update(&options(&bundle, &workspace)).await.unwrap() else {
        panic!("expected an update");
    };

    assert_eq!(fs::read_to_string(&status).unwrap(), "Where am I?\n");
    assert!(summary.updated.contains(&status));
    let entry = summary.updates.iter().find(|u| u.path == status).unwrap();
    assert_eq!(entry.status, FileUpdateStatus::Updated);
}

#[tokio::test]
async fn test_second_update_is_up_to_date() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install(&options(&bundle, &workspace)).unwrap();
    fs::remove_file(workspace.claude_dir().join("agents/kiln-planner.md")).unwrap();

    let first = update(&options(&bundle, &workspace)).await.unwrap();
    assert!(matches!(first, UpdateOutcome::Updated(_)));

    let second = update(&options(&bundle, &workspace)).await.unwrap();
    assert_eq!(
        second,
        UpdateOutcome::UpToDate {
            version: "1.0.0".to_string()
        }
    );
}

#[tokio::test]
async fn test_new_bundle_file_is_reported_updated() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install(&options(&bundle, &workspace)).unwrap();
    bundle.write("agents/kiln-debugger.md", "# Debugger\n").unwrap();

    let UpdateOutcome::Updated(summary) = update(&options(&bundle, &workspace)).await.unwrap() else {
        panic!("expected an update");
    };

    assert_eq!(summary.updated, vec![workspace.claude_dir().join("agents/kiln-debugger.md")]);
    let mut sorted = summary.updates.iter().map(|u| u.path.clone()).collect::<Vec<_>>();
    sorted.sort();
    assert_eq!(summary.updates.iter().map(|u| u.path.clone()).collect::<Vec<_>>(), sorted);
}

#[tokio::test]
async fn test_force_overwrites_edit() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install(&options(&bundle, &workspace)).unwrap();
    workspace.write_managed("agents/kiln-planner.md", "mine\n").unwrap();

    let UpdateOutcome::Updated(summary) =
        update(&options(&bundle, &workspace).with_force(true)).await.unwrap()
    else {
        panic!("expected an update");
    };

    assert!(summary.skipped.is_empty());
    assert!(summary.updated.contains(&workspace.claude_dir().join("agents/kiln-planner.md")));
    assert_eq!(
        workspace.read_managed("agents/kiln-planner.md").unwrap(),
        "# Planner\n\nPlans the work.\n"
    );
}

#[tokio::test]
async fn test_update_targets_recorded_project() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    install(&options(&bundle, &workspace)).unwrap();
    let doc = workspace.project().join("CLAUDE.md");
    fs::remove_file(&doc).unwrap();

    // no project given here; the manifest supplies it
    let bare = InstallOptions::new(bundle.path()).with_home(workspace.home()).with_bundle_version("1.0.0");
    update(&bare).await.unwrap();

    assert!(fs::read_to_string(&doc).unwrap().contains("<!-- kiln:protocol:begin -->"));
}
