//! Install workflows.

use kilntwo::core::AssetCategory;
use kilntwo::hooks::HookMergeStatus;
use kilntwo::installer::{InstallOptions, ModelMode, install};
use kilntwo::manifest::{compute_checksum, load_manifest};
use kilntwo::markers::InjectOutcome;
use kilntwo::test_utils::{AssetBundleFixture, STANDARD_MANAGED_PATHS, WorkspaceFixture, init_test_logging};
use serde_json::Value;
use std::fs;

fn options(bundle: &AssetBundleFixture, workspace: &WorkspaceFixture) -> InstallOptions {
    InstallOptions::new(bundle.path()).with_home(workspace.home()).with_bundle_version("1.2.3")
}

#[test]
fn test_fresh_install_records_one_entry_per_file() {
    init_test_logging(None);
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();

    let report = install(&options(&bundle, &workspace)).unwrap();

    for category in AssetCategory::ALL {
        assert_eq!(report.category(category).unwrap().conflicts(), 0, "{category}");
    }

    let manifest = load_manifest(&report.paths.manifest_path).unwrap().unwrap();
    assert_eq!(manifest.manifest_version, 1);
    assert_eq!(manifest.kiln_version, "1.2.3");
    assert_eq!(manifest.files.len(), STANDARD_MANAGED_PATHS.len());
    for file in &manifest.files {
        assert!(!file.path.contains('\\'));
        let absolute = workspace.claude_dir().join(&file.path);
        assert_eq!(compute_checksum(&absolute).unwrap(), file.checksum, "{}", file.path);
    }
    assert!(manifest.installed_at.ends_with('Z'));
}

#[test]
fn test_non_markdown_agent_is_not_installed() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();

    install(&options(&bundle, &workspace)).unwrap();

    assert!(workspace.claude_dir().join("agents/kiln-planner.md").exists());
    assert!(!workspace.claude_dir().join("agents/README.txt").exists());
}

#[test]
fn test_manifest_json_uses_camel_case() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();

    install(&options(&bundle, &workspace).with_project(workspace.project())).unwrap();

    let raw: Value =
        serde_json::from_str(&workspace.read_managed("kilntwo/manifest.json").unwrap()).unwrap();
    for key in ["manifestVersion", "kilnVersion", "installedAt", "files", "protocolMarkers", "projectPath"] {
        assert!(raw.get(key).is_some(), "missing {key}");
    }
    assert_eq!(raw["protocolMarkers"]["begin"], "<!-- kiln:protocol:begin -->");
    assert!(raw["files"][0]["checksum"].as_str().unwrap().starts_with("sha256:"));
}

#[test]
fn test_existing_hooks_document_is_merged_not_replaced() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    workspace
        .write_managed(
            "hooks/hooks.json",
            r#"{"hooks":{"Stop":[{"type":"command","command":"my-own-stop.sh"}]}}"#,
        )
        .unwrap();

    let report = install(&options(&bundle, &workspace)).unwrap();

    assert_eq!(report.hooks_status, HookMergeStatus::Merged);
    let merged: Value = serde_json::from_str(&workspace.read_managed("hooks/hooks.json").unwrap()).unwrap();
    let stop = merged["hooks"]["Stop"].as_array().unwrap();
    assert_eq!(stop.len(), 2);
    assert_eq!(stop[0]["command"], "my-own-stop.sh");
    assert!(merged["hooks"]["PreToolUse"].is_array());
}

#[test]
fn test_unparseable_hooks_document_is_left_alone() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    workspace.write_managed("hooks/hooks.json", "{ not json").unwrap();

    let report = install(&options(&bundle, &workspace)).unwrap();

    assert_eq!(report.hooks_status, HookMergeStatus::Skipped);
    assert_eq!(workspace.read_managed("hooks/hooks.json").unwrap(), "{ not json");
    assert!(report.warnings.iter().any(|w| w.contains("hooks.json")));
}

#[test]
fn test_project_state_seeded_once() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    let project = workspace.project();
    fs::write(project.join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();

    let first = install(
        &options(&bundle, &workspace).with_project(&project).with_model_mode(ModelMode::MultiModel),
    )
    .unwrap();
    let state = first.state.unwrap();
    assert_eq!(state.project_type, "rust");

    for doc in ["TECH_STACK.md", "PATTERNS.md", "DECISIONS.md", "PITFALLS.md"] {
        assert_eq!(fs::read_to_string(project.join(".kiln/docs").join(doc)).unwrap(), "");
    }
    assert!(project.join(".kiln/tracks").is_dir());

    let config: Value = serde_json::from_str(&fs::read_to_string(project.join(".kiln/config.json")).unwrap()).unwrap();
    assert_eq!(config["projectType"], "rust");
    assert_eq!(config["modelMode"], "multi-model");
    assert_eq!(config["version"], 1);

    let state_doc = fs::read_to_string(project.join(".kiln/STATE.md")).unwrap();
    assert!(!state_doc.contains("{{project_name}}"));

    fs::write(project.join(".kiln/STATE.md"), "operator notes\n").unwrap();
    let second = install(&options(&bundle, &workspace).with_project(&project)).unwrap();
    assert_eq!(fs::read_to_string(project.join(".kiln/STATE.md")).unwrap(), "operator notes\n");
    let second_state = second.state.unwrap();
    assert!(second_state.preserved.contains(&project.join(".kiln/STATE.md")));
    assert!(second_state.created.is_empty());
    assert!(!second.warnings.iter().any(|w| w.contains("preserved")));
}

#[test]
fn test_gitignore_rules_are_reported_not_changed() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    let project = workspace.project();
    fs::write(project.join(".gitignore"), "target/\n.kiln/\n.claude\n").unwrap();

    let report = install(&options(&bundle, &workspace).with_project(&project)).unwrap();

    assert!(report.warnings.iter().any(|w| w.contains("ignores .kiln")));
    assert!(report.warnings.iter().any(|w| w.contains("ignores .claude")));
    assert_eq!(fs::read_to_string(project.join(".gitignore")).unwrap(), "target/\n.kiln/\n.claude\n");

    let global = install(&options(&bundle, &workspace).with_project(&project).with_global(true)).unwrap();
    assert!(!global.warnings.iter().any(|w| w.contains("ignores .claude")));
}

#[test]
fn test_protocol_block_replaced_when_body_changes() {
    let bundle = AssetBundleFixture::standard().unwrap();
    let workspace = WorkspaceFixture::new().unwrap();
    let project = workspace.project();

    let first = install(&options(&bundle, &workspace).with_project(&project)).unwrap();
    assert_eq!(first.protocol, Some(InjectOutcome::Created));

    bundle.write("protocol.md", "## Kiln protocol v2\n").unwrap();
    let second = install(&options(&bundle, &workspace).with_project(&project)).unwrap();
    assert_eq!(second.protocol, Some(InjectOutcome::Replaced));

    let doc = fs::read_to_string(project.join("CLAUDE.md")).unwrap();
    assert_eq!(doc.matches("<!-- kiln:protocol:begin -->").count(), 1);
    assert!(doc.contains("## Kiln protocol v2"));
    assert!(!doc.contains("Follow the pipeline."));
}

#[cfg(unix)]
#[test]
fn test_hook_scripts_keep_exec_bit() {
    use std::os::unix::fs::PermissionsExt;

    let bundle = AssetBundleFixture::standard().unwrap();
    let script = bundle.path().join("hooks/scripts/kiln-stop.sh");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let workspace = WorkspaceFixture::new().unwrap();

    install(&options(&bundle, &workspace)).unwrap();

    let mode = fs::metadata(workspace.claude_dir().join("hooks/scripts/kiln-stop.sh")).unwrap().permissions().mode();
    assert_ne!(mode & 0o111, 0);
}
