//! End-to-end pipeline tests
//!
//! Drive full create/update runs through the public API with fake
//! collaborators standing in for npm, tweakcc and the shell profile. The
//! bundled prompt pack and skill manager are the real ones.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cc_mirror::paths::artifact_path;
use cc_mirror::tools::skills::{skill_dir, ORCHESTRATION_SKILL, TASK_MANAGER_SKILL};
use cc_mirror::tools::{
    BundledPromptPack, BundledSkills, Installer, ShellEnvStatus, ShellProfile, ThemingTool,
};
use cc_mirror::{
    BuildResult, CommandStdio, CreateOptions, ExecutionMode, PatchResult, Toolbox, UpdateOptions,
    VariantBuilder, VariantUpdater, TEAM_MODE_MARKER,
};
use serde_json::Value;
use tempfile::TempDir;

// =============================================================================
// Fakes
// =============================================================================

/// Writes a minimal cli.js carrying the "off" team-mode marker
struct StubInstaller;

impl Installer for StubInstaller {
    fn install(&self, package: &str, _version: &str, target_dir: &Path) -> cc_mirror::Result<()> {
        let artifact = artifact_path(target_dir, package);
        std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        std::fs::write(&artifact, format!("#!/usr/bin/env node\n{};main();", TEAM_MODE_MARKER.off)).unwrap();
        Ok(())
    }
}

struct StubTheming;

impl ThemingTool for StubTheming {
    fn run(&self, _tweak_dir: &Path, _artifact: &Path, _stdio: CommandStdio) -> PatchResult {
        PatchResult {
            status: 0,
            stdout: Some("Customizations applied".to_string()),
            stderr: None,
        }
    }
}

#[derive(Default)]
struct ProfileRecorder {
    blocks: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ShellProfile for ProfileRecorder {
    fn write_env(&self, variant: &str, env: &[(String, String)]) -> cc_mirror::Result<ShellEnvStatus> {
        self.blocks.lock().unwrap().push((variant.to_string(), env.to_vec()));
        Ok(ShellEnvStatus::Updated)
    }
}

fn toolbox_with(profile: Arc<ProfileRecorder>) -> Toolbox {
    Toolbox {
        installer: Arc::new(StubInstaller),
        theming: Arc::new(StubTheming),
        prompt_pack: Arc::new(BundledPromptPack),
        skills: Arc::new(BundledSkills),
        shell_profile: profile,
    }
}

fn toolbox() -> Toolbox {
    toolbox_with(Arc::new(ProfileRecorder::default()))
}

// =============================================================================
// Helpers
// =============================================================================

fn options(root: &Path, name: &str, provider: &str) -> CreateOptions {
    CreateOptions {
        name: name.to_string(),
        provider: provider.to_string(),
        api_key: Some("sk-test".to_string()),
        root: root.to_path_buf(),
        bin_dir: root.join("bin"),
        shell_env: Some(false),
        ..Default::default()
    }
}

fn create(opts: &CreateOptions) -> BuildResult {
    VariantBuilder::new(ExecutionMode::Blocking, toolbox()).create(opts).unwrap()
}

fn update(root: &Path, name: &str, opts: &UpdateOptions) -> BuildResult {
    VariantUpdater::new(ExecutionMode::Blocking, toolbox())
        .update(root, name, opts)
        .unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn messages(result: &BuildResult) -> Vec<String> {
    result
        .notes
        .iter()
        .flatten()
        .map(|n| n.message.clone())
        .collect()
}

/// Notes and metadata with the temp root stripped, for cross-run comparison
fn normalized(result: &BuildResult, root: &Path) -> (Vec<String>, Value) {
    let root = root.display().to_string();
    let notes = messages(result).into_iter().map(|m| m.replace(&root, "<root>")).collect();
    let mut meta = serde_json::to_value(&result.meta).unwrap();
    if let Some(object) = meta.as_object_mut() {
        object.remove("createdAt");
        object.remove("updatedAt");
    }
    let meta = serde_json::from_str(&meta.to_string().replace(&root, "<root>")).unwrap();
    (notes, meta)
}

fn cli_js(root: &Path, name: &str) -> PathBuf {
    artifact_path(&root.join(name).join("npm"), cc_mirror::DEFAULT_NPM_PACKAGE)
}

// =============================================================================
// Team mode round trip
// =============================================================================

#[test]
fn test_team_mode_enable_then_disable() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut opts = options(root, "zai", "zai");
    opts.team_mode = Some(true);

    let created = create(&opts);
    assert_eq!(created.meta.team_mode_enabled, Some(true));
    assert!(std::fs::read_to_string(cli_js(root, "zai"))
        .unwrap()
        .contains(TEAM_MODE_MARKER.on));

    let config_dir = root.join("zai").join("config");
    let settings = read_json(&config_dir.join("settings.json"));
    assert_eq!(settings["env"]["CLAUDE_CODE_TEAM_MODE"], "1");
    assert_eq!(settings["env"]["CLAUDE_CODE_AGENT_TYPE"], "team-lead");
    let allow = settings["permissions"]["allow"].as_array().unwrap();
    assert!(allow.iter().any(|v| v == "Skill(orchestration)"));
    assert!(skill_dir(&config_dir, ORCHESTRATION_SKILL).exists());
    assert!(skill_dir(&config_dir, TASK_MANAGER_SKILL).exists());
    assert!(messages(&created).contains(&"Team mode enabled successfully".to_string()));

    let updated = update(
        root,
        "zai",
        &UpdateOptions {
            team_mode: Some(false),
            ..Default::default()
        },
    );

    assert_eq!(updated.meta.team_mode_enabled, Some(false));
    assert!(std::fs::read_to_string(cli_js(root, "zai"))
        .unwrap()
        .contains(TEAM_MODE_MARKER.off));
    assert!(!skill_dir(&config_dir, ORCHESTRATION_SKILL).exists());
    assert!(!skill_dir(&config_dir, TASK_MANAGER_SKILL).exists());
    let notes = messages(&updated);
    assert!(notes
        .iter()
        .any(|m| m == "Team mode already disabled" || m == "Team mode disabled successfully"));
}

#[test]
fn test_update_keeps_team_mode_from_metadata() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut opts = options(root, "lead", "zai");
    opts.team_mode = Some(true);
    create(&opts);

    // The reinstall brings back the "off" marker; the stored flag re-patches it
    let updated = update(root, "lead", &UpdateOptions::default());
    assert_eq!(updated.meta.team_mode_enabled, Some(true));
    assert!(std::fs::read_to_string(cli_js(root, "lead"))
        .unwrap()
        .contains(TEAM_MODE_MARKER.on));
}

#[test]
fn test_create_opt_out_survives_update() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let mut opts = options(root, "plain", "mirror");
    opts.team_mode = Some(false);

    let created = create(&opts);
    assert_eq!(created.meta.team_mode_enabled, Some(false));

    let updated = update(root, "plain", &UpdateOptions::default());
    assert_eq!(updated.meta.team_mode_enabled, Some(false));
    assert!(std::fs::read_to_string(cli_js(root, "plain"))
        .unwrap()
        .contains(TEAM_MODE_MARKER.off));
    let config_dir = root.join("plain").join("config");
    assert!(!skill_dir(&config_dir, ORCHESTRATION_SKILL).exists());
}

// =============================================================================
// Rebuild preservation
// =============================================================================

#[test]
fn test_update_preserves_theming_config_and_settings() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    create(&options(root, "keep", "openrouter"));

    let variant = root.join("keep");
    let theming_config = variant.join("tweakcc").join("config.json");
    std::fs::write(&theming_config, r#"{"settings":{"themes":[{"id":"mine"}]}}"#).unwrap();
    std::fs::write(variant.join("tweakcc").join("scratch.txt"), "stale").unwrap();
    std::fs::write(variant.join("config").join("notes.md"), "user data").unwrap();

    let updated = update(root, "keep", &UpdateOptions::default());

    let config = read_json(&theming_config);
    assert_eq!(config["settings"]["themes"][0]["id"], "mine");
    assert!(!variant.join("tweakcc").join("scratch.txt").exists());
    assert_eq!(
        std::fs::read_to_string(variant.join("config").join("notes.md")).unwrap(),
        "user data"
    );
    assert!(messages(&updated).contains(&"Preserved tweakcc config".to_string()));
    assert!(updated.meta.updated_at.is_some());
}

#[test]
fn test_settings_only_update_keeps_install_tree() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    create(&options(root, "fast", "openrouter"));

    let artifact = cli_js(root, "fast");
    std::fs::write(&artifact, "local edits").unwrap();

    update(
        root,
        "fast",
        &UpdateOptions {
            settings_only: true,
            ..Default::default()
        },
    );

    assert_eq!(std::fs::read_to_string(&artifact).unwrap(), "local edits");
}

// =============================================================================
// Execution modes
// =============================================================================

#[tokio::test]
async fn test_blocking_and_cooperative_runs_match() {
    let blocking_dir = TempDir::new().unwrap();
    let blocking = VariantBuilder::new(ExecutionMode::Blocking, toolbox())
        .create(&options(blocking_dir.path(), "same", "minimax"))
        .unwrap();

    let cooperative_dir = TempDir::new().unwrap();
    let cooperative = VariantBuilder::new(ExecutionMode::Cooperative, toolbox())
        .create_async(&options(cooperative_dir.path(), "same", "minimax"))
        .await
        .unwrap();

    assert_eq!(
        normalized(&blocking, blocking_dir.path()),
        normalized(&cooperative, cooperative_dir.path())
    );

    let settings = |root: &Path| read_json(&root.join("same").join("config").join("settings.json"));
    let strip = |root: &Path| {
        serde_json::from_str::<Value>(&settings(root).to_string().replace(&root.display().to_string(), "<root>"))
            .unwrap()
    };
    assert_eq!(strip(blocking_dir.path()), strip(cooperative_dir.path()));
}

#[tokio::test]
async fn test_cooperative_update_matches_blocking_update() {
    let dirs = [TempDir::new().unwrap(), TempDir::new().unwrap()];
    for dir in &dirs {
        create(&options(dir.path(), "up", "zai"));
    }

    let blocking = update(dirs[0].path(), "up", &UpdateOptions::default());
    let cooperative = VariantUpdater::new(ExecutionMode::Cooperative, toolbox())
        .update_async(dirs[1].path(), "up", &UpdateOptions::default())
        .await
        .unwrap();

    assert_eq!(normalized(&blocking, dirs[0].path()), normalized(&cooperative, dirs[1].path()));
}

// =============================================================================
// Shell env
// =============================================================================

#[test]
fn test_shell_env_block_uses_settings_key() {
    let dir = TempDir::new().unwrap();
    let profile = Arc::new(ProfileRecorder::default());
    let mut opts = options(dir.path(), "shell", "zai");
    opts.shell_env = Some(true);

    VariantBuilder::new(ExecutionMode::Blocking, toolbox_with(profile.clone()))
        .create(&opts)
        .unwrap();

    let blocks = profile.blocks.lock().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].0, "shell");
    assert!(blocks[0].1.iter().any(|(_, value)| value == "sk-test"));
}
