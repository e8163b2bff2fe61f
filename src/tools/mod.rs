//! External collaborators
//!
//! The pipelines never install packages, run the theming tool or touch
//! skill bundles themselves. They go through the narrow traits below, and a
//! [`Toolbox`] bundles one implementation of each. [`Toolbox::system`] wires
//! up the real ones (npm, tweakcc, bundled packs, the user's shell profile).

pub mod npm;
pub mod prompt_pack;
pub mod shell_env;
pub mod skills;
pub mod team_pack;
pub mod tweakcc;

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::options::CommandStdio;

pub use npm::NpmInstaller;
pub use prompt_pack::{BundledPromptPack, PromptPackResult};
pub use shell_env::{ProfileFile, ShellEnvStatus};
pub use skills::{BundledSkills, SkillResult, SkillStatus};
pub use tweakcc::Tweakcc;

/// Outcome of one theming tool run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchResult {
    pub status: i32,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

impl PatchResult {
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// stderr then stdout, trimmed
    pub fn combined_output(&self) -> String {
        format!(
            "{}\n{}",
            self.stderr.as_deref().unwrap_or_default(),
            self.stdout.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

/// Materializes the artifact tree in a target directory
pub trait Installer: Send + Sync {
    fn install(&self, package: &str, version: &str, target_dir: &Path) -> Result<()>;
}

/// Runs the theming/patch tool against an installed artifact
pub trait ThemingTool: Send + Sync {
    fn run(&self, tweak_dir: &Path, artifact: &Path, stdio: CommandStdio) -> PatchResult;
}

/// Rewrites provider-specific overlay files inside the theming directory
pub trait PromptPackApplier: Send + Sync {
    fn apply(&self, tweak_dir: &Path, provider: &str) -> PromptPackResult;
}

/// Installs and removes named skill bundles under a config directory
pub trait SkillManager: Send + Sync {
    fn install(&self, config_dir: &Path, skill: &str, force: bool) -> SkillResult;
    fn remove(&self, config_dir: &Path, skill: &str) -> SkillResult;
}

/// Writes a variant's env block into the user's shell profile
pub trait ShellProfile: Send + Sync {
    fn write_env(&self, variant: &str, env: &[(String, String)]) -> Result<ShellEnvStatus>;
}

/// One implementation of every collaborator
#[derive(Clone)]
pub struct Toolbox {
    pub installer: Arc<dyn Installer>,
    pub theming: Arc<dyn ThemingTool>,
    pub prompt_pack: Arc<dyn PromptPackApplier>,
    pub skills: Arc<dyn SkillManager>,
    pub shell_profile: Arc<dyn ShellProfile>,
}

impl Toolbox {
    /// The real collaborators
    pub fn system(tweakcc_version: &str) -> Self {
        Self {
            installer: Arc::new(NpmInstaller::default()),
            theming: Arc::new(Tweakcc::new(tweakcc_version)),
            prompt_pack: Arc::new(BundledPromptPack),
            skills: Arc::new(BundledSkills),
            shell_profile: Arc::new(ProfileFile::detect()),
        }
    }
}
