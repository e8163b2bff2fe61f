//! Caller-supplied options for the create and update pipelines
//!
//! Every recognized option is a named field. `validate()` runs at the
//! boundary, before any context is assembled.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, VariantError};

/// Where the theming tool's output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommandStdio {
    /// Capture stdout/stderr into the patch result
    #[default]
    Pipe,
    /// Pass output straight through to the terminal
    Inherit,
}

/// Optional model mapping, written into the variant's settings env
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sonnet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub haiku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_fast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subagent_model: Option<String>,
}

impl ModelOverrides {
    pub fn is_empty(&self) -> bool {
        self.env_pairs().is_empty()
    }

    /// `(ENV_VAR, model)` pairs for every override that is set
    pub fn env_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("ANTHROPIC_DEFAULT_SONNET_MODEL", &self.sonnet),
            ("ANTHROPIC_DEFAULT_OPUS_MODEL", &self.opus),
            ("ANTHROPIC_DEFAULT_HAIKU_MODEL", &self.haiku),
            ("ANTHROPIC_SMALL_FAST_MODEL", &self.small_fast),
            ("ANTHROPIC_MODEL", &self.default_model),
            ("CLAUDE_CODE_SUBAGENT_MODEL", &self.subagent_model),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }

    /// Overlay `other` on top of `self`; set fields in `other` win
    pub fn merged_with(&self, other: &ModelOverrides) -> ModelOverrides {
        ModelOverrides {
            sonnet: other.sonnet.clone().or_else(|| self.sonnet.clone()),
            opus: other.opus.clone().or_else(|| self.opus.clone()),
            haiku: other.haiku.clone().or_else(|| self.haiku.clone()),
            small_fast: other.small_fast.clone().or_else(|| self.small_fast.clone()),
            default_model: other.default_model.clone().or_else(|| self.default_model.clone()),
            subagent_model: other.subagent_model.clone().or_else(|| self.subagent_model.clone()),
        }
    }
}

/// Turn a pair of `--enable-team-mode` / `--disable-team-mode` flags into a
/// tri-state request
pub fn team_mode_request(enable: bool, disable: bool) -> Result<Option<bool>> {
    match (enable, disable) {
        (true, true) => Err(VariantError::InvalidOptions(
            "--enable-team-mode and --disable-team-mode are mutually exclusive".to_string(),
        )),
        (true, false) => Ok(Some(true)),
        (false, true) => Ok(Some(false)),
        (false, false) => Ok(None),
    }
}

/// Validate a variant name (it doubles as a command name and a directory name)
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(VariantError::InvalidOptions("variant name is required".to_string()));
    }
    if name.starts_with('.') {
        return Err(VariantError::InvalidOptions(format!(
            "variant name '{}' must not start with '.'",
            name
        )));
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(VariantError::InvalidOptions(format!(
            "variant name '{}' contains invalid character '{}'",
            name, bad
        )));
    }
    Ok(())
}

/// Options for creating a new variant
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub name: String,
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub npm_package: Option<String>,
    /// Brand preset: `auto`, `none` or a brand key
    pub brand: Option<String>,
    pub model_overrides: ModelOverrides,
    /// Skip all theming (no tweakcc run, no prompt pack)
    pub no_tweak: bool,
    pub prompt_pack: Option<bool>,
    pub skill_install: Option<bool>,
    pub shell_env: Option<bool>,
    pub team_mode: Option<bool>,
    pub theming_stdio: CommandStdio,
}

impl CreateOptions {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        if self.provider.trim().is_empty() {
            return Err(VariantError::InvalidOptions("provider is required".to_string()));
        }
        Ok(())
    }
}

/// Options for updating an existing variant
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Launcher directory; falls back to the one recorded in metadata
    pub bin_dir: Option<PathBuf>,
    pub npm_package: Option<String>,
    pub brand: Option<String>,
    pub model_overrides: ModelOverrides,
    pub no_tweak: bool,
    /// Only rewrite settings/launcher; keep the install tree as-is
    pub settings_only: bool,
    pub prompt_pack: Option<bool>,
    pub skill_install: Option<bool>,
    pub shell_env: Option<bool>,
    /// Reinstall auxiliary skills even when already present
    pub skill_update: bool,
    pub team_mode: Option<bool>,
    pub theming_stdio: CommandStdio,
}

impl UpdateOptions {
    pub fn validate(&self, name: &str) -> Result<()> {
        validate_name(name)
    }
}
