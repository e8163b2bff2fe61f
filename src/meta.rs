//! Persisted variant metadata (`<variant>/variant.json`)
//!
//! The record is read once when a pipeline context is assembled, mutated in
//! memory by the steps and written back by the finalize step.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, VariantError};
use crate::options::ModelOverrides;

pub const META_FILE: &str = "variant.json";

/// One variant's on-disk record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMeta {
    /// Variant name, also the launcher command name
    pub name: String,
    /// Provider key (mirror, zai, minimax, ...)
    pub provider: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Where the artifact came from, e.g. `npm:@anthropic-ai/claude-code@2.1.1`
    pub claude_orig: String,
    /// Resolved entry-point bundle the launcher executes
    pub binary_path: PathBuf,
    pub config_dir: PathBuf,
    pub tweak_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub npm_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_mode_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_pack: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_install: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_env: Option<bool>,
    #[serde(default, skip_serializing_if = "ModelOverrides::is_empty")]
    pub model_overrides: ModelOverrides,
}

/// A variant found while scanning the root directory
#[derive(Debug, Clone)]
pub struct VariantEntry {
    pub name: String,
    pub meta: VariantMeta,
}

impl VariantMeta {
    /// Load the record stored in `variant_dir`
    /// Returns `Ok(None)` if the variant has no record
    pub fn load(variant_dir: &Path) -> Result<Option<Self>> {
        let path = variant_dir.join(META_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| VariantError::io(&path, e))?;
        let meta = serde_json::from_str(&content).map_err(|e| VariantError::json(&path, e))?;
        Ok(Some(meta))
    }

    /// Write the record to `variant_dir/variant.json`
    pub fn save(&self, variant_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(variant_dir).map_err(|e| VariantError::io(variant_dir, e))?;
        let path = variant_dir.join(META_FILE);
        let content = serde_json::to_string_pretty(self).map_err(|e| VariantError::json(&path, e))?;
        std::fs::write(&path, format!("{}\n", content)).map_err(|e| VariantError::io(&path, e))
    }
}

/// All variants under `root`, sorted by name
///
/// Directories without a readable record are skipped.
pub fn list_variants(root: &Path) -> Vec<VariantEntry> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut variants: Vec<VariantEntry> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            match VariantMeta::load(&e.path()) {
                Ok(Some(meta)) => Some(VariantEntry { name, meta }),
                Ok(None) => None,
                Err(err) => {
                    tracing::warn!(variant = %name, error = %err, "skipping unreadable variant");
                    None
                }
            }
        })
        .collect();

    variants.sort_by(|a, b| a.name.cmp(&b.name));
    variants
}

#[cfg(test)]
pub(crate) fn sample_meta(variant_dir: &Path, name: &str, provider: &str) -> VariantMeta {
    let npm_dir = variant_dir.join("npm");
    VariantMeta {
        name: name.to_string(),
        provider: provider.to_string(),
        created_at: "2026-01-01T00:00:00+00:00".to_string(),
        updated_at: None,
        claude_orig: "npm:@anthropic-ai/claude-code@2.1.1".to_string(),
        binary_path: crate::paths::artifact_path(&npm_dir, "@anthropic-ai/claude-code"),
        config_dir: variant_dir.join("config"),
        tweak_dir: variant_dir.join("tweakcc"),
        bin_dir: None,
        npm_dir: Some(npm_dir),
        npm_package: None,
        npm_version: None,
        brand: None,
        team_mode_enabled: None,
        prompt_pack: None,
        skill_install: None,
        shell_env: None,
        model_overrides: ModelOverrides::default(),
    }
}
