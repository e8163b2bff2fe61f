//! Preference resolution
//!
//! Each optional behavior resolves independently with the same precedence:
//! explicit option for this invocation, then the value recorded in the
//! variant's metadata, then the provider's own default.

use crate::config::DEFAULT_NPM_PACKAGE;
use crate::config::DEFAULT_NPM_VERSION;
use crate::meta::VariantMeta;
use crate::options::{CommandStdio, CreateOptions, ModelOverrides, UpdateOptions};
use crate::providers::ProviderCatalog;
use crate::tools::tweakcc::resolve_brand_key;

/// Three-tier fallback: explicit > stored > provider default
pub fn resolve(explicit: Option<bool>, stored: Option<bool>, provider_default: impl FnOnce() -> bool) -> bool {
    explicit.or(stored).unwrap_or_else(provider_default)
}

/// Blank or missing package names fall back to the stock package
pub fn normalize_npm_package(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => DEFAULT_NPM_PACKAGE.to_string(),
    }
}

/// The version is pinned; newer upstream bundles may move the team-mode marker
pub fn normalize_npm_version() -> String {
    DEFAULT_NPM_VERSION.to_string()
}

/// What the team-mode step should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamModeAction {
    Enable,
    /// Only ever the result of an explicit request
    Disable,
    Skip,
}

/// Resolved once per run, read-only afterwards
#[derive(Debug, Clone)]
pub struct Preferences {
    pub npm_package: String,
    pub npm_version: String,
    pub prompt_pack_preference: bool,
    /// `prompt_pack_preference` and theming in scope
    pub prompt_pack_enabled: bool,
    pub skill_install_enabled: bool,
    pub shell_env_enabled: bool,
    pub skill_update_enabled: bool,
    pub team_mode: TeamModeAction,
    /// Theming subtree is in scope (no `--no-tweak`)
    pub theming_enabled: bool,
    pub settings_only: bool,
    /// Theme written into the theming config; `None` for the stock theme
    pub brand_key: Option<String>,
    pub model_overrides: ModelOverrides,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub command_stdio: CommandStdio,
}

impl Preferences {
    pub fn for_create(opts: &CreateOptions, catalog: &ProviderCatalog) -> Self {
        let provider = opts.provider.as_str();
        let prompt_pack_preference = resolve(opts.prompt_pack, None, || catalog.default_prompt_pack(provider));
        let team_mode_enabled = resolve(opts.team_mode, None, || catalog.default_team_mode(provider));

        Self {
            npm_package: normalize_npm_package(opts.npm_package.as_deref()),
            npm_version: normalize_npm_version(),
            prompt_pack_preference,
            prompt_pack_enabled: !opts.no_tweak && prompt_pack_preference,
            skill_install_enabled: resolve(opts.skill_install, None, || catalog.default_skill_install(provider)),
            shell_env_enabled: resolve(opts.shell_env, None, || catalog.default_shell_env(provider)),
            skill_update_enabled: false,
            team_mode: if team_mode_enabled {
                TeamModeAction::Enable
            } else {
                TeamModeAction::Skip
            },
            theming_enabled: !opts.no_tweak,
            settings_only: false,
            brand_key: resolve_brand_key(catalog, provider, opts.brand.as_deref()),
            model_overrides: opts.model_overrides.clone(),
            api_key: opts.api_key.clone(),
            base_url: opts.base_url.clone(),
            command_stdio: opts.theming_stdio,
        }
    }

    pub fn for_update(opts: &UpdateOptions, meta: &VariantMeta, catalog: &ProviderCatalog) -> Self {
        let provider = meta.provider.as_str();
        let prompt_pack_preference =
            resolve(opts.prompt_pack, meta.prompt_pack, || catalog.default_prompt_pack(provider));

        let team_mode = match opts.team_mode {
            Some(false) => TeamModeAction::Disable,
            explicit => {
                if resolve(explicit, meta.team_mode_enabled, || catalog.default_team_mode(provider)) {
                    TeamModeAction::Enable
                } else {
                    TeamModeAction::Skip
                }
            }
        };

        Self {
            npm_package: normalize_npm_package(opts.npm_package.as_deref().or(meta.npm_package.as_deref())),
            npm_version: normalize_npm_version(),
            prompt_pack_preference,
            prompt_pack_enabled: !opts.no_tweak && prompt_pack_preference,
            skill_install_enabled: resolve(opts.skill_install, meta.skill_install, || {
                catalog.default_skill_install(provider)
            }),
            shell_env_enabled: resolve(opts.shell_env, meta.shell_env, || catalog.default_shell_env(provider)),
            skill_update_enabled: opts.skill_update,
            team_mode,
            theming_enabled: !opts.no_tweak,
            settings_only: opts.settings_only,
            brand_key: match opts.brand.as_deref() {
                Some(request) => resolve_brand_key(catalog, provider, Some(request)),
                None => meta.brand.clone(),
            },
            model_overrides: meta.model_overrides.merged_with(&opts.model_overrides),
            api_key: None,
            base_url: None,
            command_stdio: opts.theming_stdio,
        }
    }
}
