//! Provider templates
//!
//! A read-only table of static defaults keyed by provider identifier. The
//! catalog is handed to context assembly explicitly; nothing reads it as
//! ambient global state.

use std::collections::BTreeMap;

/// Static defaults for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTemplate {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// `ANTHROPIC_BASE_URL` for this provider; `None` talks to Anthropic directly
    pub base_url: Option<&'static str>,
    /// Env var the API key is exported under
    pub api_key_env: Option<&'static str>,
    /// Turn team mode on for new variants unless the caller says otherwise
    pub enables_team_mode: bool,
    /// Provider never takes a prompt pack, whatever the caller asks
    pub no_prompt_pack: bool,
    /// Default model mapping written into settings
    pub models: &'static [(&'static str, &'static str)],
}

const MIRROR: ProviderTemplate = ProviderTemplate {
    key: "mirror",
    label: "Mirror Claude",
    description: "Pure Claude with team mode",
    base_url: None,
    api_key_env: None,
    enables_team_mode: true,
    no_prompt_pack: true,
    models: &[],
};

const ZAI: ProviderTemplate = ProviderTemplate {
    key: "zai",
    label: "Zai Cloud",
    description: "GLM-4.7 via Z.ai Coding Plan",
    base_url: Some("https://api.z.ai/api/anthropic"),
    api_key_env: Some("Z_AI_API_KEY"),
    enables_team_mode: false,
    no_prompt_pack: false,
    models: &[
        ("ANTHROPIC_DEFAULT_SONNET_MODEL", "glm-4.7"),
        ("ANTHROPIC_DEFAULT_OPUS_MODEL", "glm-4.7"),
        ("ANTHROPIC_DEFAULT_HAIKU_MODEL", "glm-4.5-air"),
    ],
};

const MINIMAX: ProviderTemplate = ProviderTemplate {
    key: "minimax",
    label: "MiniMax Cloud",
    description: "MiniMax-M2.1 via MiniMax Cloud",
    base_url: Some("https://api.minimax.io/anthropic"),
    api_key_env: Some("MINIMAX_API_KEY"),
    enables_team_mode: false,
    no_prompt_pack: false,
    models: &[
        ("ANTHROPIC_DEFAULT_SONNET_MODEL", "MiniMax-M2.1"),
        ("ANTHROPIC_DEFAULT_OPUS_MODEL", "MiniMax-M2.1"),
        ("ANTHROPIC_DEFAULT_HAIKU_MODEL", "MiniMax-M2.1"),
    ],
};

const OPENROUTER: ProviderTemplate = ProviderTemplate {
    key: "openrouter",
    label: "OpenRouter",
    description: "100+ models via OpenRouter",
    base_url: Some("https://openrouter.ai/api"),
    api_key_env: Some("OPENROUTER_API_KEY"),
    enables_team_mode: false,
    no_prompt_pack: false,
    models: &[],
};

const CCROUTER: ProviderTemplate = ProviderTemplate {
    key: "ccrouter",
    label: "Claude Code Router",
    description: "Local LLMs via Claude Code Router",
    base_url: Some("http://127.0.0.1:3456"),
    api_key_env: None,
    enables_team_mode: false,
    no_prompt_pack: false,
    models: &[],
};

/// Lookup table of all known providers
#[derive(Debug, Clone)]
pub struct ProviderCatalog {
    templates: BTreeMap<&'static str, ProviderTemplate>,
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProviderCatalog {
    /// The providers cc-mirror ships with
    pub fn builtin() -> Self {
        Self::from_templates([MIRROR, ZAI, MINIMAX, OPENROUTER, CCROUTER])
    }

    pub fn from_templates(templates: impl IntoIterator<Item = ProviderTemplate>) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.key, t)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ProviderTemplate> {
        self.templates.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.keys().copied()
    }

    /// Prompt packs exist for zai and minimax only
    pub fn default_prompt_pack(&self, key: &str) -> bool {
        if self.get(key).is_some_and(|t| t.no_prompt_pack) {
            return false;
        }
        matches!(key, "zai" | "minimax")
    }

    pub fn default_skill_install(&self, key: &str) -> bool {
        matches!(key, "zai" | "minimax")
    }

    pub fn default_shell_env(&self, key: &str) -> bool {
        key == "zai"
    }

    pub fn default_team_mode(&self, key: &str) -> bool {
        self.get(key).is_some_and(|t| t.enables_team_mode)
    }

    /// Whether a brand theme exists for this provider
    pub fn has_brand(&self, key: &str) -> bool {
        matches!(key, "mirror" | "zai" | "minimax")
    }
}
