use serde_json::Value;

use crate::context::Context;
use crate::error::Result;
use crate::settings::{edit_document, object_entry, set_if_absent};
use crate::steps::Step;
use crate::tools::Toolbox;

/// Merges provider env, credentials and launcher self-reference into
/// `config/settings.json`. Existing user keys are kept.
pub struct SettingsStep;

impl Step for SettingsStep {
    fn name(&self) -> &'static str {
        "Settings"
    }

    fn announce(&self, _ctx: &Context) -> Option<String> {
        Some("Writing settings...".to_string())
    }

    fn run(&self, ctx: &mut Context, _tools: &Toolbox) -> Result<()> {
        let parts = ctx.parts();
        let path = parts.paths.settings_path();
        let prefs = parts.prefs;
        let provider = parts.provider;
        let launcher = parts
            .state
            .wrapper_path
            .clone()
            .or_else(|| parts.paths.wrapper_path(parts.name));

        let merged = edit_document(&path, true, |root| {
            let env = object_entry(root, "env");

            match (prefs.base_url.as_deref(), provider.and_then(|p| p.base_url)) {
                (Some(url), _) => {
                    env.insert("ANTHROPIC_BASE_URL".to_string(), Value::from(url));
                }
                (None, Some(url)) => {
                    set_if_absent(env, "ANTHROPIC_BASE_URL", url);
                }
                (None, None) => {}
            }

            if let Some(key) = prefs.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
                env.insert("ANTHROPIC_API_KEY".to_string(), Value::from(key));
                if let Some(var) = provider.and_then(|p| p.api_key_env) {
                    env.insert(var.to_string(), Value::from(key));
                }
            }

            for (var, model) in provider.map(|p| p.models).unwrap_or_default() {
                set_if_absent(env, var, model);
            }

            env.insert("CC_MIRROR_VARIANT".to_string(), Value::from(parts.name));
            if let Some(launcher) = &launcher {
                env.insert(
                    "CC_MIRROR_LAUNCHER".to_string(),
                    Value::from(launcher.to_string_lossy().to_string()),
                );
            }
        });

        if let Err(e) = merged {
            parts.state.notes.warn(format!("Could not update settings.json ({})", e));
        }
        Ok(())
    }
}
