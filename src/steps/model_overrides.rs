use serde_json::Value;

use crate::context::Context;
use crate::error::Result;
use crate::settings::{edit_document, object_entry};
use crate::steps::Step;
use crate::tools::Toolbox;

/// Writes explicit model mappings into `settings.env`
pub struct ModelOverridesStep;

impl Step for ModelOverridesStep {
    fn name(&self) -> &'static str {
        "ModelOverrides"
    }

    fn announce(&self, ctx: &Context) -> Option<String> {
        if ctx.prefs().model_overrides.env_pairs().is_empty() {
            return None;
        }
        Some("Applying model overrides...".to_string())
    }

    fn run(&self, ctx: &mut Context, _tools: &Toolbox) -> Result<()> {
        let parts = ctx.parts();
        let overrides = &parts.prefs.model_overrides;
        let pairs = overrides.env_pairs();
        if pairs.is_empty() {
            return Ok(());
        }

        let written = edit_document(&parts.paths.settings_path(), true, |root| {
            let env = object_entry(root, "env");
            for (var, model) in &pairs {
                env.insert(var.to_string(), Value::from(*model));
            }
        });

        match written {
            Ok(_) => {
                parts.meta.model_overrides = overrides.clone();
                let vars: Vec<&str> = pairs.iter().map(|(var, _)| *var).collect();
                parts
                    .state
                    .notes
                    .info(format!("Model overrides applied ({})", vars.join(", ")));
            }
            Err(e) => parts
                .state
                .notes
                .warn(format!("Could not write model overrides to settings.json ({})", e)),
        }
        Ok(())
    }
}
