use crate::context::Context;
use crate::error::Result;
use crate::rebuild::{rebuild, RebuildPlan};
use crate::steps::Step;
use crate::tools::Toolbox;

/// Resets the install and theming trees before an update reinstalls them
pub struct RebuildStep;

impl Step for RebuildStep {
    fn name(&self) -> &'static str {
        "Rebuild"
    }

    fn announce(&self, ctx: &Context) -> Option<String> {
        if ctx.prefs().settings_only {
            return None;
        }
        Some("Resetting variant install directories...".to_string())
    }

    fn run(&self, ctx: &mut Context, _tools: &Toolbox) -> Result<()> {
        let parts = ctx.parts();
        let plan = RebuildPlan {
            npm_dir: &parts.paths.npm_dir,
            tweak_dir: &parts.paths.tweak_dir,
            bin_dir: parts.paths.bin_dir.as_deref(),
            name: parts.name,
            theming: parts.prefs.theming_enabled,
            settings_only: parts.prefs.settings_only,
        };
        let outcome = rebuild(&plan, &mut parts.state.notes)?;
        parts.state.saved_theming_config = outcome.saved_theming_config;
        Ok(())
    }
}
