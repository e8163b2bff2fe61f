use crate::context::Context;
use crate::error::{Result, VariantError};
use crate::steps::Step;
use crate::tools::tweakcc::ensure_theming_config;
use crate::tools::{PatchResult, Toolbox};

/// Runs the theming tool, then the prompt pack. A pack that changed files
/// triggers exactly one more tool run. A failing run aborts the pipeline.
pub struct ThemingStep;

fn checked(result: PatchResult) -> Result<PatchResult> {
    if result.success() {
        Ok(result)
    } else {
        Err(VariantError::ThemingFailed {
            output: result.combined_output(),
        })
    }
}

impl Step for ThemingStep {
    fn name(&self) -> &'static str {
        "Theming"
    }

    fn announce(&self, ctx: &Context) -> Option<String> {
        ctx.prefs()
            .theming_enabled
            .then(|| "Running tweakcc patches...".to_string())
    }

    fn run(&self, ctx: &mut Context, tools: &Toolbox) -> Result<()> {
        if !ctx.prefs().theming_enabled {
            return Ok(());
        }

        let reporter = ctx.reporter().clone();
        let parts = ctx.parts();
        let tweak_dir = &parts.paths.tweak_dir;
        let stdio = parts.prefs.command_stdio;
        let brand = parts.prefs.brand_key.clone();

        std::fs::create_dir_all(tweak_dir).map_err(|e| VariantError::io(tweak_dir, e))?;
        if let Err(e) = ensure_theming_config(&parts.paths.theming_config_path(), brand.as_deref()) {
            parts.state.notes.warn(format!("Could not prepare tweakcc config ({})", e));
        }
        parts.meta.brand = brand;

        let artifact = parts.meta.binary_path.clone();
        let first = tools.theming.run(tweak_dir, &artifact, stdio);
        parts.state.tweak_result = Some(first.clone());
        checked(first)?;

        if !parts.prefs.prompt_pack_enabled {
            return Ok(());
        }

        reporter.report("Applying prompt pack...");
        let pack = tools.prompt_pack.apply(tweak_dir, &parts.meta.provider);
        if !pack.changed {
            return Ok(());
        }
        parts
            .state
            .notes
            .info(format!("Prompt pack applied ({})", pack.updated.join(", ")));

        reporter.report("Re-applying tweakcc...");
        let reapplied = tools.theming.run(tweak_dir, &artifact, stdio);
        parts.state.tweak_result = Some(reapplied.clone());
        checked(reapplied)?;
        Ok(())
    }
}
