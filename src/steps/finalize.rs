use crate::context::{Context, PipelineKind};
use crate::error::Result;
use crate::steps::Step;
use crate::tools::Toolbox;

/// Records the resolved preferences and persists `variant.json`
pub struct FinalizeStep;

impl Step for FinalizeStep {
    fn name(&self) -> &'static str {
        "Finalize"
    }

    fn announce(&self, _ctx: &Context) -> Option<String> {
        Some("Finalizing variant...".to_string())
    }

    fn run(&self, ctx: &mut Context, _tools: &Toolbox) -> Result<()> {
        let parts = ctx.parts();
        let prefs = parts.prefs;
        let meta = parts.meta;

        meta.prompt_pack = Some(prefs.prompt_pack_preference);
        meta.skill_install = Some(prefs.skill_install_enabled);
        meta.shell_env = Some(prefs.shell_env_enabled);
        if meta.bin_dir.is_none() {
            meta.bin_dir = parts.paths.bin_dir.clone();
        }
        if parts.kind == PipelineKind::Update {
            meta.updated_at = Some(chrono::Utc::now().to_rfc3339());
        }

        meta.save(&parts.paths.variant_dir)?;
        tracing::debug!(variant = %meta.name, "metadata saved");
        Ok(())
    }
}
