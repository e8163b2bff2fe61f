use crate::context::Context;
use crate::error::Result;
use crate::paths::artifact_path;
use crate::steps::Step;
use crate::tools::Toolbox;

/// Installs the artifact tree and records where it landed
pub struct InstallStep;

impl Step for InstallStep {
    fn name(&self) -> &'static str {
        "Install"
    }

    fn announce(&self, ctx: &Context) -> Option<String> {
        if ctx.prefs().settings_only {
            return None;
        }
        let prefs = ctx.prefs();
        Some(format!("Installing {}@{}...", prefs.npm_package, prefs.npm_version))
    }

    fn run(&self, ctx: &mut Context, tools: &Toolbox) -> Result<()> {
        let parts = ctx.parts();
        if parts.prefs.settings_only {
            return Ok(());
        }

        let package = &parts.prefs.npm_package;
        let version = &parts.prefs.npm_version;
        tools.installer.install(package, version, &parts.paths.npm_dir)?;

        let meta = parts.meta;
        meta.binary_path = artifact_path(&parts.paths.npm_dir, package);
        meta.claude_orig = format!("npm:{}@{}", package, version);
        meta.npm_dir = Some(parts.paths.npm_dir.clone());
        meta.npm_package = Some(package.clone());
        meta.npm_version = Some(version.clone());
        tracing::debug!(binary = %meta.binary_path.display(), "artifact installed");
        Ok(())
    }
}
