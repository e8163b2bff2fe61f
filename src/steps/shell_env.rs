use crate::context::Context;
use crate::error::Result;
use crate::settings::read_document;
use crate::steps::Step;
use crate::tools::{ShellEnvStatus, Toolbox};

/// Exports the provider's API key from the user's shell profile
pub struct ShellEnvStep;

fn api_key_env(ctx: &Context) -> Option<&'static str> {
    if !ctx.prefs().shell_env_enabled {
        return None;
    }
    ctx.provider().and_then(|p| p.api_key_env)
}

impl Step for ShellEnvStep {
    fn name(&self) -> &'static str {
        "ShellEnv"
    }

    fn announce(&self, ctx: &Context) -> Option<String> {
        api_key_env(ctx).map(|_| "Configuring shell environment...".to_string())
    }

    fn run(&self, ctx: &mut Context, tools: &Toolbox) -> Result<()> {
        let Some(var) = api_key_env(ctx) else {
            return Ok(());
        };

        let parts = ctx.parts();
        let notes = &mut parts.state.notes;
        let key = match read_document(&parts.paths.settings_path()) {
            Ok(doc) => doc
                .as_ref()
                .and_then(|d| d["env"][var].as_str())
                .filter(|k| !k.trim().is_empty())
                .map(str::to_string),
            Err(e) => {
                notes.warn(format!("Shell env skipped: could not read settings.json ({})", e));
                return Ok(());
            }
        };
        let Some(key) = key else {
            notes.warn(format!("Shell env skipped: {} is not set in settings.json", var));
            return Ok(());
        };

        match tools.shell_profile.write_env(parts.name, &[(var.to_string(), key)]) {
            Ok(ShellEnvStatus::Updated) => notes.info(format!("Shell env updated ({})", var)),
            Ok(ShellEnvStatus::Unchanged) => {}
            Err(e) => notes.warn(format!("Could not update shell profile ({})", e)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::fixtures::{create_context, create_options, toolbox_with, FakeTheming, RecordingProfile};
    use crate::tools::ShellProfile;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_writes_api_key_block() {
        let dir = TempDir::new().unwrap();
        let mut opts = create_options(dir.path(), "alpha", "zai");
        opts.api_key = Some("sk-zai".to_string());
        let mut ctx = create_context(&opts);
        let tools = toolbox_with(Arc::new(FakeTheming::ok()), Arc::new(RecordingProfile::default()));
        crate::steps::SettingsStep.run(&mut ctx, &tools).unwrap();

        let profile = Arc::new(RecordingProfile::default());
        let tools = toolbox_with(Arc::new(FakeTheming::ok()), profile.clone());
        ShellEnvStep.run(&mut ctx, &tools).unwrap();

        let writes = profile.writes.lock().unwrap();
        assert_eq!(
            *writes,
            vec![("alpha".to_string(), vec![("Z_AI_API_KEY".to_string(), "sk-zai".to_string())])]
        );
        assert!(ctx.state.notes.mentions("Shell env updated (Z_AI_API_KEY)"));
    }

    #[test]
    fn test_missing_key_is_warning() {
        let dir = TempDir::new().unwrap();
        let mut ctx = create_context(&create_options(dir.path(), "alpha", "zai"));
        let profile = Arc::new(RecordingProfile::default());
        let tools = toolbox_with(Arc::new(FakeTheming::ok()), profile.clone());

        ShellEnvStep.run(&mut ctx, &tools).unwrap();

        assert!(profile.writes.lock().unwrap().is_empty());
        assert_eq!(ctx.state.notes.warnings().count(), 1);
    }

    struct BrokenProfile;

    impl ShellProfile for BrokenProfile {
        fn write_env(&self, _variant: &str, _env: &[(String, String)]) -> Result<ShellEnvStatus> {
            Err(crate::error::VariantError::Config("profile is read-only".to_string()))
        }
    }

    #[test]
    fn test_profile_failure_is_warning_and_leaves_metadata() {
        let dir = TempDir::new().unwrap();
        let mut opts = create_options(dir.path(), "alpha", "zai");
        opts.api_key = Some("sk-zai".to_string());
        let mut ctx = create_context(&opts);
        let tools = toolbox_with(Arc::new(FakeTheming::ok()), Arc::new(RecordingProfile::default()));
        crate::steps::SettingsStep.run(&mut ctx, &tools).unwrap();
        let before = ctx.meta.clone();

        let mut tools = tools;
        tools.shell_profile = Arc::new(BrokenProfile);
        ShellEnvStep.run(&mut ctx, &tools).unwrap();

        assert_eq!(ctx.meta, before);
        assert!(ctx.state.notes.mentions("Could not update shell profile"));
        assert_eq!(ctx.state.notes.warnings().count(), 1);
    }

    #[test]
    fn test_disabled_for_provider_default() {
        let dir = TempDir::new().unwrap();
        let ctx = create_context(&create_options(dir.path(), "alpha", "minimax"));
        assert!(ShellEnvStep.announce(&ctx).is_none());
    }
}
