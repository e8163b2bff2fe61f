use crate::context::Context;
use crate::error::Result;
use crate::steps::Step;
use crate::tools::skills::DEV_BROWSER_SKILL;
use crate::tools::{SkillStatus, Toolbox};

/// Installs the provider's auxiliary skill; `--skill-update` forces a rewrite
pub struct SkillsStep;

impl Step for SkillsStep {
    fn name(&self) -> &'static str {
        "Skills"
    }

    fn announce(&self, ctx: &Context) -> Option<String> {
        let prefs = ctx.prefs();
        if !prefs.skill_install_enabled {
            return None;
        }
        Some(if prefs.skill_update_enabled {
            "Updating skills...".to_string()
        } else {
            "Installing skills...".to_string()
        })
    }

    fn run(&self, ctx: &mut Context, tools: &Toolbox) -> Result<()> {
        let parts = ctx.parts();
        if !parts.prefs.skill_install_enabled {
            return Ok(());
        }

        let force = parts.prefs.skill_update_enabled;
        let result = tools.skills.install(&parts.paths.config_dir, DEV_BROWSER_SKILL, force);
        let notes = &mut parts.state.notes;
        match result.status {
            SkillStatus::Installed if force => notes.info(format!("{} skill updated", DEV_BROWSER_SKILL)),
            SkillStatus::Installed => notes.info(format!("{} skill installed", DEV_BROWSER_SKILL)),
            SkillStatus::AlreadyPresent => {
                if let Some(message) = result.message {
                    notes.info(message);
                }
            }
            SkillStatus::Failed => notes.warn(format!(
                "{} skill install failed: {}",
                DEV_BROWSER_SKILL,
                result.message.unwrap_or_default()
            )),
            SkillStatus::Removed | SkillStatus::NotPresent => {}
        }
        Ok(())
    }
}
