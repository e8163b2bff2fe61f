use crate::context::{Context, ContextParts};
use crate::error::Result;
use crate::patch::{set_marker, PatchOutcome, TEAM_MODE_MARKER};
use crate::preferences::TeamModeAction;
use crate::settings::{array_entry, edit_document, object_entry, push_unique, set_if_absent};
use crate::steps::Step;
use crate::tools::skills::{ORCHESTRATION_SKILL, TASK_MANAGER_SKILL};
use crate::tools::team_pack::copy_team_pack_prompts;
use crate::tools::tweakcc::configure_team_toolset;
use crate::tools::{SkillStatus, Toolbox};

/// Permission auto-approved for team leads
pub const ORCHESTRATION_PERMISSION: &str = "Skill(orchestration)";

const TEAM_SKILLS: [(&str, &str); 2] = [
    (ORCHESTRATION_SKILL, "Multi-agent orchestrator skill"),
    (TASK_MANAGER_SKILL, "Task manager skill"),
];

/// Flips the team-mode marker in `cli.js` and wires up everything that
/// goes with it. Never fails the pipeline; problems become notes.
pub struct TeamModeStep;

impl Step for TeamModeStep {
    fn name(&self) -> &'static str {
        "TeamMode"
    }

    fn announce(&self, ctx: &Context) -> Option<String> {
        match ctx.prefs().team_mode {
            TeamModeAction::Enable => Some("Enabling team mode...".to_string()),
            TeamModeAction::Disable => Some("Disabling team mode...".to_string()),
            TeamModeAction::Skip => None,
        }
    }

    fn run(&self, ctx: &mut Context, tools: &Toolbox) -> Result<()> {
        let action = ctx.prefs().team_mode;
        match action {
            TeamModeAction::Enable => enable(ctx.parts(), tools),
            TeamModeAction::Disable => disable(ctx.parts(), tools),
            TeamModeAction::Skip => {}
        }
        Ok(())
    }
}

fn enable(parts: ContextParts<'_>, tools: &Toolbox) {
    let notes = &mut parts.state.notes;

    match set_marker(&parts.meta.binary_path, &TEAM_MODE_MARKER, true) {
        PatchOutcome::Applied => {}
        PatchOutcome::AlreadyInState => {
            notes.info("Team mode already enabled");
            parts.meta.team_mode_enabled = Some(true);
            return;
        }
        PatchOutcome::ArtifactMissing => {
            notes.warn("cli.js not found, skipping team mode patch");
            return;
        }
        PatchOutcome::NotPatchable => {
            notes.warn("Team mode function not found in cli.js, patch may not work");
            return;
        }
        PatchOutcome::VerificationFailed => {
            notes.warn("Team mode patch verification failed");
            return;
        }
        PatchOutcome::Failed { stage, error } => {
            notes.warn(format!("Team mode patch failed during {} ({})", stage, error));
            return;
        }
    }

    // Only an existing settings document gets the team flags
    let merged = edit_document(&parts.paths.settings_path(), false, |root| {
        let env = object_entry(root, "env");
        set_if_absent(env, "CLAUDE_CODE_TEAM_MODE", "1");
        set_if_absent(env, "CLAUDE_CODE_AGENT_TYPE", "team-lead");
        let allow = array_entry(object_entry(root, "permissions"), "allow");
        push_unique(allow, ORCHESTRATION_PERMISSION);
    });
    if merged.is_err() {
        notes.warn("Could not update settings.json with team env vars");
    }

    parts.meta.team_mode_enabled = Some(true);
    notes.info("Team mode enabled successfully");

    for (skill, label) in TEAM_SKILLS {
        let result = tools.skills.install(&parts.paths.config_dir, skill, false);
        match result.status {
            SkillStatus::Installed => notes.info(format!("{} installed", label)),
            SkillStatus::Failed => notes.warn(format!(
                "{} skill install failed: {}",
                skill,
                result.message.unwrap_or_default()
            )),
            _ => {}
        }
    }

    let copied = copy_team_pack_prompts(&parts.paths.system_prompts_dir());
    if !copied.is_empty() {
        notes.info(format!("Team pack prompts installed ({})", copied.join(", ")));
    }

    match configure_team_toolset(&parts.paths.theming_config_path()) {
        Ok(true) => notes.info("Team toolset configured (TodoWrite blocked)"),
        Ok(false) => {}
        Err(e) => notes.warn(format!("Could not configure team toolset ({})", e)),
    }
}

fn disable(parts: ContextParts<'_>, tools: &Toolbox) {
    let notes = &mut parts.state.notes;

    match set_marker(&parts.meta.binary_path, &TEAM_MODE_MARKER, false) {
        PatchOutcome::Applied => notes.info("Team mode disabled successfully"),
        PatchOutcome::AlreadyInState => notes.info("Team mode already disabled"),
        PatchOutcome::ArtifactMissing => notes.warn("cli.js not found, skipping team mode unpatch"),
        PatchOutcome::NotPatchable => notes.warn("Team mode function not found in cli.js"),
        PatchOutcome::VerificationFailed => notes.warn("Team mode unpatch verification failed"),
        PatchOutcome::Failed { stage, error } => {
            notes.warn(format!("Team mode unpatch failed during {} ({})", stage, error))
        }
    }
    parts.meta.team_mode_enabled = Some(false);

    // Removal runs whatever the marker flip did
    for (skill, label) in TEAM_SKILLS {
        let result = tools.skills.remove(&parts.paths.config_dir, skill);
        match result.status {
            SkillStatus::Removed => notes.info(format!("{} removed", label)),
            SkillStatus::Failed => notes.warn(format!(
                "{} skill removal failed: {}",
                skill,
                result.message.unwrap_or_default()
            )),
            _ => {}
        }
    }
}
