//! Step pipelines
//!
//! A [`Pipeline`] is a fixed, ordered list of steps for one
//! [`PipelineKind`]. The same async loop drives both execution modes: in
//! blocking mode it is polled to completion with `block_on` and the
//! suspension point is a no-op, in cooperative mode each step yields once to
//! the host runtime after its progress label fires. A step with no label
//! still takes its suspension point.
//!
//! Errors abort the remaining steps immediately. Nothing is rolled back;
//! every step is safe to re-run, so the recovery path is to retry.

mod builder;
mod updater;

pub use builder::VariantBuilder;
pub use updater::VariantUpdater;

use serde::Serialize;
use std::path::PathBuf;

use crate::context::{Context, ExecutionMode, PipelineKind};
use crate::error::{Result, VariantError};
use crate::meta::VariantMeta;
use crate::notes::Note;
use crate::steps::{
    FinalizeStep, InstallStep, ModelOverridesStep, PrepareStep, RebuildStep, SettingsStep, ShellEnvStep,
    SkillsStep, Step, TeamModeStep, ThemingStep, WrapperStep,
};
use crate::tools::{PatchResult, Toolbox};

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub meta: VariantMeta,
    pub wrapper_path: Option<PathBuf>,
    /// Last theming tool run; `None` when theming was skipped
    pub tweak_result: Option<PatchResult>,
    /// `None` when nothing was noted
    pub notes: Option<Vec<Note>>,
}

impl BuildResult {
    fn from_context(ctx: Context) -> Self {
        let Context { meta, state, .. } = ctx;
        Self {
            meta,
            wrapper_path: state.wrapper_path,
            tweak_result: state.tweak_result,
            notes: state.notes.into_report(),
        }
    }
}

pub struct Pipeline {
    kind: PipelineKind,
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    /// Settings are written before team mode so the team flags have a
    /// document to land in.
    pub fn create() -> Self {
        Self::from_steps(
            PipelineKind::Create,
            vec![
                Box::new(PrepareStep),
                Box::new(InstallStep),
                Box::new(SettingsStep),
                Box::new(TeamModeStep),
                Box::new(ModelOverridesStep),
                Box::new(ThemingStep),
                Box::new(WrapperStep),
                Box::new(ShellEnvStep),
                Box::new(SkillsStep),
                Box::new(FinalizeStep),
            ],
        )
    }

    pub fn update() -> Self {
        Self::from_steps(
            PipelineKind::Update,
            vec![
                Box::new(RebuildStep),
                Box::new(InstallStep),
                Box::new(TeamModeStep),
                Box::new(ModelOverridesStep),
                Box::new(ThemingStep),
                Box::new(WrapperStep),
                Box::new(SettingsStep),
                Box::new(ShellEnvStep),
                Box::new(SkillsStep),
                Box::new(FinalizeStep),
            ],
        )
    }

    pub fn from_steps(kind: PipelineKind, steps: Vec<Box<dyn Step>>) -> Self {
        Self { kind, steps }
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order against `ctx`
    pub async fn run(&self, ctx: &mut Context, tools: &Toolbox) -> Result<()> {
        for step in &self.steps {
            tracing::debug!(step = step.name(), kind = ?self.kind, "running step");
            if let Some(label) = step.announce(ctx) {
                ctx.report(&label);
            }
            ctx.reporter().suspend().await;
            step.run(ctx, tools)?;
        }
        Ok(())
    }

    /// Run and assemble the result
    pub async fn execute(&self, mut ctx: Context, tools: &Toolbox) -> Result<BuildResult> {
        self.run(&mut ctx, tools).await?;
        Ok(BuildResult::from_context(ctx))
    }
}

/// Fail fast when an entry point does not match the configured mode
fn ensure_mode(configured: ExecutionMode, expected: ExecutionMode, called: &'static str) -> Result<()> {
    if configured == expected {
        Ok(())
    } else {
        Err(VariantError::ModeMismatch {
            mode: configured.as_str(),
            called,
        })
    }
}
