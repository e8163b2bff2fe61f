//! Pipeline steps
//!
//! A step is stateless: everything it reads and writes lives in the
//! [`Context`] it is handed. The engine fires the step's progress label,
//! takes the one suspension point, then calls [`Step::run`].

mod finalize;
mod install;
mod model_overrides;
mod prepare;
mod rebuild;
mod settings;
mod shell_env;
mod skills;
mod team_mode;
mod theming;
mod wrapper;

pub use finalize::FinalizeStep;
pub use install::InstallStep;
pub use model_overrides::ModelOverridesStep;
pub use prepare::PrepareStep;
pub use rebuild::RebuildStep;
pub use settings::SettingsStep;
pub use shell_env::ShellEnvStep;
pub use skills::SkillsStep;
pub use team_mode::TeamModeStep;
pub use theming::ThemingStep;
pub use wrapper::WrapperStep;

use crate::context::Context;
use crate::error::Result;
use crate::tools::Toolbox;

pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    /// Progress label for this run, `None` if the step has nothing to do
    fn announce(&self, ctx: &Context) -> Option<String>;

    fn run(&self, ctx: &mut Context, tools: &Toolbox) -> Result<()>;
}
