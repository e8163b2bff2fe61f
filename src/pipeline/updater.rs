use std::path::Path;
use std::sync::Arc;

use crate::context::{Context, ExecutionMode, ProgressFn, Reporter};
use crate::error::Result;
use crate::options::UpdateOptions;
use crate::pipeline::{ensure_mode, BuildResult, Pipeline};
use crate::providers::ProviderCatalog;
use crate::tools::Toolbox;

/// Rebuilds existing variants in place, keeping their config directory
pub struct VariantUpdater {
    mode: ExecutionMode,
    catalog: ProviderCatalog,
    toolbox: Toolbox,
    on_progress: Option<ProgressFn>,
}

impl VariantUpdater {
    pub fn new(mode: ExecutionMode, toolbox: Toolbox) -> Self {
        Self {
            mode,
            catalog: ProviderCatalog::builtin(),
            toolbox,
            on_progress: None,
        }
    }

    pub fn with_catalog(mut self, catalog: ProviderCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_progress(mut self, on_progress: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(on_progress));
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Blocking update of `root/name`
    pub fn update(&self, root: &Path, name: &str, opts: &UpdateOptions) -> Result<BuildResult> {
        ensure_mode(self.mode, ExecutionMode::Blocking, "update")?;
        futures::executor::block_on(self.run(root, name, opts))
    }

    pub async fn update_async(&self, root: &Path, name: &str, opts: &UpdateOptions) -> Result<BuildResult> {
        ensure_mode(self.mode, ExecutionMode::Cooperative, "update_async")?;
        self.run(root, name, opts).await
    }

    async fn run(&self, root: &Path, name: &str, opts: &UpdateOptions) -> Result<BuildResult> {
        let reporter = Reporter::new(self.mode, self.on_progress.clone());
        let ctx = Context::for_update(root, name, opts, &self.catalog, reporter)?;
        tracing::info!(variant = name, mode = self.mode.as_str(), "updating variant");
        Pipeline::update().execute(ctx, &self.toolbox).await
    }
}
