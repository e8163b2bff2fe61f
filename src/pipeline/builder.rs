use std::sync::Arc;

use crate::context::{Context, ExecutionMode, ProgressFn, Reporter};
use crate::error::Result;
use crate::options::CreateOptions;
use crate::pipeline::{ensure_mode, BuildResult, Pipeline};
use crate::providers::ProviderCatalog;
use crate::tools::Toolbox;

/// Creates new variants
///
/// The execution mode is fixed at construction. [`create`](Self::create) is
/// the blocking entry point and [`create_async`](Self::create_async) the
/// cooperative one; calling the other one fails with
/// [`VariantError::ModeMismatch`](crate::VariantError::ModeMismatch).
pub struct VariantBuilder {
    mode: ExecutionMode,
    catalog: ProviderCatalog,
    toolbox: Toolbox,
    on_progress: Option<ProgressFn>,
}

impl VariantBuilder {
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

    pub fn create(&self, opts: &CreateOptions) -> Result<BuildResult> {
        ensure_mode(self.mode, ExecutionMode::Blocking, "create")?;
        futures::executor::block_on(self.run(opts))
    }

    pub async fn create_async(&self, opts: &CreateOptions) -> Result<BuildResult> {
        ensure_mode(self.mode, ExecutionMode::Cooperative, "create_async")?;
        self.run(opts).await
    }

    async fn run(&self, opts: &CreateOptions) -> Result<BuildResult> {
        let reporter = Reporter::new(self.mode, self.on_progress.clone());
        let ctx = Context::for_create(opts, &self.catalog, reporter)?;
        tracing::info!(variant = %opts.name, provider = %opts.provider, mode = self.mode.as_str(), "creating variant");
        Pipeline::create().execute(ctx, &self.toolbox).await
    }
}
