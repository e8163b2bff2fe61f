//! Per-run pipeline context
//!
//! One [`Context`] is the unit of work for a single create or update run.
//! Paths and preferences are resolved once, before the first step, and are
//! only handed out by shared reference afterwards; steps mutate `meta` and
//! `state` alone.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, VariantError};
use crate::meta::VariantMeta;
use crate::notes::Notes;
use crate::options::{CreateOptions, UpdateOptions};
use crate::paths::{artifact_path, expand_tilde, wrapper_path};
use crate::preferences::Preferences;
use crate::providers::{ProviderCatalog, ProviderTemplate};
use crate::tools::PatchResult;

/// Progress callback, invoked with a short human-readable step label
pub type ProgressFn = Arc<dyn Fn(&str) + Send + Sync>;

/// How an orchestrator drives its steps. Chosen once per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Run every step to completion on the caller's thread
    Blocking,
    /// Yield to the host scheduler once per step so a UI can redraw
    Cooperative,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Blocking => "blocking",
            ExecutionMode::Cooperative => "cooperative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Create,
    Update,
}

/// Progress channel for one run
#[derive(Clone)]
pub struct Reporter {
    mode: ExecutionMode,
    on_progress: Option<ProgressFn>,
}

impl Reporter {
    pub fn new(mode: ExecutionMode, on_progress: Option<ProgressFn>) -> Self {
        Self { mode, on_progress }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Fire the callback without suspending
    pub fn report(&self, label: &str) {
        tracing::debug!(progress = label);
        if let Some(cb) = &self.on_progress {
            cb(label);
        }
    }

    /// The per-step suspension point. A no-op in blocking mode.
    pub async fn suspend(&self) {
        if self.mode == ExecutionMode::Cooperative {
            tokio::task::yield_now().await;
        }
    }
}

/// Filesystem locations for one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: PathBuf,
    pub variant_dir: PathBuf,
    pub config_dir: PathBuf,
    pub tweak_dir: PathBuf,
    pub npm_dir: PathBuf,
    /// Launcher directory; an update may run without one
    pub bin_dir: Option<PathBuf>,
}

impl Paths {
    /// Layout of a brand-new variant under `root`
    pub fn for_new_variant(root: &Path, name: &str, bin_dir: &Path) -> Self {
        let variant_dir = root.join(name);
        Self {
            root: root.to_path_buf(),
            config_dir: variant_dir.join("config"),
            tweak_dir: variant_dir.join("tweakcc"),
            npm_dir: variant_dir.join("npm"),
            bin_dir: Some(bin_dir.to_path_buf()),
            variant_dir,
        }
    }

    /// Layout of an existing variant, as recorded in its metadata
    pub fn for_existing_variant(root: &Path, name: &str, meta: &VariantMeta, bin_dir: Option<PathBuf>) -> Self {
        let variant_dir = root.join(name);
        Self {
            root: root.to_path_buf(),
            config_dir: meta.config_dir.clone(),
            tweak_dir: meta.tweak_dir.clone(),
            npm_dir: meta.npm_dir.clone().unwrap_or_else(|| variant_dir.join("npm")),
            bin_dir: bin_dir.or_else(|| meta.bin_dir.clone()),
            variant_dir,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    pub fn theming_config_path(&self) -> PathBuf {
        self.tweak_dir.join("config.json")
    }

    pub fn system_prompts_dir(&self) -> PathBuf {
        self.tweak_dir.join("system-prompts")
    }

    pub fn wrapper_path(&self, name: &str) -> Option<PathBuf> {
        self.bin_dir.as_deref().map(|bin| wrapper_path(bin, name))
    }
}

/// Mutable scratch state accumulated by the steps
#[derive(Debug, Default)]
pub struct State {
    pub notes: Notes,
    /// Outcome of the last theming tool run; `None` if theming was skipped
    pub tweak_result: Option<PatchResult>,
    /// Theming config captured by the rebuild step before the wipe
    pub saved_theming_config: Option<Vec<u8>>,
    /// Launcher written by this run
    pub wrapper_path: Option<PathBuf>,
}

/// Split borrow of a context: read-only inputs next to the mutable parts
pub struct ContextParts<'a> {
    pub name: &'a str,
    pub kind: PipelineKind,
    pub provider: Option<&'a ProviderTemplate>,
    pub paths: &'a Paths,
    pub prefs: &'a Preferences,
    pub meta: &'a mut VariantMeta,
    pub state: &'a mut State,
}

/// Everything one pipeline run reads and writes
pub struct Context {
    name: String,
    kind: PipelineKind,
    provider: Option<ProviderTemplate>,
    paths: Paths,
    prefs: Preferences,
    reporter: Reporter,
    pub meta: VariantMeta,
    pub state: State,
}

impl Context {
    /// Assemble the context for creating `opts.name`
    pub fn for_create(opts: &CreateOptions, catalog: &ProviderCatalog, reporter: Reporter) -> Result<Self> {
        opts.validate()?;
        let provider = catalog
            .get(&opts.provider)
            .cloned()
            .ok_or_else(|| VariantError::InvalidOptions(format!("unknown provider '{}'", opts.provider)))?;

        let prefs = Preferences::for_create(opts, catalog);
        let paths = Paths::for_new_variant(&opts.root, &opts.name, &opts.bin_dir);

        let meta = VariantMeta {
            name: opts.name.clone(),
            provider: opts.provider.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            updated_at: None,
            claude_orig: format!("npm:{}@{}", prefs.npm_package, prefs.npm_version),
            binary_path: artifact_path(&paths.npm_dir, &prefs.npm_package),
            config_dir: paths.config_dir.clone(),
            tweak_dir: paths.tweak_dir.clone(),
            bin_dir: paths.bin_dir.clone(),
            npm_dir: Some(paths.npm_dir.clone()),
            npm_package: Some(prefs.npm_package.clone()),
            npm_version: Some(prefs.npm_version.clone()),
            brand: None,
            // An explicit opt-out is kept; an enable is recorded by the team mode step
            team_mode_enabled: opts.team_mode.filter(|enabled| !enabled),
            prompt_pack: Some(prefs.prompt_pack_preference),
            skill_install: Some(prefs.skill_install_enabled),
            shell_env: Some(prefs.shell_env_enabled),
            model_overrides: opts.model_overrides.clone(),
        };

        Ok(Self {
            name: opts.name.clone(),
            kind: PipelineKind::Create,
            provider: Some(provider),
            paths,
            prefs,
            reporter,
            meta,
            state: State::default(),
        })
    }

    /// Assemble the context for updating the existing variant `name`
    pub fn for_update(
        root: &Path,
        name: &str,
        opts: &UpdateOptions,
        catalog: &ProviderCatalog,
        reporter: Reporter,
    ) -> Result<Self> {
        opts.validate(name)?;
        let variant_dir = root.join(name);
        let meta = VariantMeta::load(&variant_dir)?.ok_or_else(|| VariantError::NotFound {
            name: name.to_string(),
        })?;

        let provider = catalog.get(&meta.provider).cloned();
        if provider.is_none() {
            tracing::warn!(provider = %meta.provider, "variant uses an unknown provider");
        }

        let bin_dir = opts
            .bin_dir
            .as_ref()
            .map(|p| expand_tilde(&p.to_string_lossy()));
        let paths = Paths::for_existing_variant(root, name, &meta, bin_dir);
        let prefs = Preferences::for_update(opts, &meta, catalog);

        Ok(Self {
            name: name.to_string(),
            kind: PipelineKind::Update,
            provider,
            paths,
            prefs,
            reporter,
            meta,
            state: State::default(),
        })
    }

    /// Build a context from already-resolved parts
    pub fn from_parts(
        name: &str,
        kind: PipelineKind,
        provider: Option<ProviderTemplate>,
        paths: Paths,
        prefs: Preferences,
        meta: VariantMeta,
        reporter: Reporter,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            provider,
            paths,
            prefs,
            reporter,
            meta,
            state: State::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn provider(&self) -> Option<&ProviderTemplate> {
        self.provider.as_ref()
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Fire the progress callback for a sub-point inside a step
    pub fn report(&self, label: &str) {
        self.reporter.report(label);
    }

    pub fn parts(&mut self) -> ContextParts<'_> {
        ContextParts {
            name: &self.name,
            kind: self.kind,
            provider: self.provider.as_ref(),
            paths: &self.paths,
            prefs: &self.prefs,
            meta: &mut self.meta,
            state: &mut self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::sample_meta;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn blocking() -> Reporter {
        Reporter::new(ExecutionMode::Blocking, None)
    }

    #[test]
    fn test_update_context_for_missing_variant() {
        let dir = TempDir::new().unwrap();
        let err = Context::for_update(
            dir.path(),
            "ghost",
            &UpdateOptions::default(),
            &ProviderCatalog::builtin(),
            blocking(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, VariantError::NotFound { ref name } if name == "ghost"));
    }

    #[test]
    fn test_update_context_uses_metadata_paths() {
        let dir = TempDir::new().unwrap();
        let variant_dir = dir.path().join("alpha");
        let mut meta = sample_meta(&variant_dir, "alpha", "zai");
        meta.bin_dir = Some(dir.path().join("bin"));
        meta.brand = Some("zai".to_string());
        meta.save(&variant_dir).unwrap();

        let ctx = Context::for_update(
            dir.path(),
            "alpha",
            &UpdateOptions::default(),
            &ProviderCatalog::builtin(),
            blocking(),
        )
        .unwrap();

        assert_eq!(ctx.kind(), PipelineKind::Update);
        assert_eq!(ctx.paths().config_dir, variant_dir.join("config"));
        assert_eq!(ctx.paths().npm_dir, variant_dir.join("npm"));
        assert_eq!(ctx.paths().bin_dir, Some(dir.path().join("bin")));
        assert_eq!(ctx.prefs().brand_key.as_deref(), Some("zai"));
        assert_eq!(ctx.provider().map(|p| p.key), Some("zai"));
    }

    #[test]
    fn test_explicit_bin_dir_overrides_metadata() {
        let dir = TempDir::new().unwrap();
        let variant_dir = dir.path().join("alpha");
        let mut meta = sample_meta(&variant_dir, "alpha", "zai");
        meta.bin_dir = Some(dir.path().join("old-bin"));
        meta.save(&variant_dir).unwrap();

        let opts = UpdateOptions {
            bin_dir: Some(dir.path().join("new-bin")),
            ..Default::default()
        };
        let ctx = Context::for_update(dir.path(), "alpha", &opts, &ProviderCatalog::builtin(), blocking()).unwrap();
        assert_eq!(ctx.paths().bin_dir, Some(dir.path().join("new-bin")));
    }

    #[test]
    fn test_create_context_rejects_unknown_provider() {
        let opts = CreateOptions {
            name: "alpha".to_string(),
            provider: "nope".to_string(),
            ..Default::default()
        };
        let err = Context::for_create(&opts, &ProviderCatalog::builtin(), blocking()).err().unwrap();
        assert!(matches!(err, VariantError::InvalidOptions(_)));
    }

    #[test]
    fn test_create_context_seeds_metadata() {
        let dir = TempDir::new().unwrap();
        let opts = CreateOptions {
            name: "alpha".to_string(),
            provider: "zai".to_string(),
            root: dir.path().to_path_buf(),
            bin_dir: dir.path().join("bin"),
            ..Default::default()
        };
        let ctx = Context::for_create(&opts, &ProviderCatalog::builtin(), blocking()).unwrap();
        assert_eq!(ctx.meta.claude_orig, "npm:@anthropic-ai/claude-code@2.1.1");
        assert!(ctx.meta.binary_path.ends_with("node_modules/@anthropic-ai/claude-code/cli.js"));
        assert_eq!(ctx.meta.team_mode_enabled, None);
        assert_eq!(ctx.paths().wrapper_path("alpha"), Some(crate::paths::wrapper_path(&dir.path().join("bin"), "alpha")));
    }

    #[test]
    fn test_create_context_records_team_mode_opt_out() {
        let dir = TempDir::new().unwrap();
        let mut opts = CreateOptions {
            name: "alpha".to_string(),
            provider: "mirror".to_string(),
            root: dir.path().to_path_buf(),
            bin_dir: dir.path().join("bin"),
            team_mode: Some(false),
            ..Default::default()
        };
        let ctx = Context::for_create(&opts, &ProviderCatalog::builtin(), blocking()).unwrap();
        assert_eq!(ctx.meta.team_mode_enabled, Some(false));

        opts.team_mode = Some(true);
        let ctx = Context::for_create(&opts, &ProviderCatalog::builtin(), blocking()).unwrap();
        assert_eq!(ctx.meta.team_mode_enabled, None);
    }

    #[test]
    fn test_reporter_invokes_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = Reporter::new(
            ExecutionMode::Blocking,
            Some(Arc::new(move |label: &str| sink.lock().unwrap().push(label.to_string()))),
        );
        reporter.report("Installing...");
        futures::executor::block_on(reporter.suspend());
        assert_eq!(*seen.lock().unwrap(), vec!["Installing...".to_string()]);
    }
}
