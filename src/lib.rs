//! cc-mirror - isolated, themed variants of the Claude Code CLI
//!
//! Each variant gets its own npm install tree, config directory, tweakcc
//! theming directory and launcher, so several differently configured copies
//! can live side by side.
//!
//! # Layout
//!
//! | Path | Content |
//! |------|---------|
//! | `<root>/<name>/variant.json` | Persisted [`VariantMeta`] |
//! | `<root>/<name>/npm/` | Install tree holding `cli.js` |
//! | `<root>/<name>/tweakcc/` | Theming config and prompt overlays |
//! | `<root>/<name>/config/` | `settings.json`, tasks, skills |
//! | `<bin>/<name>` | Launcher |
//!
//! # Quick Start
//!
//! ```no_run
//! use cc_mirror::{CreateOptions, ExecutionMode, Toolbox, VariantBuilder, TWEAKCC_VERSION};
//!
//! let builder = VariantBuilder::new(ExecutionMode::Blocking, Toolbox::system(TWEAKCC_VERSION))
//!     .with_progress(|label| eprintln!("{}", label));
//!
//! let result = builder
//!     .create(&CreateOptions {
//!         name: "zai".to_string(),
//!         provider: "zai".to_string(),
//!         root: cc_mirror::config::default_root(),
//!         bin_dir: cc_mirror::config::default_bin_dir(),
//!         team_mode: Some(true),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! for note in result.notes.unwrap_or_default() {
//!     println!("{}", note);
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod meta;
pub mod notes;
pub mod options;
pub mod patch;
pub mod paths;
pub mod pipeline;
pub mod preferences;
pub mod providers;
pub mod rebuild;
pub mod settings;
pub mod steps;
pub mod tools;

pub use config::{Config, DEFAULT_NPM_PACKAGE, DEFAULT_NPM_VERSION, TWEAKCC_VERSION};
pub use context::{Context, ExecutionMode, PipelineKind, ProgressFn};
pub use error::{Result, VariantError};
pub use meta::{list_variants, VariantEntry, VariantMeta};
pub use notes::{Note, NoteKind, Notes};
pub use options::{CommandStdio, CreateOptions, ModelOverrides, UpdateOptions};
pub use patch::{set_marker, Marker, PatchOutcome, TEAM_MODE_MARKER};
pub use pipeline::{BuildResult, Pipeline, VariantBuilder, VariantUpdater};
pub use providers::{ProviderCatalog, ProviderTemplate};
pub use tools::{PatchResult, Toolbox};
