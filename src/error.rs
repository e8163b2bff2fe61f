//! Error types for variant pipelines
//!
//! Only fatal conditions live here. Anything a step can recover from is
//! recorded as a note instead (see [`crate::notes`]).

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Fatal errors raised while assembling or running a pipeline
#[derive(Debug, Error)]
pub enum VariantError {
    #[error("Variant not found: {name}")]
    NotFound { name: String },

    #[error("Variant already exists: {name} (use `update` instead)")]
    AlreadyExists { name: String },

    #[error("{}", format_theming_failure(.output))]
    ThemingFailed { output: String },

    #[error("npm install of {package} failed: {output}")]
    InstallFailed { package: String, output: String },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("{called}() called on a {mode} orchestrator")]
    ModeMismatch { mode: &'static str, called: &'static str },

    #[error("Could not access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VariantError>;

impl VariantError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        VariantError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        VariantError::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

fn format_theming_failure(output: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        return "tweakcc failed with no output. Re-run with --theming-stdio inherit to see details.".to_string();
    }
    let mut message = String::from("tweakcc failed:\n");
    message.push_str(output);
    if output.contains("Could not find") || output.contains("not found") {
        message.push_str("\n\nHint: the Claude Code install may be incomplete. Run `cc-mirror update` to rebuild it.");
    }
    message
}
