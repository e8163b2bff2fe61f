//! Configuration file support for cc-mirror
//!
//! Reads from `<root>/config.toml`. Every key is optional; a missing or
//! unreadable file falls back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::options::CommandStdio;
use crate::paths::expand_tilde;

/// Directory (under `$HOME`) holding one subdirectory per variant
pub const DEFAULT_ROOT_DIR: &str = ".cc-mirror";
/// Directory (under `$HOME`) for generated launchers
pub const DEFAULT_BIN_DIR: &str = ".local/bin";
pub const DEFAULT_NPM_PACKAGE: &str = "@anthropic-ai/claude-code";
pub const DEFAULT_NPM_VERSION: &str = "2.1.1";
pub const TWEAKCC_VERSION: &str = "3.2.2";

/// Configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Defaults applied when the command line leaves a value out
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Theming tool settings
    #[serde(default)]
    pub theming: ThemingConfig,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct DefaultsConfig {
    /// Launcher directory override (e.g. "~/bin")
    #[serde(default)]
    pub bin_dir: Option<String>,

    /// npm package to install instead of the stock Claude Code package
    #[serde(default)]
    pub npm_package: Option<String>,

    /// Output capture for the theming tool: "pipe" or "inherit"
    #[serde(default)]
    pub theming_stdio: Option<CommandStdio>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ThemingConfig {
    /// Pinned tweakcc version
    /// Default: TWEAKCC_VERSION
    #[serde(default = "default_tweakcc_version")]
    pub version: String,
}

fn default_tweakcc_version() -> String {
    TWEAKCC_VERSION.to_string()
}

impl Default for ThemingConfig {
    fn default() -> Self {
        Self {
            version: default_tweakcc_version(),
        }
    }
}

impl Config {
    /// Load config from `<root>/config.toml`
    /// Returns default config if the file doesn't exist or can't be parsed
    pub fn load(root: &Path) -> Self {
        let path = root.join("config.toml");
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config.toml");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read config.toml");
                Self::default()
            }
        }
    }

    /// Launcher directory from config, if set
    pub fn bin_dir(&self) -> Option<PathBuf> {
        self.defaults.bin_dir.as_deref().map(expand_tilde)
    }
}

/// `~/.cc-mirror`
pub fn default_root() -> PathBuf {
    home_dir().join(DEFAULT_ROOT_DIR)
}

/// `~/.local/bin`
pub fn default_bin_dir() -> PathBuf {
    home_dir().join(DEFAULT_BIN_DIR)
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
