//! Shell profile env blocks
//!
//! Each variant owns one marked block in the profile:
//!
//! ```text
//! # cc-mirror: <name> >>>
//! export Z_AI_API_KEY="..."
//! # <<< cc-mirror: <name>
//! ```
//!
//! Rewriting replaces the block in place, so repeated runs never stack.

use std::path::{Path, PathBuf};

use crate::error::{Result, VariantError};
use crate::tools::ShellProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEnvStatus {
    Updated,
    Unchanged,
}

/// A shell profile file on disk
#[derive(Debug, Clone)]
pub struct ProfileFile {
    path: Option<PathBuf>,
}

impl ProfileFile {
    /// Pick the profile from `$SHELL`: `.zshrc`, `.bashrc`, else `.profile`
    pub fn detect() -> Self {
        let shell = std::env::var("SHELL").unwrap_or_default();
        Self {
            path: dirs::home_dir().map(|home| home.join(profile_name(&shell))),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn profile_name(shell: &str) -> &'static str {
    let shell = shell.rsplit('/').next().unwrap_or_default();
    match shell {
        "zsh" => ".zshrc",
        "bash" => ".bashrc",
        _ => ".profile",
    }
}

fn block_start(variant: &str) -> String {
    format!("# cc-mirror: {} >>>", variant)
}

fn block_end(variant: &str) -> String {
    format!("# <<< cc-mirror: {}", variant)
}

fn shell_quote(value: &str) -> String {
    format!(
        "\"{}\"",
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('$', "\\$")
            .replace('`', "\\`")
    )
}

fn render_block(variant: &str, env: &[(String, String)]) -> String {
    let mut block = block_start(variant);
    block.push('\n');
    for (key, value) in env {
        block.push_str(&format!("export {}={}\n", key, shell_quote(value)));
    }
    block.push_str(&block_end(variant));
    block
}

/// Replace the variant's block in `content`, or append one
pub fn upsert_block(content: &str, variant: &str, env: &[(String, String)]) -> String {
    let block = render_block(variant, env);
    let start = block_start(variant);
    let end = block_end(variant);

    if let Some(begin) = content.find(&start) {
        if let Some(offset) = content[begin..].find(&end) {
            let finish = begin + offset + end.len();
            return format!("{}{}{}", &content[..begin], block, &content[finish..]);
        }
    }

    let mut updated = content.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    if !updated.is_empty() {
        updated.push('\n');
    }
    updated.push_str(&block);
    updated.push('\n');
    updated
}

impl ShellProfile for ProfileFile {
    fn write_env(&self, variant: &str, env: &[(String, String)]) -> Result<ShellEnvStatus> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| VariantError::Config("could not determine the home directory".to_string()))?;

        let existing = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(VariantError::io(path, e)),
        };

        let updated = upsert_block(&existing, variant, env);
        if updated == existing {
            return Ok(ShellEnvStatus::Unchanged);
        }

        std::fs::write(path, updated).map_err(|e| VariantError::io(path, e))?;
        tracing::debug!(profile = %path.display(), variant, "shell env block written");
        Ok(ShellEnvStatus::Updated)
    }
}
