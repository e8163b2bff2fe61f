//! npm-backed installer
//!
//! Uses the `npm` on `PATH` with an isolated `--prefix`, so every variant
//! gets its own `node_modules` tree.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, VariantError};
use crate::tools::Installer;

#[derive(Debug, Clone)]
pub struct NpmInstaller {
    program: String,
}

impl Default for NpmInstaller {
    fn default() -> Self {
        Self {
            program: if cfg!(windows) { "npm.cmd" } else { "npm" }.to_string(),
        }
    }
}

impl NpmInstaller {
    /// Use a specific npm executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn install_args(package: &str, version: &str, target_dir: &Path) -> Vec<String> {
        vec![
            "install".to_string(),
            "--prefix".to_string(),
            target_dir.to_string_lossy().to_string(),
            "--no-save".to_string(),
            "--no-audit".to_string(),
            "--no-fund".to_string(),
            "--loglevel=error".to_string(),
            format!("{}@{}", package, version),
        ]
    }
}

impl Installer for NpmInstaller {
    fn install(&self, package: &str, version: &str, target_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(target_dir).map_err(|e| VariantError::io(target_dir, e))?;

        let args = Self::install_args(package, version, target_dir);
        tracing::debug!(program = %self.program, args = ?args, "running npm");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| VariantError::InstallFailed {
                package: format!("{}@{}", package, version),
                output: format!("could not run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(VariantError::InstallFailed {
                package: format!("{}@{}", package, version),
                output: format!("{}\n{}", stderr, stdout).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args() {
        let args = NpmInstaller::install_args("@anthropic-ai/claude-code", "2.1.1", Path::new("/v/npm"));
        assert_eq!(args[0], "install");
        assert_eq!(args[1..3], ["--prefix".to_string(), "/v/npm".to_string()]);
        assert_eq!(args.last().map(String::as_str), Some("@anthropic-ai/claude-code@2.1.1"));
    }

    #[test]
    fn test_missing_program_is_install_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let installer = NpmInstaller::with_program("cc-mirror-definitely-not-npm");
        let err = installer
            .install("@anthropic-ai/claude-code", "2.1.1", &dir.path().join("npm"))
            .unwrap_err();
        assert!(matches!(err, VariantError::InstallFailed { .. }));
        assert!(dir.path().join("npm").is_dir());
    }
}
