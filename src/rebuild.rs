//! Directory rebuild
//!
//! Resets the install tree (and, when theming is in scope, the theming tree)
//! before a reinstall. The theming `config.json` is the one file carried
//! across the wipe. The config directory is never touched, so settings,
//! tasks and installed skills survive by omission.

use std::path::{Path, PathBuf};

use crate::error::{Result, VariantError};
use crate::notes::Notes;
use crate::paths::{wrapper_path, wrapper_script_path, IS_WINDOWS};

/// Inputs for one rebuild
#[derive(Debug, Clone)]
pub struct RebuildPlan<'a> {
    pub npm_dir: &'a Path,
    pub tweak_dir: &'a Path,
    pub bin_dir: Option<&'a Path>,
    pub name: &'a str,
    /// Reset the theming tree too
    pub theming: bool,
    pub settings_only: bool,
}

/// What the rebuild did
#[derive(Debug, Default)]
pub struct RebuildOutcome {
    /// Theming config bytes captured before the wipe
    pub saved_theming_config: Option<Vec<u8>>,
    pub removed: Vec<PathBuf>,
}

fn remove_tree(path: &Path, removed: &mut Vec<PathBuf>) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            removed.push(path.to_path_buf());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(VariantError::io(path, e)),
    }
}

fn remove_file(path: &Path, removed: &mut Vec<PathBuf>) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            removed.push(path.to_path_buf());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(VariantError::io(path, e)),
    }
}

/// Run the rebuild. A settings-only plan does nothing.
pub fn rebuild(plan: &RebuildPlan<'_>, notes: &mut Notes) -> Result<RebuildOutcome> {
    let mut outcome = RebuildOutcome::default();
    if plan.settings_only {
        return Ok(outcome);
    }

    let config_path = plan.tweak_dir.join("config.json");
    if plan.theming {
        outcome.saved_theming_config = match std::fs::read(&config_path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(VariantError::io(&config_path, e)),
        };
    }

    remove_tree(plan.npm_dir, &mut outcome.removed)?;
    if plan.theming {
        remove_tree(plan.tweak_dir, &mut outcome.removed)?;
    }

    if let Some(bin_dir) = plan.bin_dir {
        remove_file(&wrapper_path(bin_dir, plan.name), &mut outcome.removed)?;
        if IS_WINDOWS {
            remove_file(&wrapper_script_path(bin_dir, plan.name), &mut outcome.removed)?;
        }
    }

    if let Some(saved) = &outcome.saved_theming_config {
        std::fs::create_dir_all(plan.tweak_dir).map_err(|e| VariantError::io(plan.tweak_dir, e))?;
        std::fs::write(&config_path, saved).map_err(|e| VariantError::io(&config_path, e))?;
        notes.info("Preserved tweakcc config");
    }

    tracing::debug!(removed = outcome.removed.len(), "rebuild finished");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        npm: PathBuf,
        tweak: PathBuf,
        bin: PathBuf,
        config: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let variant = dir.path().join("alpha");
        let npm = variant.join("npm");
        let tweak = variant.join("tweakcc");
        let bin = dir.path().join("bin");
        let config = variant.join("config");

        std::fs::create_dir_all(npm.join("node_modules")).unwrap();
        std::fs::create_dir_all(tweak.join("system-prompts")).unwrap();
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::create_dir_all(config.join("skills").join("orchestration")).unwrap();
        std::fs::write(tweak.join("config.json"), b"{\"settings\":{\"brand\":\"zai\"}}\n").unwrap();
        std::fs::write(tweak.join("system-prompts").join("overlay.md"), "overlay").unwrap();
        std::fs::write(wrapper_path(&bin, "alpha"), "#!/bin/sh\n").unwrap();
        std::fs::write(config.join("settings.json"), "{}").unwrap();

        Fixture {
            _dir: dir,
            npm,
            tweak,
            bin,
            config,
        }
    }

    fn plan(f: &Fixture, theming: bool) -> RebuildPlan<'_> {
        RebuildPlan {
            npm_dir: &f.npm,
            tweak_dir: &f.tweak,
            bin_dir: Some(&f.bin),
            name: "alpha",
            theming,
            settings_only: false,
        }
    }

    fn files_under(dir: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(d) = stack.pop() {
            for entry in std::fs::read_dir(&d).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    out.push(path.strip_prefix(dir).unwrap().to_path_buf());
                }
            }
        }
        out.sort();
        out
    }

    #[test]
    fn test_rebuild_preserves_only_theming_config() {
        let f = fixture();
        let before = std::fs::read(f.tweak.join("config.json")).unwrap();
        let mut notes = Notes::default();

        let outcome = rebuild(&plan(&f, true), &mut notes).unwrap();

        assert_eq!(files_under(&f.tweak), vec![PathBuf::from("config.json")]);
        assert_eq!(std::fs::read(f.tweak.join("config.json")).unwrap(), before);
        assert_eq!(outcome.saved_theming_config.as_deref(), Some(before.as_slice()));
        assert!(!f.npm.exists());
        assert!(!wrapper_path(&f.bin, "alpha").exists());
        assert!(notes.mentions("Preserved tweakcc config"));
    }

    #[test]
    fn test_rebuild_without_theming_leaves_theming_tree() {
        let f = fixture();
        let before = files_under(&f.tweak);
        let mut notes = Notes::default();

        let outcome = rebuild(&plan(&f, false), &mut notes).unwrap();

        assert_eq!(files_under(&f.tweak), before);
        assert!(outcome.saved_theming_config.is_none());
        assert!(!f.npm.exists());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_rebuild_never_touches_config_dir() {
        let f = fixture();
        let before = files_under(&f.config);
        rebuild(&plan(&f, true), &mut Notes::default()).unwrap();
        assert_eq!(files_under(&f.config), before);
        assert!(f.config.join("skills").join("orchestration").is_dir());
    }

    #[test]
    fn test_rebuild_settings_only_is_noop() {
        let f = fixture();
        let mut p = plan(&f, true);
        p.settings_only = true;
        let outcome = rebuild(&p, &mut Notes::default()).unwrap();
        assert!(outcome.removed.is_empty());
        assert!(f.npm.exists());
        assert!(f.tweak.join("system-prompts").join("overlay.md").exists());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let f = fixture();
        rebuild(&plan(&f, true), &mut Notes::default()).unwrap();
        let second = rebuild(&plan(&f, true), &mut Notes::default()).unwrap();
        // only the restored config was there to remove
        assert_eq!(second.removed, vec![f.tweak.clone()]);
        assert_eq!(files_under(&f.tweak), vec![PathBuf::from("config.json")]);
    }

    #[test]
    fn test_rebuild_without_snapshot_adds_no_note() {
        let f = fixture();
        std::fs::remove_file(f.tweak.join("config.json")).unwrap();
        let mut notes = Notes::default();
        rebuild(&plan(&f, true), &mut notes).unwrap();
        assert!(!f.tweak.exists());
        assert!(notes.is_empty());
    }
}
