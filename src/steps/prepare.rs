use crate::context::Context;
use crate::error::{Result, VariantError};
use crate::meta::META_FILE;
use crate::steps::Step;
use crate::tools::Toolbox;

/// Creates the variant tree; refuses to build over an existing variant
pub struct PrepareStep;

impl Step for PrepareStep {
    fn name(&self) -> &'static str {
        "Prepare"
    }

    fn announce(&self, _ctx: &Context) -> Option<String> {
        Some("Preparing variant directories...".to_string())
    }

    fn run(&self, ctx: &mut Context, _tools: &Toolbox) -> Result<()> {
        let paths = ctx.paths();
        if paths.variant_dir.join(META_FILE).exists() {
            return Err(VariantError::AlreadyExists {
                name: ctx.name().to_string(),
            });
        }

        let mut dirs = vec![&paths.variant_dir, &paths.config_dir, &paths.tweak_dir];
        if let Some(bin_dir) = &paths.bin_dir {
            dirs.push(bin_dir);
        }
        for dir in dirs {
            std::fs::create_dir_all(dir).map_err(|e| VariantError::io(dir, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::fixtures::{create_context, create_options, toolbox};
    use tempfile::TempDir;

    #[test]
    fn test_prepare_creates_tree() {
        let dir = TempDir::new().unwrap();
        let mut ctx = create_context(&create_options(dir.path(), "alpha", "zai"));
        PrepareStep.run(&mut ctx, &toolbox()).unwrap();

        assert!(dir.path().join("alpha").join("config").is_dir());
        assert!(dir.path().join("alpha").join("tweakcc").is_dir());
        assert!(dir.path().join("bin").is_dir());
    }

    #[test]
    fn test_prepare_refuses_existing_variant() {
        let dir = TempDir::new().unwrap();
        let mut ctx = create_context(&create_options(dir.path(), "alpha", "zai"));
        ctx.meta.save(&dir.path().join("alpha")).unwrap();

        let err = PrepareStep.run(&mut ctx, &toolbox()).unwrap_err();
        assert!(matches!(err, VariantError::AlreadyExists { ref name } if name == "alpha"));
    }

    #[test]
    fn test_prepare_tolerates_leftover_dirs() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("alpha").join("npm")).unwrap();
        let mut ctx = create_context(&create_options(dir.path(), "alpha", "zai"));
        assert!(PrepareStep.run(&mut ctx, &toolbox()).is_ok());
    }
}
