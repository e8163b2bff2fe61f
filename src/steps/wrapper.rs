use std::path::Path;

use crate::context::Context;
use crate::error::{Result, VariantError};
use crate::paths::{wrapper_path, wrapper_script_path, IS_WINDOWS};
use crate::steps::Step;
use crate::tools::Toolbox;

/// Writes the launcher a user runs to start the variant
pub struct WrapperStep;

fn sh_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

/// POSIX launcher: pins the config dirs, then execs the bundle
pub fn render_shell_wrapper(name: &str, config_dir: &Path, tweak_dir: &Path, binary: &Path) -> String {
    format!(
        "#!/usr/bin/env sh\n\
         # cc-mirror launcher for {name}\n\
         export CLAUDE_CONFIG_DIR={config}\n\
         export TWEAKCC_CONFIG_DIR={tweak}\n\
         exec node {binary} \"$@\"\n",
        name = name,
        config = sh_quote(config_dir),
        tweak = sh_quote(tweak_dir),
        binary = sh_quote(binary),
    )
}

fn render_cmd_shim(name: &str) -> String {
    format!("@echo off\r\nnode \"%~dp0{}.mjs\" %*\r\n", name)
}

fn render_node_script(config_dir: &Path, tweak_dir: &Path, binary: &Path) -> String {
    let js = |p: &Path| serde_json::Value::from(p.to_string_lossy().to_string()).to_string();
    format!(
        "import {{ spawnSync }} from 'node:child_process';\n\
         process.env.CLAUDE_CONFIG_DIR = {config};\n\
         process.env.TWEAKCC_CONFIG_DIR = {tweak};\n\
         const result = spawnSync(process.execPath, [{binary}, ...process.argv.slice(2)], {{ stdio: 'inherit' }});\n\
         process.exit(result.status ?? 1);\n",
        config = js(config_dir),
        tweak = js(tweak_dir),
        binary = js(binary),
    )
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| VariantError::io(path, e))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| VariantError::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

impl Step for WrapperStep {
    fn name(&self) -> &'static str {
        "Wrapper"
    }

    fn announce(&self, _ctx: &Context) -> Option<String> {
        Some("Writing CLI wrapper...".to_string())
    }

    fn run(&self, ctx: &mut Context, _tools: &Toolbox) -> Result<()> {
        let parts = ctx.parts();
        let Some(bin_dir) = parts.paths.bin_dir.as_deref() else {
            parts
                .state
                .notes
                .warn("No launcher directory recorded, skipping wrapper (pass --bin-dir)");
            return Ok(());
        };

        std::fs::create_dir_all(bin_dir).map_err(|e| VariantError::io(bin_dir, e))?;
        let meta = &*parts.meta;
        let launcher = wrapper_path(bin_dir, parts.name);

        if IS_WINDOWS {
            let script = wrapper_script_path(bin_dir, parts.name);
            write_file(&script, &render_node_script(&meta.config_dir, &meta.tweak_dir, &meta.binary_path))?;
            write_file(&launcher, &render_cmd_shim(parts.name))?;
        } else {
            write_file(
                &launcher,
                &render_shell_wrapper(parts.name, &meta.config_dir, &meta.tweak_dir, &meta.binary_path),
            )?;
            make_executable(&launcher)?;
        }

        tracing::debug!(launcher = %launcher.display(), "wrapper written");
        parts.meta.bin_dir = Some(bin_dir.to_path_buf());
        parts.state.wrapper_path = Some(launcher);
        Ok(())
    }
}
