//! Path helpers shared by context assembly and the steps

use std::path::{Path, PathBuf};

pub const IS_WINDOWS: bool = cfg!(windows);

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// The launcher a user invokes to run a variant
pub fn wrapper_path(bin_dir: &Path, name: &str) -> PathBuf {
    if IS_WINDOWS {
        bin_dir.join(format!("{}.cmd", name))
    } else {
        bin_dir.join(name)
    }
}

/// Companion script the Windows `.cmd` shim delegates to
pub fn wrapper_script_path(bin_dir: &Path, name: &str) -> PathBuf {
    bin_dir.join(format!("{}.mjs", name))
}

/// Location of the entry-point bundle inside an npm install tree
pub fn artifact_path(npm_dir: &Path, package: &str) -> PathBuf {
    let mut path = npm_dir.join("node_modules");
    for segment in package.split('/') {
        path.push(segment);
    }
    path.join("cli.js")
}
