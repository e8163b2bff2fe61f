//! tweakcc: the theming tool and its `config.json`

use serde_json::{json, Value};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::Result;
use crate::options::CommandStdio;
use crate::providers::ProviderCatalog;
use crate::settings::{array_entry, object_entry, read_document, root_object, write_document};
use crate::tools::{PatchResult, ThemingTool};

/// Toolset installed alongside team mode
pub const TEAM_TOOLSET: &str = "team";
pub const TEAM_BLOCKED_TOOLS: &[&str] = &["TodoWrite"];

/// Runs `npx tweakcc@<version> --apply` against one variant
#[derive(Debug, Clone)]
pub struct Tweakcc {
    version: String,
    program: String,
}

impl Tweakcc {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            program: if cfg!(windows) { "npx.cmd" } else { "npx" }.to_string(),
        }
    }

    /// Use a specific launcher instead of `npx`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, tweak_dir: &Path, artifact: &Path) -> Command {
        let package = format!("tweakcc@{}", self.version);
        let mut cmd = Command::new(&self.program);
        cmd.args(["--yes", package.as_str(), "--apply"])
            .env("TWEAKCC_CONFIG_DIR", tweak_dir)
            .env("TWEAKCC_CC_INSTALLATION_PATH", artifact);
        cmd
    }
}

impl ThemingTool for Tweakcc {
    fn run(&self, tweak_dir: &Path, artifact: &Path, stdio: CommandStdio) -> PatchResult {
        let mut cmd = self.command(tweak_dir, artifact);
        tracing::debug!(program = %self.program, version = %self.version, tweak_dir = %tweak_dir.display(), "running tweakcc");

        let spawn_failure = |e: std::io::Error| PatchResult {
            status: -1,
            stdout: None,
            stderr: Some(format!("could not run {}: {}", self.program, e)),
        };

        match stdio {
            CommandStdio::Pipe => match cmd.stdin(Stdio::null()).output() {
                Ok(output) => PatchResult {
                    status: output.status.code().unwrap_or(-1),
                    stdout: Some(String::from_utf8_lossy(&output.stdout).to_string()),
                    stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
                },
                Err(e) => spawn_failure(e),
            },
            CommandStdio::Inherit => match cmd.status() {
                Ok(status) => PatchResult {
                    status: status.code().unwrap_or(-1),
                    stdout: None,
                    stderr: None,
                },
                Err(e) => spawn_failure(e),
            },
        }
    }
}

/// Resolve `--brand`: absent or `auto` picks the provider's own theme,
/// `none` opts out, anything else must name a known theme.
pub fn resolve_brand_key(catalog: &ProviderCatalog, provider: &str, request: Option<&str>) -> Option<String> {
    match request.map(str::trim) {
        None | Some("") | Some("auto") => catalog.has_brand(provider).then(|| provider.to_string()),
        Some("none") => None,
        Some(key) if catalog.has_brand(key) => Some(key.to_string()),
        Some(key) => {
            tracing::warn!(brand = key, "unknown brand, falling back to default theme");
            None
        }
    }
}

/// Create `config.json` if absent and record the brand in it.
/// Returns whether the file was written.
pub fn ensure_theming_config(path: &Path, brand: Option<&str>) -> Result<bool> {
    let mut doc = match read_document(path)? {
        Some(doc) => doc,
        None => json!({ "settings": { "themes": [] } }),
    };
    let before = doc.clone();
    let existed = path.exists();

    let root = root_object(&mut doc, path)?;
    let settings = object_entry(root, "settings");
    array_entry(settings, "themes");
    if let Some(brand) = brand {
        settings.insert("brand".to_string(), Value::String(brand.to_string()));
    }

    if existed && doc == before {
        return Ok(false);
    }
    write_document(path, &doc)?;
    Ok(true)
}

/// Add the team toolset with TodoWrite blocked and make it the default,
/// creating the config if absent. Returns whether anything changed.
pub fn configure_team_toolset(path: &Path) -> Result<bool> {
    let mut doc = read_document(path)?.unwrap_or_else(|| json!({}));
    let before = doc.clone();
    let existed = path.exists();

    let root = root_object(&mut doc, path)?;
    let settings = object_entry(root, "settings");

    let toolset = json!({ "name": TEAM_TOOLSET, "blockedTools": TEAM_BLOCKED_TOOLS });
    let toolsets = array_entry(settings, "toolsets");
    match toolsets
        .iter_mut()
        .find(|t| t.get("name").and_then(Value::as_str) == Some(TEAM_TOOLSET))
    {
        Some(existing) => *existing = toolset,
        None => toolsets.push(toolset),
    }

    settings.insert("defaultToolset".to_string(), json!(TEAM_TOOLSET));
    settings.insert("planModeToolset".to_string(), json!(TEAM_TOOLSET));

    if existed && doc == before {
        return Ok(false);
    }
    write_document(path, &doc)?;
    Ok(true)
}
