//! Provider prompt packs
//!
//! Overlay files written into `<tweakcc>/system-prompts/`. A file is only
//! rewritten when its content differs, so a second apply reports no change
//! and the theming tool is not re-run for nothing.

use serde::Serialize;
use std::path::Path;

use crate::tools::PromptPackApplier;

const ZAI_TOOL_POLICY: &str = r#"<!-- cc-mirror prompt pack: zai -->
# Tool policy

You are running on GLM through the Z.ai Coding Plan.

- Prefer the built-in Read, Edit and Grep tools over shell equivalents.
- Keep tool calls small and sequential; batch independent reads.
- When a web search is needed, use the `zai-web-search` MCP tool if configured.
"#;

const ZAI_OUTPUT_STYLE: &str = r#"<!-- cc-mirror prompt pack: zai -->
# Output style

Answer concisely. Show code changes as edits to files, not as chat text.
"#;

const MINIMAX_TOOL_POLICY: &str = r#"<!-- cc-mirror prompt pack: minimax -->
# Tool policy

You are running on MiniMax-M2.1 through MiniMax Cloud.

- Prefer the built-in Read, Edit and Grep tools over shell equivalents.
- Use the `minimax-web-search` MCP tool for lookups when it is configured.
"#;

const MINIMAX_OUTPUT_STYLE: &str = r#"<!-- cc-mirror prompt pack: minimax -->
# Output style

Answer concisely. Show code changes as edits to files, not as chat text.
"#;

/// Overlay files for a provider, `(file name, content)`
pub fn pack_files(provider: &str) -> &'static [(&'static str, &'static str)] {
    match provider {
        "zai" => &[
            ("zai-tool-policy.md", ZAI_TOOL_POLICY),
            ("zai-output-style.md", ZAI_OUTPUT_STYLE),
        ],
        "minimax" => &[
            ("minimax-tool-policy.md", MINIMAX_TOOL_POLICY),
            ("minimax-output-style.md", MINIMAX_OUTPUT_STYLE),
        ],
        _ => &[],
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromptPackResult {
    pub changed: bool,
    /// File names that were (re)written
    pub updated: Vec<String>,
}

/// The prompt packs compiled into cc-mirror
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledPromptPack;

impl PromptPackApplier for BundledPromptPack {
    fn apply(&self, tweak_dir: &Path, provider: &str) -> PromptPackResult {
        let files = pack_files(provider);
        if files.is_empty() {
            return PromptPackResult::default();
        }

        let dir = tweak_dir.join("system-prompts");
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "could not create prompt pack directory");
            return PromptPackResult::default();
        }

        let mut updated = Vec::new();
        for (file, content) in files {
            let path = dir.join(file);
            if std::fs::read_to_string(&path).is_ok_and(|existing| existing == *content) {
                continue;
            }
            match std::fs::write(&path, content) {
                Ok(()) => updated.push(file.to_string()),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not write prompt pack file"),
            }
        }

        PromptPackResult {
            changed: !updated.is_empty(),
            updated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_writes_then_reports_unchanged() {
        let dir = TempDir::new().unwrap();
        let first = BundledPromptPack.apply(dir.path(), "zai");
        assert!(first.changed);
        assert_eq!(first.updated, vec!["zai-tool-policy.md", "zai-output-style.md"]);
        assert!(dir.path().join("system-prompts").join("zai-tool-policy.md").is_file());

        let second = BundledPromptPack.apply(dir.path(), "zai");
        assert_eq!(second, PromptPackResult::default());
    }

    #[test]
    fn test_apply_restores_edited_file() {
        let dir = TempDir::new().unwrap();
        BundledPromptPack.apply(dir.path(), "minimax");
        let path = dir.path().join("system-prompts").join("minimax-output-style.md");
        std::fs::write(&path, "edited").unwrap();

        let result = BundledPromptPack.apply(dir.path(), "minimax");
        assert_eq!(result.updated, vec!["minimax-output-style.md"]);
    }

    #[test]
    fn test_provider_without_pack() {
        let dir = TempDir::new().unwrap();
        let result = BundledPromptPack.apply(dir.path(), "openrouter");
        assert!(!result.changed);
        assert!(!dir.path().join("system-prompts").exists());
    }
}
