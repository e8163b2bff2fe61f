//! Bundled skills
//!
//! Each skill lives under `<config>/skills/<name>/` with a `SKILL.md` and a
//! `.cc-mirror-managed` marker. Only marked bundles are ever removed or
//! overwritten; a user's own skill with the same name is left alone.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::tools::SkillManager;

pub const ORCHESTRATION_SKILL: &str = "orchestration";
pub const TASK_MANAGER_SKILL: &str = "task-manager";
pub const DEV_BROWSER_SKILL: &str = "dev-browser";

const MANAGED_MARKER: &str = ".cc-mirror-managed";

const ORCHESTRATION_MD: &str = r#"---
name: orchestration
description: Coordinate a team of agents through the shared task list. Use when a request spans several independent pieces of work.
---

# Multi-agent orchestration

1. Break the request into tasks with TaskCreate. One task per independent unit.
2. Record dependencies between tasks so workers pick them up in order.
3. Spawn workers for tasks that can run in parallel.
4. Track progress with TaskList and TaskGet; close tasks with TaskUpdate.
5. Summarize the finished work for the user once every task is done.
"#;

const TASK_MANAGER_MD: &str = r#"---
name: task-manager
description: Create, inspect and update tasks in the team task store.
---

# Task manager

- `TaskCreate` adds a task with a title, description and optional blockers.
- `TaskList` shows open tasks; `TaskGet` shows one task in full.
- `TaskUpdate` changes status (`pending`, `in_progress`, `done`) and notes.

TodoWrite is disabled in team mode. Use the task tools instead.
"#;

const DEV_BROWSER_MD: &str = r#"---
name: dev-browser
description: Drive a local browser to check web UI changes. Use when asked to verify a page renders or behaves correctly.
---

# Dev browser

Start the dev server, open the page, and report what you see. Take a
screenshot before and after each interaction you were asked to verify.
"#;

fn skill_content(skill: &str) -> Option<&'static str> {
    match skill {
        ORCHESTRATION_SKILL => Some(ORCHESTRATION_MD),
        TASK_MANAGER_SKILL => Some(TASK_MANAGER_MD),
        DEV_BROWSER_SKILL => Some(DEV_BROWSER_MD),
        _ => None,
    }
}

pub fn skill_dir(config_dir: &Path, skill: &str) -> PathBuf {
    config_dir.join("skills").join(skill)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillStatus {
    Installed,
    AlreadyPresent,
    Removed,
    NotPresent,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillResult {
    pub status: SkillStatus,
    pub message: Option<String>,
}

impl SkillResult {
    fn new(status: SkillStatus) -> Self {
        Self { status, message: None }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            status: SkillStatus::Failed,
            message: Some(message.into()),
        }
    }
}

/// The skills compiled into cc-mirror
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSkills;

impl SkillManager for BundledSkills {
    fn install(&self, config_dir: &Path, skill: &str, force: bool) -> SkillResult {
        let Some(content) = skill_content(skill) else {
            return SkillResult::failed(format!("unknown skill '{}'", skill));
        };

        let dir = skill_dir(config_dir, skill);
        let marker = dir.join(MANAGED_MARKER);
        if dir.exists() {
            if !marker.exists() {
                // User-owned bundle
                return SkillResult {
                    status: SkillStatus::AlreadyPresent,
                    message: Some(format!("{} exists and is not managed by cc-mirror", dir.display())),
                };
            }
            if !force {
                return SkillResult::new(SkillStatus::AlreadyPresent);
            }
        }

        let written = std::fs::create_dir_all(&dir)
            .and_then(|()| std::fs::write(dir.join("SKILL.md"), content))
            .and_then(|()| std::fs::write(&marker, ""));
        match written {
            Ok(()) => {
                tracing::debug!(skill, dir = %dir.display(), "skill installed");
                SkillResult::new(SkillStatus::Installed)
            }
            Err(e) => SkillResult::failed(e.to_string()),
        }
    }

    fn remove(&self, config_dir: &Path, skill: &str) -> SkillResult {
        let dir = skill_dir(config_dir, skill);
        if !dir.join(MANAGED_MARKER).exists() {
            return SkillResult::new(SkillStatus::NotPresent);
        }
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => SkillResult::new(SkillStatus::Removed),
            Err(e) => SkillResult::failed(e.to_string()),
        }
    }
}
