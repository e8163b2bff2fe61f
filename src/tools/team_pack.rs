//! Team pack prompt overlays, copied into `<tweakcc>/system-prompts/`
//! when team mode is enabled.

use std::path::Path;

const TEAM_LEAD_MD: &str = r#"<!-- cc-mirror team pack -->
# Team lead

You lead a team of agents that share one task list. Plan the work as
tasks, hand independent tasks to workers, and keep the list current.
Use the orchestration skill for anything larger than a single change.
"#;

const TASK_TOOLS_MD: &str = r#"<!-- cc-mirror team pack -->
# Task tools

TodoWrite is not available. Track work with TaskCreate, TaskList,
TaskGet and TaskUpdate. Every task has exactly one owner at a time.
"#;

pub const TEAM_PACK_FILES: &[(&str, &str)] = &[
    ("team-lead.md", TEAM_LEAD_MD),
    ("team-task-tools.md", TASK_TOOLS_MD),
];

/// Write every team pack file into `dir`. Returns the file names written;
/// failures are logged and skipped.
pub fn copy_team_pack_prompts(dir: &Path) -> Vec<String> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "could not create system prompts directory");
        return Vec::new();
    }

    TEAM_PACK_FILES
        .iter()
        .filter_map(|(file, content)| match std::fs::write(dir.join(file), content) {
            Ok(()) => Some(file.to_string()),
            Err(e) => {
                tracing::warn!(file, error = %e, "could not write team pack prompt");
                None
            }
        })
        .collect()
}
