//! Artifact patch protocol
//!
//! Toggles one known literal marker inside an opaque third-party bundle
//! (the minified `cli.js`) between its "off" and "on" forms. The bundle
//! changes with every upstream release, so the patch anchors on a short
//! stable literal instead of positions or structure.
//!
//! Order of operations, strictly sequential for a given artifact:
//!
//! 1. artifact missing → [`PatchOutcome::ArtifactMissing`], nothing touched
//! 2. create `<artifact>.backup` if it does not exist (never overwritten)
//! 3. read the full content
//! 4. desired marker already present → [`PatchOutcome::AlreadyInState`]
//! 5. opposite marker absent too → [`PatchOutcome::NotPatchable`]
//! 6. replace the first occurrence and write the content back
//! 7. re-read; desired marker missing → [`PatchOutcome::VerificationFailed`]
//!
//! Nothing here returns an error. Callers turn the outcome into a note.

use std::fmt;
use std::path::{Path, PathBuf};

/// The two literal forms of a feature flag inside the artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub off: &'static str,
    pub on: &'static str,
}

/// The minified function gating team mode
pub const TEAM_MODE_MARKER: Marker = Marker {
    off: "function Uq(){return!1}",
    on: "function Uq(){return!0}",
};

impl Marker {
    fn for_state(&self, enabled: bool) -> &'static str {
        if enabled {
            self.on
        } else {
            self.off
        }
    }
}

/// Where the pristine copy of `artifact` is kept
pub fn backup_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(".backup");
    PathBuf::from(name)
}

/// What a patch run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Marker flipped, written and verified
    Applied,
    /// Artifact already carried the desired marker; nothing written
    AlreadyInState,
    /// Artifact path does not exist; nothing created
    ArtifactMissing,
    /// Neither marker form is present; the artifact's shape changed
    NotPatchable,
    /// Content was written but the re-read did not show the desired marker
    VerificationFailed,
    /// An IO operation failed part-way
    Failed { stage: PatchStage, error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStage {
    Backup,
    Read,
    Write,
    Verify,
}

impl fmt::Display for PatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatchStage::Backup => "backup",
            PatchStage::Read => "read",
            PatchStage::Write => "write",
            PatchStage::Verify => "verify",
        };
        write!(f, "{}", s)
    }
}

impl PatchOutcome {
    /// The desired state holds after this outcome
    pub fn in_desired_state(&self) -> bool {
        matches!(self, PatchOutcome::Applied | PatchOutcome::AlreadyInState)
    }
}

/// Bring `artifact` to the `enabled` form of `marker`
pub fn set_marker(artifact: &Path, marker: &Marker, enabled: bool) -> PatchOutcome {
    if !artifact.exists() {
        return PatchOutcome::ArtifactMissing;
    }

    let backup = backup_path(artifact);
    if !backup.exists() {
        if let Err(e) = std::fs::copy(artifact, &backup) {
            return PatchOutcome::Failed {
                stage: PatchStage::Backup,
                error: e.to_string(),
            };
        }
        tracing::debug!(backup = %backup.display(), "created artifact backup");
    }

    let content = match std::fs::read(artifact) {
        Ok(c) => c,
        Err(e) => {
            return PatchOutcome::Failed {
                stage: PatchStage::Read,
                error: e.to_string(),
            }
        }
    };

    let desired = marker.for_state(enabled);
    let opposite = marker.for_state(!enabled);

    if contains(&content, desired.as_bytes()) {
        return PatchOutcome::AlreadyInState;
    }

    let Some(patched) = replace_first(&content, opposite.as_bytes(), desired.as_bytes()) else {
        return PatchOutcome::NotPatchable;
    };

    if let Err(e) = std::fs::write(artifact, &patched) {
        return PatchOutcome::Failed {
            stage: PatchStage::Write,
            error: e.to_string(),
        };
    }

    match std::fs::read(artifact) {
        Ok(verify) if contains(&verify, desired.as_bytes()) => PatchOutcome::Applied,
        Ok(_) => PatchOutcome::VerificationFailed,
        Err(e) => PatchOutcome::Failed {
            stage: PatchStage::Verify,
            error: e.to_string(),
        },
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

fn replace_first(haystack: &[u8], from: &[u8], to: &[u8]) -> Option<Vec<u8>> {
    let at = find(haystack, from)?;
    let mut out = Vec::with_capacity(haystack.len() - from.len() + to.len());
    out.extend_from_slice(&haystack[..at]);
    out.extend_from_slice(to);
    out.extend_from_slice(&haystack[at + from.len()..]);
    Some(out)
}
