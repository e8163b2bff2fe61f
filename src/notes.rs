//! Human-readable notes collected while a pipeline runs
//!
//! Notes are the channel for everything that is not fatal: informational
//! results ("Team mode enabled successfully") and recoverable warnings
//! ("cli.js not found"). They end up in the final result, in order.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub kind: NoteKind,
    pub message: String,
}

impl Note {
    pub fn is_warning(&self) -> bool {
        self.kind == NoteKind::Warning
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NoteKind::Info => write!(f, "{}", self.message),
            NoteKind::Warning => write!(f, "Warning: {}", self.message),
        }
    }
}

/// Ordered list of notes for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    entries: Vec<Note>,
}

impl Notes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(note = %message);
        self.entries.push(Note {
            kind: NoteKind::Info,
            message,
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(note = %message);
        self.entries.push(Note {
            kind: NoteKind::Warning,
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Note> {
        self.entries.iter().filter(|n| n.is_warning())
    }

    /// Whether any note contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|n| n.message.contains(needle))
    }

    /// `None` when nothing was recorded, so "nothing to report" stays
    /// distinguishable from a list holding one empty note
    pub fn into_report(self) -> Option<Vec<Note>> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries)
        }
    }
}
