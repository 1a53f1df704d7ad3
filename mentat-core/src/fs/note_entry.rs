//! `src/fs/note_entry.rs`
//! ============================================================
//! One markdown note as seen by a single directory scan.

use std::time::SystemTime;

use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEntry {
    /// File name inside the notes directory; doubles as the entry's key.
    pub name: String,
    pub modified: SystemTime,
}

impl NoteEntry {
    pub fn new(name: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            modified,
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.name
    }

    /// Local modification time, e.g. `2024-03-09 14:05`.
    pub fn modified_display(&self) -> String {
        DateTime::<Local>::from(self.modified)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}
