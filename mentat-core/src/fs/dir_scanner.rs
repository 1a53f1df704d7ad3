//! ``src/fs/dir_scanner.rs``
//!
//! # `Directory Scanner`: Markdown Note Listing
//!
//! Lists the notes of one directory, most recently modified first.

use std::path::Path;
use std::time::{Instant, SystemTime};

use tokio::fs::{self, ReadDir};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::fs::note_entry::NoteEntry;

/// Suffix a file name must carry to be listed.
pub const NOTE_SUFFIX: &str = ".md";

/// Whether `name` is a visible markdown note.
pub fn is_note_name(name: &str) -> bool {
    !name.starts_with('.') && name.ends_with(NOTE_SUFFIX)
}

/// Scans `dir` and returns its notes ordered by modification time,
/// newest first. Entries with equal times keep enumeration order.
///
/// # Errors
/// [`AppError::Scan`] when the directory itself cannot be read. Entries
/// whose metadata cannot be read are skipped.
pub async fn scan_notes(dir: &Path) -> Result<Vec<NoteEntry>, AppError> {
    let start_time = Instant::now();
    let scan_error = |source| AppError::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut read_dir: ReadDir = fs::read_dir(dir).await.map_err(scan_error)?;
    let mut entries: Vec<NoteEntry> = Vec::new();

    while let Some(entry) = read_dir.next_entry().await.map_err(scan_error)? {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!("Skipping non UTF-8 name {:?}", file_name);
            continue;
        };

        if !is_note_name(name) {
            continue;
        }

        // follow symlinks so linked notes are listed with their target's time
        match fs::metadata(entry.path()).await {
            Ok(meta) if meta.is_file() => {
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                entries.push(NoteEntry::new(name, modified));
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Failed to read metadata for {:?}: {}", entry.path(), e);
            }
        }
    }

    sort_by_recency(&mut entries);

    info!(
        marker = "NOTE_SCAN",
        count = entries.len(),
        "Scanned {} in {:?}",
        dir.display(),
        start_time.elapsed()
    );

    Ok(entries)
}

fn sort_by_recency(entries: &mut [NoteEntry]) {
    // stable: ties stay in enumeration order
    entries.sort_by(|a, b| b.modified.cmp(&a.modified));
}
