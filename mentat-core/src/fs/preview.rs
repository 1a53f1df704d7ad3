//! ``src/fs/preview.rs``
//!
//! # Preview Generator
//!
//! Reads the head of a note for the preview pane. Reads are bounded both by
//! line count and by bytes, so a huge file costs no more than its first
//! [`PREVIEW_LINE_LIMIT`] lines.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::warn;

use crate::error::AppError;
use crate::model::preview_state::PreviewState;

pub const PREVIEW_LINE_LIMIT: usize = 11;

/// Hard cap on bytes pulled from disk for one preview.
pub const PREVIEW_BYTE_LIMIT: u64 = 64 * 1024;

/// Builds the preview for `filename` inside `dir`. Never fails: an empty
/// name gives the "no selection" preview and read errors become an inline
/// message.
pub async fn read_preview(dir: &Path, filename: &str) -> PreviewState {
    if filename.is_empty() {
        return PreviewState::no_selection();
    }

    let path: PathBuf = dir.join(filename);
    match read_head(&path, PREVIEW_LINE_LIMIT).await {
        Ok((lines, truncated)) => PreviewState {
            title: filename.to_string(),
            body: lines.join("\n"),
            truncated,
        },
        Err(e) => {
            warn!("{}", e);
            PreviewState::read_error(filename)
        }
    }
}

/// Returns at most `limit` lines without their terminators, plus whether
/// anything was left unread.
async fn read_head(path: &Path, limit: usize) -> Result<(Vec<String>, bool), AppError> {
    let preview_error = |source| AppError::Preview {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).await.map_err(preview_error)?;
    let mut reader = BufReader::new(file.take(PREVIEW_BYTE_LIMIT));

    let mut lines: Vec<String> = Vec::with_capacity(limit);
    let mut buf: Vec<u8> = Vec::new();
    let mut consumed: u64 = 0;

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).await.map_err(preview_error)?;
        if n == 0 {
            if consumed < PREVIEW_BYTE_LIMIT {
                return Ok((lines, false));
            }
            // the cap ended the read; the file may still have ended with it
            let mut file = reader.into_inner().into_inner();
            let mut next = [0u8; 1];
            let more = file.read(&mut next).await.map_err(preview_error)? > 0;
            return Ok((lines, more));
        }
        if lines.len() == limit {
            return Ok((lines, true));
        }
        consumed += n as u64;

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
}
