//! ``src/tasks/preview_task.rs``
//! ============================================================================
//! # Background Preview Task
//!
//! Reads the head of one note and reports it tagged with the request id it
//! answers. Superseded reads still run to completion; the event loop drops
//! their results.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::controller::event_loop::TaskResult;
use crate::fs::preview::read_preview;

pub async fn run_preview(request_id: u64, dir: PathBuf, filename: String) -> TaskResult {
    trace!("Preview #{} reading {:?}", request_id, filename);
    let preview = read_preview(&dir, &filename).await;

    TaskResult::PreviewReady {
        request_id,
        filename,
        preview,
    }
}

/// Spawn a background preview read for `filename` in `dir`.
pub fn spawn_preview(
    request_id: u64,
    dir: PathBuf,
    filename: String,
    task_tx: mpsc::UnboundedSender<TaskResult>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = run_preview(request_id, dir, filename).await;
        if task_tx.send(result).is_err() {
            debug!("Preview #{} dropped, event loop is gone", request_id);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::preview_state::{PREVIEW_ERROR_BODY, PreviewState};
    use tempfile::TempDir;

    #[tokio::test]
    async fn preview_carries_request_identity() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.md"), "line1\nline2").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_preview(7, dir.path().to_path_buf(), "b.md".into(), tx)
            .await
            .unwrap();

        match rx.recv().await {
            Some(TaskResult::PreviewReady {
                request_id,
                filename,
                preview,
            }) => {
                assert_eq!(request_id, 7);
                assert_eq!(filename, "b.md");
                assert_eq!(preview.body, "line1\nline2");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_filename_yields_sentinel() {
        let dir = TempDir::new().unwrap();
        match run_preview(1, dir.path().to_path_buf(), String::new()).await {
            TaskResult::PreviewReady { preview, .. } => {
                assert_eq!(preview, PreviewState::no_selection());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_file_yields_inline_error() {
        let dir = TempDir::new().unwrap();
        match run_preview(2, dir.path().to_path_buf(), "nope.md".into()).await {
            TaskResult::PreviewReady { preview, .. } => {
                assert_eq!(preview.body, PREVIEW_ERROR_BODY);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
