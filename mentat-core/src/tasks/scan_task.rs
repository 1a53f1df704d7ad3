//! ``src/tasks/scan_task.rs``
//! ============================================================================
//! # Background Note Scan Task
//!
//! Lists the notes directory off the loop task and reports back as
//! `TaskResult::ScanComplete`.

use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::controller::event_loop::TaskResult;
use crate::fs::dir_scanner::scan_notes;

/// Scans `dir` and wraps the outcome, errors included.
pub async fn run_scan(dir: PathBuf) -> TaskResult {
    let start = Instant::now();
    let result = scan_notes(&dir).await;
    debug!("Scan of {} finished in {:?}", dir.display(), start.elapsed());

    TaskResult::ScanComplete { dir, result }
}

/// Spawn a background scan of `dir`.
pub fn spawn_note_scan(dir: PathBuf, task_tx: mpsc::UnboundedSender<TaskResult>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = run_scan(dir).await;
        if task_tx.send(result).is_err() {
            debug!("Scan result dropped, event loop is gone");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn spawned_scan_reports_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.md"), "alpha").unwrap();
        std::fs::write(dir.path().join("skip.txt"), "no").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_note_scan(dir.path().to_path_buf(), tx).await.unwrap();

        match rx.recv().await {
            Some(TaskResult::ScanComplete { dir: scanned, result }) => {
                assert_eq!(scanned, dir.path());
                let names: Vec<String> = result.unwrap().into_iter().map(|e| e.name).collect();
                assert_eq!(names, vec!["a.md".to_string()]);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn scan_failure_is_delivered_not_lost() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");

        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_note_scan(missing, tx).await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(TaskResult::ScanComplete { result: Err(_), .. })
        ));
    }
}
