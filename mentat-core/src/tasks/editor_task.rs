//! src/tasks/editor_task.rs
//! ============================================================================
//! # Editor hand-off
//!
//! Runs the configured editor against one note. The terminal is suspended for
//! exactly the lifetime of the child; see [`crate::terminal::SuspendGuard`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::terminal::{SuspendGuard, TerminalHandoff};

pub const DEFAULT_EDITOR: &str = "vim";

/// One external editor invocation and how it ended.
#[derive(Debug)]
pub struct EditorSession {
    pub target: PathBuf,
    pub exit_error: Option<AppError>,
}

impl EditorSession {
    pub fn succeeded(&self) -> bool {
        self.exit_error.is_none()
    }
}

/// Picks the editor: explicit configuration, then `$VISUAL`, then
/// `$EDITOR`, then [`DEFAULT_EDITOR`]. Blank values are skipped.
pub fn resolve_editor(configured: Option<&str>, visual: Option<&str>, editor: Option<&str>) -> String {
    [configured, visual, editor]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|cmd| !cmd.is_empty())
        .unwrap_or(DEFAULT_EDITOR)
        .to_string()
}

/// Suspends the terminal, runs `argv... path` with inherited stdio and waits
/// for it. The terminal is resumed before this returns, on every path.
pub async fn launch_editor<H>(handoff: &mut H, argv: &[String], path: &Path) -> EditorSession
where
    H: TerminalHandoff + ?Sized,
{
    let exit_error = match SuspendGuard::acquire(handoff) {
        Ok(guard) => {
            let outcome = run_editor(argv, path).await;
            drop(guard);
            outcome.err()
        }
        Err(e) => {
            warn!("Could not hand the terminal to the editor: {}", e);
            Some(e)
        }
    };

    EditorSession {
        target: path.to_path_buf(),
        exit_error,
    }
}

async fn run_editor(argv: &[String], path: &Path) -> Result<(), AppError> {
    let (program, leading_args) = match argv.split_first() {
        Some((program, rest)) => (program.as_str(), rest),
        None => (DEFAULT_EDITOR, &[][..]),
    };

    info!("Opening {:?} with `{}`", path, program);
    let start = Instant::now();

    let status = Command::new(program)
        .args(leading_args)
        .arg(path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| AppError::EditorLaunch {
            program: program.to_string(),
            source,
        })?;

    debug!("Editor exited with {} after {:?}", status, start.elapsed());

    if status.success() {
        Ok(())
    } else {
        Err(AppError::EditorExit {
            program: program.to_string(),
            status: status.to_string(),
        })
    }
}
