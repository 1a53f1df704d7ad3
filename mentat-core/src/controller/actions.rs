//! src/controller/actions.rs
//! ============================================================================
//! # Actions and Commands
//!
//! `Action` is every message the dispatcher consumes: terminal input, timer
//! ticks and background task results. `Command` is every side effect it asks
//! the host to perform in return.

use crate::controller::event_loop::TaskResult;
use crossterm::event::KeyEvent;
use std::path::PathBuf;

/// A message for the dispatcher.
#[derive(Debug)]
pub enum Action {
    /// A keyboard event.
    Key(KeyEvent),

    /// A terminal resize event.
    Resize(u16, u16),

    /// Periodic rescan timer fired.
    Tick,

    /// Rescan the notes directory now.
    Rescan,

    /// Ctrl+C or a signal. The host terminates; the dispatcher ignores it.
    Interrupt,

    /// A result from a background task.
    TaskResult(TaskResult),
}

/// A side effect requested by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the notes directory.
    Scan { dir: PathBuf },

    /// Read the head of `filename`; an empty name means no selection.
    Preview {
        request_id: u64,
        dir: PathBuf,
        filename: String,
    },

    /// Hand the terminal to the editor for `path`.
    LaunchEditor { argv: Vec<String>, path: PathBuf },

    /// Leave the application.
    Quit,
}
