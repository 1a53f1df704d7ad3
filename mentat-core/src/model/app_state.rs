//! src/model/app_state.rs
//! ============================================================================
//! # AppState: everything the dispatcher mutates
//!
//! Owned by the event loop alone. Background tasks never see it; they report
//! through `TaskResult` messages instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::model::list_state::ListState;
use crate::model::preview_state::PreviewState;
use crate::model::ui_state::UIState;

/// Dispatcher state, derived from which work is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A directory scan is in flight.
    Loading,
    /// A preview read is in flight.
    PreviewPending,
    /// The editor owns the terminal.
    Suspended,
}

/// The latest preview read issued; only its result may be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub id: u64,
    pub filename: String,
}

#[derive(Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub list: ListState,
    pub preview: PreviewState,
    pub ui: UIState,
    pub scan_in_flight: bool,
    pub pending_preview: Option<PreviewRequest>,
    /// Note currently open in the editor.
    pub editor_target: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            list: ListState::new(),
            preview: PreviewState::no_selection(),
            ui: UIState::default(),
            scan_in_flight: false,
            pending_preview: None,
            editor_target: None,
        }
    }

    pub fn notes_dir(&self) -> &Path {
        &self.config.notes_dir
    }

    pub fn phase(&self) -> Phase {
        if self.editor_target.is_some() {
            Phase::Suspended
        } else if self.scan_in_flight {
            Phase::Loading
        } else if self.pending_preview.is_some() {
            Phase::PreviewPending
        } else {
            Phase::Idle
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::PreviewPending => write!(f, "Preview"),
            Self::Suspended => write!(f, "Editing"),
        }
    }
}
