//! ``src/controller/event_loop.rs``
//! ============================================================================
//! # Event Loop Dispatcher
//!
//! The note browser's state machine. Every `Action` is applied to `AppState`
//! on the host's single loop task, in arrival order, and may yield
//! `Command`s for the host to run. Completions come back as
//! `Action::TaskResult`.
//!
//! Preview reads are never cancelled. Each carries a request id, and a
//! result is applied only when it answers the latest request for the entry
//! that is still selected; anything else is stale and dropped.

use std::path::PathBuf;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, trace, warn};

use crate::controller::actions::{Action, Command};
use crate::error::AppError;
use crate::fs::note_entry::NoteEntry;
use crate::model::app_state::{AppState, Phase, PreviewRequest};
use crate::model::preview_state::PreviewState;
use crate::model::ui_state::UIMode;
use crate::tasks::editor_task::EditorSession;

/// Completion messages from background work.
#[derive(Debug)]
pub enum TaskResult {
    ScanComplete {
        dir: PathBuf,
        result: Result<Vec<NoteEntry>, AppError>,
    },

    PreviewReady {
        request_id: u64,
        filename: String,
        preview: PreviewState,
    },

    EditorFinished(EditorSession),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnap {
    pub actions: u64,
    pub tasks: u64,
    pub stale_previews: u64,
}

pub struct EventLoop {
    state: AppState,
    next_request_id: u64,
    /// Re-read the preview even if the selected key did not change.
    preview_dirty: bool,
    metrics: MetricsSnap,
    started: Instant,
}

impl EventLoop {
    pub fn new(state: AppState) -> Self {
        info!("Initializing note browser event loop");
        Self {
            state,
            next_request_id: 0,
            preview_dirty: false,
            metrics: MetricsSnap::default(),
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn snapshot_metrics(&self) -> MetricsSnap {
        self.metrics
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    /// Startup transition: `Idle -> Loading`.
    pub fn init(&mut self) -> Vec<Command> {
        self.state.ui.request_redraw();
        self.start_scan()
    }

    /// Applies one message and returns the commands it produced.
    pub fn dispatch(&mut self, action: Action) -> Vec<Command> {
        self.metrics.actions += 1;
        trace!("Dispatching {:?} in phase {}", action, self.state.phase());

        let before: Option<String> = self.state.list.selected().map(str::to_owned);

        let mut commands = match action {
            Action::Key(key) => self.handle_key(key),
            Action::Resize(width, height) => {
                self.state.ui.set_layout(width, height);
                Vec::new()
            }
            Action::Tick => self.handle_tick(),
            Action::Rescan => self.start_scan(),
            Action::Interrupt => {
                debug!("Interrupt left to the host runtime");
                Vec::new()
            }
            Action::TaskResult(result) => {
                self.metrics.tasks += 1;
                self.handle_task_result(result)
            }
        };

        let changed = self.state.list.selected() != before.as_deref();
        if changed || std::mem::take(&mut self.preview_dirty) {
            commands.push(self.request_preview());
        }

        self.state.ui.request_redraw();
        commands
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }

        match self.state.ui.mode {
            UIMode::Browse => self.handle_browse_key(key),
            UIMode::Filter => self.handle_filter_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let page = self.page_size();
        let list = &mut self.state.list;

        match key.code {
            KeyCode::Char('q') => return vec![Command::Quit],
            KeyCode::Up | KeyCode::Char('k') => list.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => list.select_next(),
            KeyCode::PageUp => list.page_up(page),
            KeyCode::PageDown => list.page_down(page),
            KeyCode::Home | KeyCode::Char('g') => list.select_first(),
            KeyCode::End | KeyCode::Char('G') => list.select_last(),
            KeyCode::Enter => return self.open_selected(),
            KeyCode::Char('/') => {
                self.state.ui.mode = UIMode::Filter;
            }
            KeyCode::Esc => {
                if list.is_filtered() {
                    list.clear_filter();
                }
                self.state.ui.dismiss_notification();
            }
            KeyCode::Char('r') | KeyCode::F(5) => return self.start_scan(),
            KeyCode::Char('?') => {
                self.state.ui.show_help = !self.state.ui.show_help;
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let list = &mut self.state.list;

        match key.code {
            KeyCode::Esc => {
                list.clear_filter();
                self.state.ui.mode = UIMode::Browse;
            }
            KeyCode::Enter => {
                self.state.ui.mode = UIMode::Browse;
                return self.open_selected();
            }
            KeyCode::Backspace => list.pop_filter_char(),
            KeyCode::Up => {
                list.select_prev();
                self.state.ui.mode = UIMode::Browse;
            }
            KeyCode::Down => {
                list.select_next();
                self.state.ui.mode = UIMode::Browse;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                list.push_filter_char(c);
            }
            _ => {}
        }
        Vec::new()
    }

    /// `Idle -> Suspended`, or a no-op on an empty filtered list.
    fn open_selected(&mut self) -> Vec<Command> {
        if self.state.editor_target.is_some() {
            return Vec::new();
        }

        if self.state.list.visible_len() == 0 {
            info!("Empty filter, creating a new note is not implemented");
            return Vec::new();
        }

        let Some(entry) = self.state.list.selected_entry() else {
            return Vec::new();
        };

        let name = entry.name.clone();
        let path = self.state.notes_dir().join(&name);
        info!("Opening {} in editor", name);

        self.state.ui.show_info(format!("Selected: {name}"));
        self.state.editor_target = Some(path.clone());

        vec![Command::LaunchEditor {
            argv: self.state.config.editor_argv(),
            path,
        }]
    }

    fn handle_tick(&mut self) -> Vec<Command> {
        if self.state.config.rescan_interval.is_none() || self.state.phase() == Phase::Suspended {
            return Vec::new();
        }
        self.start_scan()
    }

    fn start_scan(&mut self) -> Vec<Command> {
        if self.state.scan_in_flight {
            debug!("Scan already in flight");
            return Vec::new();
        }

        self.state.scan_in_flight = true;
        vec![Command::Scan {
            dir: self.state.notes_dir().to_path_buf(),
        }]
    }

    fn request_preview(&mut self) -> Command {
        self.next_request_id += 1;
        let filename = self.state.list.selected().unwrap_or_default().to_string();

        debug!("Requesting preview #{} for {:?}", self.next_request_id, filename);
        self.state.pending_preview = Some(PreviewRequest {
            id: self.next_request_id,
            filename: filename.clone(),
        });

        Command::Preview {
            request_id: self.next_request_id,
            dir: self.state.notes_dir().to_path_buf(),
            filename,
        }
    }

    fn handle_task_result(&mut self, result: TaskResult) -> Vec<Command> {
        match result {
            TaskResult::ScanComplete { dir, result } => self.apply_scan(dir, result),
            TaskResult::PreviewReady {
                request_id,
                filename,
                preview,
            } => {
                self.apply_preview(request_id, &filename, preview);
                Vec::new()
            }
            TaskResult::EditorFinished(session) => self.finish_editor(session),
        }
    }

    /// `Loading -> Idle`: items are replaced wholesale.
    fn apply_scan(&mut self, dir: PathBuf, result: Result<Vec<NoteEntry>, AppError>) -> Vec<Command> {
        self.state.scan_in_flight = false;

        let entries = match result {
            Ok(entries) => {
                info!("Loaded {} notes from {}", entries.len(), dir.display());
                entries
            }
            Err(e) => {
                warn!("{}", e);
                self.state.ui.show_warning(e.to_string());
                Vec::new()
            }
        };

        self.state.list.set_items(entries);
        // contents may have changed under an unchanged selection
        self.preview_dirty = true;
        Vec::new()
    }

    /// `PreviewPending -> Idle`, unless the result is stale.
    fn apply_preview(&mut self, request_id: u64, filename: &str, preview: PreviewState) {
        let current = self.state.list.selected().unwrap_or_default();

        match &self.state.pending_preview {
            Some(req) if req.id == request_id && req.filename == filename && filename == current => {
                self.state.preview = preview;
                self.state.pending_preview = None;
            }
            _ => {
                self.metrics.stale_previews += 1;
                debug!(
                    "Discarding stale preview #{} for {:?} (selected {:?})",
                    request_id, filename, current
                );
            }
        }
    }

    /// `Suspended -> Idle`, whatever the exit status.
    fn finish_editor(&mut self, session: EditorSession) -> Vec<Command> {
        self.state.editor_target = None;

        let name = session
            .target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match &session.exit_error {
            Some(e) => {
                warn!("Editor session for {} failed: {}", name, e);
                self.state.ui.show_error(e.to_string());
            }
            None => {
                info!("Editor closed {}", name);
                self.state.ui.show_info(format!("Closed {name}"));
            }
        }

        if self.state.config.rescan_after_edit {
            self.start_scan()
        } else {
            Vec::new()
        }
    }

    fn page_size(&self) -> usize {
        // two rows per item inside a bordered block
        usize::from(self.state.ui.layout.body_height.saturating_sub(2) / 2).max(1)
    }
}

/// Puts list updates ahead of geometry changes within one batch and keeps
/// only the last resize.
pub fn order_batch(batch: Vec<Action>) -> Vec<Action> {
    let mut ordered: Vec<Action> = Vec::with_capacity(batch.len());
    let mut resize: Option<Action> = None;

    for action in batch {
        match action {
            Action::Resize(..) => resize = Some(action),
            other => ordered.push(other),
        }
    }

    ordered.extend(resize);
    ordered
}
