//! src/app.rs
//! ============================================================================
//! # Host runtime
//!
//! Drives [`EventLoop`] against a terminal. Each turn waits for one of
//! terminal input, a task result, a shutdown signal or the rescan ticker,
//! then applies everything else already waiting as one batch, runs the
//! resulting commands and renders once.

use std::{
    collections::VecDeque,
    future::Future,
    io,
    ops::ControlFlow,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crossterm::event::{Event as TerminalEvent, EventStream, KeyCode, KeyModifiers};
use futures::StreamExt;
use ratatui::Frame;
use tokio::{
    sync::{Notify, mpsc},
    task::JoinHandle,
    time::{self, Interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    controller::{
        actions::{Action, Command},
        event_loop::{EventLoop, MetricsSnap, TaskResult, order_batch},
    },
    error::AppError,
    model::app_state::AppState,
    tasks::{editor_task::launch_editor, preview_task::spawn_preview, scan_task::spawn_note_scan},
    terminal::{AppTerminal, TerminalHandoff},
    view::ui::UIRenderer,
};

/// Why [`App::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    /// Ctrl+C while the UI owned the terminal.
    Interrupt,
    /// SIGINT or SIGTERM.
    Signal,
    EventsClosed,
}

/// Terminal input. Paused while an editor owns stdin.
pub trait EventSource {
    fn next_event(&mut self) -> impl Future<Output = Option<io::Result<TerminalEvent>>>;

    fn pause(&mut self);

    fn resume(&mut self);
}

/// crossterm's event stream, dropped on pause and recreated on resume.
pub struct CrosstermEvents {
    stream: Option<EventStream>,
}

impl CrosstermEvents {
    pub fn new() -> Self {
        Self {
            stream: Some(EventStream::new()),
        }
    }
}

impl Default for CrosstermEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEvents {
    async fn next_event(&mut self) -> Option<io::Result<TerminalEvent>> {
        match self.stream.as_mut() {
            Some(stream) => stream.next().await,
            None => std::future::pending().await,
        }
    }

    fn pause(&mut self) {
        self.stream = None;
    }

    fn resume(&mut self) {
        self.stream = Some(EventStream::new());
    }
}

/// A terminal the host can draw on and hand to an editor.
pub trait HostTerminal: TerminalHandoff {
    fn size(&self) -> Result<(u16, u16), AppError>;

    fn draw_state(&mut self, renderer: &mut UIRenderer, state: &AppState) -> Result<(), AppError>;
}

impl HostTerminal for AppTerminal {
    fn size(&self) -> Result<(u16, u16), AppError> {
        let size = ratatui::Terminal::size(self).map_err(|e| AppError::terminal("query size", e))?;
        Ok((size.width, size.height))
    }

    fn draw_state(&mut self, renderer: &mut UIRenderer, state: &AppState) -> Result<(), AppError> {
        self.draw(|frame: &mut Frame<'_>| renderer.render(frame, state))
            .map_err(|e| AppError::terminal("draw", e))?;
        Ok(())
    }
}

/// Shutdown request shared with the signal listener. Requests made while
/// an editor owns the terminal are dropped.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    notify: Arc<Notify>,
    suspended: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Returns whether the request was accepted.
    pub fn trigger(&self) -> bool {
        if self.suspended.load(Ordering::SeqCst) {
            info!("Ignoring shutdown signal while the editor runs");
            return false;
        }
        self.notify.notify_one();
        true
    }

    pub async fn wait(&self) {
        self.notify.notified().await;
    }

    fn set_suspended(&self, suspended: bool) {
        self.suspended.store(suspended, Ordering::SeqCst);
    }
}

/// Forwards SIGINT/SIGTERM (Ctrl+C elsewhere) to `shutdown` until one is
/// accepted.
pub fn spawn_signal_listener(shutdown: ShutdownSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Failed to install signal handlers: {}", e);
                        return;
                    }
                };

            loop {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = sigint.recv() => info!("Received SIGINT"),
                }
                if shutdown.trigger() {
                    break;
                }
            }
        }

        #[cfg(not(unix))]
        {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                info!("Received Ctrl+C");
                if shutdown.trigger() {
                    break;
                }
            }
        }
    })
}

pub struct App<T: HostTerminal, E: EventSource> {
    terminal: T,
    events: E,
    event_loop: EventLoop,
    ui_renderer: UIRenderer,
    task_tx: mpsc::UnboundedSender<TaskResult>,
    task_rx: mpsc::UnboundedReceiver<TaskResult>,
    shutdown: ShutdownSignal,
    ticker: Option<Interval>,
}

impl<T: HostTerminal, E: EventSource> App<T, E> {
    pub fn new(config: Arc<Config>, terminal: T, events: E, shutdown: ShutdownSignal) -> Self {
        let ticker: Option<Interval> = config.rescan_interval.map(|period| {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        let (task_tx, task_rx) = mpsc::unbounded_channel::<TaskResult>();

        Self {
            terminal,
            events,
            event_loop: EventLoop::new(AppState::new(config)),
            ui_renderer: UIRenderer::new(),
            task_tx,
            task_rx,
            shutdown,
            ticker,
        }
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    pub async fn run(&mut self) -> Result<ExitReason, AppError> {
        info!("Starting event loop");

        let (width, height) = self.terminal.size()?;
        let mut commands: Vec<Command> = self.event_loop.init();
        commands.extend(self.event_loop.dispatch(Action::Resize(width, height)));

        loop {
            if !self.execute(commands).await? {
                info!("Quit requested");
                return Ok(ExitReason::Quit);
            }
            self.render()?;

            let first: Action = tokio::select! {
                _ = self.shutdown.wait() => {
                    info!("Shutdown signal received");
                    return Ok(ExitReason::Signal);
                }

                maybe_event = self.events.next_event() => match maybe_event {
                    Some(Ok(event)) => match translate_event(event) {
                        Some(action) => action,
                        None => {
                            commands = Vec::new();
                            continue;
                        }
                    },
                    Some(Err(e)) => {
                        warn!("Terminal event error: {}", e);
                        commands = Vec::new();
                        continue;
                    }
                    None => {
                        info!("Terminal event stream closed");
                        return Ok(ExitReason::EventsClosed);
                    }
                },

                Some(result) = self.task_rx.recv() => Action::TaskResult(result),

                _ = next_tick(&mut self.ticker) => Action::Tick,
            };

            let batch = self.collect_batch(first).await;
            commands = match self.apply_batch(batch) {
                ControlFlow::Continue(commands) => commands,
                ControlFlow::Break(reason) => return Ok(reason),
            };
        }
    }

    /// Gathers everything already waiting behind `first`.
    async fn collect_batch(&mut self, first: Action) -> Vec<Action> {
        let mut batch = vec![first];

        while let Ok(result) = self.task_rx.try_recv() {
            batch.push(Action::TaskResult(result));
        }

        // polled with this task's waker so the source can wake the loop later
        loop {
            let polled = tokio::select! {
                biased;
                event = self.events.next_event() => Some(event),
                () = std::future::ready(()) => None,
            };

            match polled {
                Some(Some(Ok(event))) => batch.extend(translate_event(event)),
                Some(Some(Err(e))) => {
                    warn!("Terminal event error: {}", e);
                    break;
                }
                Some(None) | None => break,
            }
        }

        if batch.len() > 1 {
            debug!("Processing batch of {} messages", batch.len());
        }
        batch
    }

    fn apply_batch(&mut self, batch: Vec<Action>) -> ControlFlow<ExitReason, Vec<Command>> {
        let mut commands = Vec::new();
        for action in order_batch(batch) {
            if matches!(action, Action::Interrupt) {
                info!("Interrupt from terminal");
                return ControlFlow::Break(ExitReason::Interrupt);
            }
            commands.extend(self.event_loop.dispatch(action));
        }
        ControlFlow::Continue(commands)
    }

    /// Runs dispatcher commands in order. Returns `false` on quit.
    async fn execute(&mut self, commands: Vec<Command>) -> Result<bool, AppError> {
        let mut queue: VecDeque<Command> = commands.into();

        while let Some(command) = queue.pop_front() {
            match command {
                Command::Scan { dir } => {
                    debug!("Spawning scan of {}", dir.display());
                    spawn_note_scan(dir, self.task_tx.clone());
                }

                Command::Preview {
                    request_id,
                    dir,
                    filename,
                } => {
                    spawn_preview(request_id, dir, filename, self.task_tx.clone());
                }

                Command::LaunchEditor { argv, path } => {
                    self.events.pause();
                    self.shutdown.set_suspended(true);
                    let session = launch_editor(&mut self.terminal, &argv, &path).await;
                    self.shutdown.set_suspended(false);
                    self.events.resume();

                    queue.extend(
                        self.event_loop
                            .dispatch(Action::TaskResult(TaskResult::EditorFinished(session))),
                    );

                    // the terminal may have been resized while suspended
                    let (width, height) = self.terminal.size()?;
                    queue.extend(self.event_loop.dispatch(Action::Resize(width, height)));
                }

                Command::Quit => return Ok(false),
            }
        }

        Ok(true)
    }

    fn render(&mut self) -> Result<(), AppError> {
        if !self.event_loop.state().ui.needs_redraw() {
            return Ok(());
        }

        let start: Instant = Instant::now();
        self.terminal
            .draw_state(&mut self.ui_renderer, self.event_loop.state())?;
        self.event_loop.state_mut().ui.clear_redraw();

        let duration: Duration = start.elapsed();
        if duration.as_millis() > 16 {
            warn!("Slow render: {}ms (target: <16ms)", duration.as_millis());
        }
        Ok(())
    }

    pub fn log_final_metrics(&self) {
        let metrics: MetricsSnap = self.event_loop.snapshot_metrics();
        let render_stats = self.ui_renderer.stats();

        info!("Final metrics:");
        info!("  Uptime: {:?}", self.event_loop.uptime());
        info!("  Actions processed: {}", metrics.actions);
        info!("  Tasks processed: {}", metrics.tasks);
        info!("  Stale previews dropped: {}", metrics.stale_previews);
        info!(
            "  Frames: {} ({} slow, avg {:?})",
            render_stats.frames,
            render_stats.slow,
            render_stats.average()
        );
    }
}

fn translate_event(event: TerminalEvent) -> Option<Action> {
    match event {
        TerminalEvent::Key(key)
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Action::Interrupt)
        }
        TerminalEvent::Key(key) => Some(Action::Key(key)),
        TerminalEvent::Resize(width, height) => Some(Action::Resize(width, height)),
        _ => None,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{app_state::Phase, ui_state::NotificationLevel};
    use crossterm::event::KeyEvent;
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::Path;
    use std::sync::Mutex;
    use std::task::{Poll, Waker};
    use tempfile::TempDir;

    /// Renders into a `TestBackend` and records hand-off calls.
    struct FakeTerminal {
        inner: Terminal<TestBackend>,
        calls: Vec<&'static str>,
        signal_on_suspend: Option<ShutdownSignal>,
        resize_on_suspend: Option<(u16, u16)>,
    }

    impl FakeTerminal {
        fn new() -> Self {
            Self {
                inner: Terminal::new(TestBackend::new(60, 12)).unwrap(),
                calls: Vec::new(),
                signal_on_suspend: None,
                resize_on_suspend: None,
            }
        }
    }

    impl TerminalHandoff for FakeTerminal {
        fn suspend(&mut self) -> Result<(), AppError> {
            self.calls.push("suspend");
            if let Some(shutdown) = &self.signal_on_suspend {
                assert!(!shutdown.trigger(), "signal accepted during editor");
            }
            if let Some((width, height)) = self.resize_on_suspend {
                self.inner.backend_mut().resize(width, height);
            }
            Ok(())
        }

        fn resume(&mut self) -> Result<(), AppError> {
            self.calls.push("resume");
            Ok(())
        }
    }

    impl HostTerminal for FakeTerminal {
        fn size(&self) -> Result<(u16, u16), AppError> {
            let size = self
                .inner
                .size()
                .map_err(|e| AppError::terminal("query size", e))?;
            Ok((size.width, size.height))
        }

        fn draw_state(
            &mut self,
            renderer: &mut UIRenderer,
            state: &AppState,
        ) -> Result<(), AppError> {
            self.inner
                .draw(|frame| renderer.render(frame, state))
                .map_err(|e| AppError::terminal("draw", e))?;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Queue {
        events: VecDeque<TerminalEvent>,
        waker: Option<Waker>,
        pauses: usize,
        resumes: usize,
    }

    /// Event source that keeps the first waker it is polled with until an
    /// event arrives, the way crossterm's `EventStream` does.
    #[derive(Clone, Default)]
    struct ScriptedEvents(Arc<Mutex<Queue>>);

    impl ScriptedEvents {
        fn push(&self, event: TerminalEvent) {
            let waker = {
                let mut queue = self.0.lock().unwrap();
                queue.events.push_back(event);
                queue.waker.take()
            };
            if let Some(waker) = waker {
                waker.wake();
            }
        }

        fn key(&self, code: KeyCode) {
            self.push(TerminalEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        }
    }

    impl EventSource for ScriptedEvents {
        fn next_event(&mut self) -> impl Future<Output = Option<io::Result<TerminalEvent>>> {
            let shared = self.0.clone();
            futures::future::poll_fn(move |cx| {
                let mut queue = shared.lock().unwrap();
                if let Some(event) = queue.events.pop_front() {
                    return Poll::Ready(Some(Ok(event)));
                }
                if queue.waker.is_none() {
                    queue.waker = Some(cx.waker().clone());
                }
                Poll::Pending
            })
        }

        fn pause(&mut self) {
            self.0.lock().unwrap().pauses += 1;
        }

        fn resume(&mut self) {
            self.0.lock().unwrap().resumes += 1;
        }
    }

    fn notes_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            std::fs::write(dir.path().join(name), format!("# {name}\n")).unwrap();
        }
        dir
    }

    fn config_for(dir: &Path, editor: &str) -> Arc<Config> {
        Arc::new(Config {
            notes_dir: dir.to_path_buf(),
            editor_cmd: Some(editor.to_string()),
            ..Config::default()
        })
    }

    /// Runs the app, failing if it has not stopped after `budget`.
    async fn run_within(
        app: &mut App<FakeTerminal, ScriptedEvents>,
        budget: Duration,
    ) -> ExitReason {
        tokio::select! {
            biased;
            _ = time::sleep(budget) => panic!("event loop stalled"),
            reason = app.run() => reason.unwrap(),
        }
    }

    /// Feeds events from another task after fixed delays.
    fn feed(events: &ScriptedEvents, script: Vec<(u64, TerminalEvent)>) -> JoinHandle<()> {
        let events = events.clone();
        tokio::spawn(async move {
            for (delay_ms, event) in script {
                time::sleep(Duration::from_millis(delay_ms)).await;
                events.push(event);
            }
        })
    }

    fn key_event(code: KeyCode) -> TerminalEvent {
        TerminalEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn every_key_wakes_the_loop() {
        let dir = notes_dir(&["a.md", "b.md"]);
        let events = ScriptedEvents::default();
        let mut app = App::new(
            config_for(dir.path(), "true"),
            FakeTerminal::new(),
            events.clone(),
            ShutdownSignal::default(),
        );

        let feeder = feed(
            &events,
            vec![
                (200, key_event(KeyCode::Char('?'))),
                (200, key_event(KeyCode::Char('?'))),
                (200, key_event(KeyCode::Char('?'))),
                (200, key_event(KeyCode::Char('q'))),
            ],
        );

        let reason = run_within(&mut app, Duration::from_secs(3)).await;
        feeder.await.unwrap();

        assert_eq!(reason, ExitReason::Quit);
        assert!(app.event_loop().state().ui.show_help);
    }

    #[tokio::test]
    async fn waiting_events_are_applied_as_one_batch() {
        let dir = notes_dir(&[]);
        let events = ScriptedEvents::default();
        let mut app = App::new(
            config_for(dir.path(), "true"),
            FakeTerminal::new(),
            events.clone(),
            ShutdownSignal::default(),
        );

        events.push(TerminalEvent::Resize(80, 24));
        events.key(KeyCode::Char('?'));
        events.push(TerminalEvent::Resize(100, 30));
        events.push(TerminalEvent::FocusGained);

        let batch = app.collect_batch(Action::Tick).await;
        assert_eq!(batch.len(), 4);
        assert!(events.0.lock().unwrap().waker.is_some());

        let ControlFlow::Continue(commands) = app.apply_batch(batch) else {
            panic!("batch stopped the loop");
        };
        assert!(commands.is_empty());

        let state = app.event_loop().state();
        assert_eq!(state.ui.layout.width, 100);
        assert_eq!(state.ui.layout.height, 30);
        assert!(state.ui.show_help);
        // tick, key and a single coalesced resize
        assert_eq!(app.event_loop().snapshot_metrics().actions, 3);
    }

    #[tokio::test]
    async fn ctrl_c_key_interrupts() {
        let dir = notes_dir(&["a.md"]);
        let events = ScriptedEvents::default();
        let mut app = App::new(
            config_for(dir.path(), "true"),
            FakeTerminal::new(),
            events.clone(),
            ShutdownSignal::default(),
        );

        let feeder = feed(
            &events,
            vec![(
                100,
                TerminalEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            )],
        );

        assert_eq!(
            run_within(&mut app, Duration::from_secs(3)).await,
            ExitReason::Interrupt
        );
        feeder.await.unwrap();
    }

    #[tokio::test]
    async fn signal_outside_editor_stops_loop() {
        let dir = notes_dir(&["a.md"]);
        let shutdown = ShutdownSignal::default();
        let mut app = App::new(
            config_for(dir.path(), "true"),
            FakeTerminal::new(),
            ScriptedEvents::default(),
            shutdown.clone(),
        );

        assert!(shutdown.trigger());
        assert_eq!(
            run_within(&mut app, Duration::from_secs(3)).await,
            ExitReason::Signal
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn signal_during_editor_is_ignored() {
        let dir = notes_dir(&["b.md"]);
        let events = ScriptedEvents::default();
        let shutdown = ShutdownSignal::default();

        let mut terminal = FakeTerminal::new();
        terminal.signal_on_suspend = Some(shutdown.clone());
        let mut app = App::new(
            config_for(dir.path(), "true"),
            terminal,
            events.clone(),
            shutdown.clone(),
        );

        let feeder = feed(
            &events,
            vec![
                (300, key_event(KeyCode::Enter)),
                (500, key_event(KeyCode::Char('q'))),
            ],
        );

        let reason = run_within(&mut app, Duration::from_secs(5)).await;
        feeder.await.unwrap();

        assert_eq!(reason, ExitReason::Quit);
        assert_eq!(app.event_loop().state().phase(), Phase::Idle);
        {
            let queue = events.0.lock().unwrap();
            assert_eq!((queue.pauses, queue.resumes), (1, 1));
        }
        assert_eq!(app.into_terminal().calls, vec!["suspend", "resume"]);

        // accepted again once the editor is gone
        assert!(shutdown.trigger());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn resume_picks_up_new_terminal_size() {
        let dir = notes_dir(&["b.md"]);
        let events = ScriptedEvents::default();

        let mut terminal = FakeTerminal::new();
        terminal.resize_on_suspend = Some((90, 20));
        let mut app = App::new(
            config_for(dir.path(), "false"),
            terminal,
            events.clone(),
            ShutdownSignal::default(),
        );

        let feeder = feed(
            &events,
            vec![
                (300, key_event(KeyCode::Enter)),
                (500, key_event(KeyCode::Char('q'))),
            ],
        );

        assert_eq!(
            run_within(&mut app, Duration::from_secs(5)).await,
            ExitReason::Quit
        );
        feeder.await.unwrap();

        let state = app.event_loop().state();
        assert_eq!(state.ui.layout.width, 90);
        assert_eq!(state.ui.layout.list_width, 30);
        assert_eq!(state.phase(), Phase::Idle);
        // non-zero exit is reported, not fatal
        let notification = state.ui.notification.as_ref().unwrap();
        assert_eq!(notification.level, NotificationLevel::Error);
        assert!(notification.message.contains("false"));
    }
}
