//! src/terminal.rs
//! ============================================================================
//! # Terminal ownership
//!
//! Raw mode and the alternate screen are entered once at startup and left on
//! exit or panic. While an external editor runs, the terminal is handed to
//! the child through a [`SuspendGuard`], which resumes the UI when dropped,
//! whatever way the hand-off ended.

use std::io::{self, Stdout};
use std::panic::PanicHookInfo;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{error, info, warn};

use crate::error::AppError;

pub type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Something that can give the screen away and take it back.
pub trait TerminalHandoff {
    /// Restore the cooked terminal so a child process can use it.
    fn suspend(&mut self) -> Result<(), AppError>;

    /// Re-enter UI mode and force a full repaint on the next draw.
    fn resume(&mut self) -> Result<(), AppError>;
}

impl TerminalHandoff for AppTerminal {
    fn suspend(&mut self) -> Result<(), AppError> {
        leave_ui_mode(self)
    }

    fn resume(&mut self) -> Result<(), AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal("enable raw mode", e))?;
        execute!(self.backend_mut(), EnterAlternateScreen)
            .map_err(|e| AppError::terminal("enter alternate screen", e))?;
        self.clear().map_err(|e| AppError::terminal("clear", e))?;
        self.hide_cursor()
            .map_err(|e| AppError::terminal("hide cursor", e))
    }
}

/// Individual steps of leaving UI mode.
trait UiModeSteps {
    fn show_cursor(&mut self) -> io::Result<()>;
    fn hide_cursor(&mut self) -> io::Result<()>;
    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()>;
    fn leave_alternate_screen(&mut self) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

impl UiModeSteps for AppTerminal {
    fn show_cursor(&mut self) -> io::Result<()> {
        Terminal::show_cursor(self)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        Terminal::hide_cursor(self)
    }

    fn set_raw_mode(&mut self, enabled: bool) -> io::Result<()> {
        if enabled {
            enable_raw_mode()
        } else {
            disable_raw_mode()
        }
    }

    fn leave_alternate_screen(&mut self) -> io::Result<()> {
        execute!(self.backend_mut(), LeaveAlternateScreen)
    }

    fn flush(&mut self) -> io::Result<()> {
        ratatui::backend::Backend::flush(self.backend_mut())
    }
}

/// On failure, steps already taken are undone so the UI stays usable.
fn leave_ui_mode<S: UiModeSteps + ?Sized>(steps: &mut S) -> Result<(), AppError> {
    steps
        .show_cursor()
        .map_err(|e| AppError::terminal("show cursor", e))?;

    if let Err(e) = steps.set_raw_mode(false) {
        let _ = steps.hide_cursor();
        return Err(AppError::terminal("disable raw mode", e));
    }

    if let Err(e) = steps.leave_alternate_screen() {
        // half-suspended is worse than not suspended
        let _ = steps.set_raw_mode(true);
        let _ = steps.hide_cursor();
        return Err(AppError::terminal("leave alternate screen", e));
    }

    steps.flush().map_err(|e| AppError::terminal("flush", e))
}

/// Holds the terminal suspended; resumes it on drop.
pub struct SuspendGuard<'a, H: TerminalHandoff + ?Sized> {
    handoff: &'a mut H,
}

impl<'a, H: TerminalHandoff + ?Sized> SuspendGuard<'a, H> {
    pub fn acquire(handoff: &'a mut H) -> Result<Self, AppError> {
        handoff.suspend()?;
        Ok(Self { handoff })
    }
}

impl<H: TerminalHandoff + ?Sized> Drop for SuspendGuard<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.handoff.resume() {
            error!("Failed to resume terminal after hand-off: {}", e);
        }
    }
}

/// Initialize terminal in raw mode with alternate screen
pub fn setup_terminal() -> Result<AppTerminal, AppError> {
    enable_raw_mode().map_err(|e| AppError::terminal("enable raw mode", e))?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(AppError::terminal("enter alternate screen", e));
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| {
        teardown_terminal();
        AppError::terminal("create terminal", e)
    })?;
    terminal
        .hide_cursor()
        .map_err(|e| AppError::terminal("hide cursor", e))?;

    info!("Terminal setup complete");
    Ok(terminal)
}

/// Restore terminal to normal mode
pub fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<(), AppError> {
    disable_raw_mode().map_err(|e| AppError::terminal("disable raw mode", e))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| AppError::terminal("leave alternate screen", e))?;
    terminal
        .show_cursor()
        .map_err(|e| AppError::terminal("show cursor", e))?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
        warn!("Failed to leave alternate screen: {}", e);
    }
}

/// Restores the terminal before the default hook prints the panic.
pub fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
