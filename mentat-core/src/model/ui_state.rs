//! UI state: input mode, status notification and target geometry.

/// Rows reserved below the panes for the status bar.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// UI input modes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UIMode {
    #[default]
    Browse,
    /// Keystrokes edit the list filter.
    Filter,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

/// Status line message
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

/// Rendering targets derived from the terminal size. The list takes about
/// a third of the width, the preview the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutSize {
    pub width: u16,
    pub height: u16,
    pub list_width: u16,
    pub preview_width: u16,
    pub body_height: u16,
}

impl LayoutSize {
    pub fn from_terminal(width: u16, height: u16) -> Self {
        let list_width = width / 3;
        Self {
            width,
            height,
            list_width,
            preview_width: width - list_width,
            body_height: height.saturating_sub(STATUS_BAR_HEIGHT),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UIState {
    pub mode: UIMode,
    pub notification: Option<Notification>,
    pub show_help: bool,
    pub layout: LayoutSize,
    redraw: bool,
}

impl UIState {
    pub fn set_layout(&mut self, width: u16, height: u16) {
        self.layout = LayoutSize::from_terminal(width, height);
    }

    pub fn show_info(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Info);
    }

    pub fn show_warning(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Warning);
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Error);
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
        });
    }

    #[inline]
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    #[inline]
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    #[inline]
    pub fn clear_redraw(&mut self) {
        self.redraw = false;
    }
}
