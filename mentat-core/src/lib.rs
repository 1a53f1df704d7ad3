pub mod error;

pub mod config;

pub mod terminal;

pub mod app;

pub mod controller {

    pub mod actions;
    pub use actions::{Action, Command};

    pub mod event_loop;
    pub use event_loop::{EventLoop, MetricsSnap, TaskResult, order_batch};
}

pub mod model {
    pub mod app_state;
    pub use app_state::{AppState, Phase, PreviewRequest};

    pub mod list_state;
    pub use list_state::ListState;

    pub mod preview_state;
    pub use preview_state::PreviewState;

    pub mod ui_state;
    pub use ui_state::{LayoutSize, Notification, NotificationLevel, UIMode, UIState};
}

pub mod view {
    pub mod theme;

    pub mod ui;

    pub mod components {
        pub mod note_list;
        pub use note_list::NoteList;
        pub mod preview_pane;
        pub use preview_pane::PreviewPane;
        pub mod status_bar;
        pub use status_bar::StatusBar;
    }

    pub use components::*;
}

pub use view::*;

pub mod fs {
    pub mod dir_scanner;
    pub mod note_entry;
    pub mod preview;
}

pub mod tasks {
    pub mod editor_task;

    pub mod preview_task;

    pub mod scan_task;
}

pub mod logging;
pub use logging::Logger;

pub use error::AppError;

pub use model::{app_state::AppState, ui_state::UIState};
