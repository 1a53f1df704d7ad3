//! Preview pane contents for the selected note.

pub const NO_SELECTION_TITLE: &str = "No file selected";
pub const PREVIEW_ERROR_BODY: &str = "Error reading file";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub title: String,
    pub body: String,
    /// The note has more content than `body` shows.
    pub truncated: bool,
}

impl PreviewState {
    pub fn no_selection() -> Self {
        Self {
            title: NO_SELECTION_TITLE.to_string(),
            ..Self::default()
        }
    }

    pub fn read_error(filename: &str) -> Self {
        Self {
            title: filename.to_string(),
            body: PREVIEW_ERROR_BODY.to_string(),
            truncated: false,
        }
    }
}
