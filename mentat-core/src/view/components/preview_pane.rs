//! src/view/components/preview_pane.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::{model::preview_state::PreviewState, view::theme};

pub const TRUNCATION_MARKER: &str = "…";

pub struct PreviewPane;

impl PreviewPane {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, preview: &PreviewState, area: Rect) {
        let mut lines: Vec<Line> = preview.body.lines().map(Line::from).collect();
        if preview.truncated {
            lines.push(Line::styled(TRUNCATION_MARKER, theme::truncation_marker_style()));
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", preview.title))
                .title_style(theme::pane_title_style())
                .border_style(theme::pane_border_style())
                .style(theme::pane_style()),
        );

        frame.render_widget(paragraph, area);
    }
}

impl Default for PreviewPane {
    fn default() -> Self {
        Self::new()
    }
}
