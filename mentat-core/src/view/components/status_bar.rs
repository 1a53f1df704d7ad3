//! src/view/components/status_bar.rs
//!
//! Single-row status line: mode or filter prompt and counts on the left,
//! the latest notification (or key help) on the right.

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};

use crate::{
    model::{app_state::AppState, ui_state::UIMode},
    view::theme,
};

pub const HELP_TEXT: &str =
    "j/k move  PgUp/PgDn page  g/G ends  Enter open  / filter  Esc clear  r rescan  q quit";

pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let list = &state.list;

        let mut left: Vec<Span> = Vec::with_capacity(4);
        match state.ui.mode {
            UIMode::Filter => {
                left.push(Span::styled(format!(" /{}▏", list.filter()), theme::filter_prompt_style()));
            }
            UIMode::Browse if list.is_filtered() => {
                left.push(Span::styled(format!(" /{}", list.filter()), theme::filter_prompt_style()));
            }
            UIMode::Browse => left.push(Span::raw(" Browse")),
        }

        let position = list.selected_visible_index().map_or(0, |i| i + 1);
        left.push(Span::raw(format!(" | {}/{} | ", position, list.visible_len())));
        left.push(Span::styled(state.phase().to_string(), theme::phase_style()));

        let right: Line = if state.ui.show_help {
            Line::from(HELP_TEXT)
        } else if let Some(n) = &state.ui.notification {
            Line::styled(n.message.as_str(), theme::notification_style(n.level))
        } else {
            Line::from("? help")
        };

        let [left_area, right_area] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(area);

        Paragraph::new(Line::from(left))
            .style(theme::status_bar_style())
            .alignment(Alignment::Left)
            .render(left_area, frame.buffer_mut());

        Paragraph::new(right)
            .style(theme::status_bar_style())
            .alignment(Alignment::Right)
            .render(right_area, frame.buffer_mut());
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
