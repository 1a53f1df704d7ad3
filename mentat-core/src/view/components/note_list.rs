//! src/view/components/note_list.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState as WidgetListState},
};

use crate::{model::app_state::AppState, view::theme};

pub struct NoteList;

impl NoteList {
    pub fn new() -> Self {
        Self
    }

    /// Two rows per note: the file name, then its modification time.
    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, area: Rect) {
        let list = &state.list;

        let items: Vec<ListItem> = list
            .visible_entries()
            .map(|entry| {
                ListItem::new(vec![
                    Line::from(entry.name.as_str()),
                    Line::styled(entry.modified_display(), theme::note_date_style()),
                ])
            })
            .collect();

        let title = if state.scan_in_flight && list.items().is_empty() {
            " Loading… ".to_string()
        } else if list.is_filtered() {
            format!(" Notes {}/{} ", list.visible_len(), list.items().len())
        } else {
            format!(" Notes ({}) ", list.items().len())
        };

        let widget = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(theme::pane_title_style())
                    .border_style(theme::pane_border_style())
                    .style(theme::pane_style()),
            )
            .highlight_style(theme::list_highlight_style())
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        let mut widget_state = WidgetListState::default().with_selected(list.selected_visible_index());
        frame.render_stateful_widget(widget, area, &mut widget_state);
    }
}

impl Default for NoteList {
    fn default() -> Self {
        Self::new()
    }
}
