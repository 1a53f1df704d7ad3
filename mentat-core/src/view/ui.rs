//! src/view/ui.rs
//! ============================================================
//! Frame renderer that draws the entire TUI from an immutable
//! `AppState`. Rendering never mutates state.

use std::time::{Duration, Instant};

use ratatui::prelude::*;
use tracing::{instrument, trace};

use crate::{
    model::{app_state::AppState, ui_state::LayoutSize},
    view::components::{note_list::NoteList, preview_pane::PreviewPane, status_bar::StatusBar},
};

/// ---------------------------------------------------------------------------
/// Renderer struct (contains only stats)
/// ---------------------------------------------------------------------------
#[derive(Default)]
pub struct UIRenderer {
    stats: RenderStats,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RenderStats {
    pub frames: u64,
    pub slow: u64,
    pub total: Duration,
}

impl RenderStats {
    /// Mean time spent in [`UIRenderer::render`] per frame.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.frames) {
            Ok(0) => Duration::ZERO,
            Ok(frames) => self.total / frames,
            Err(_) => self.total.div_f64(self.frames as f64),
        }
    }
}

impl UIRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, f: &mut Frame<'_>, state: &AppState) {
        let start = Instant::now();
        let screen = f.area();

        // last resize can lag the real frame by one draw
        let layout = if state.ui.layout.width == screen.width && state.ui.layout.height == screen.height {
            state.ui.layout
        } else {
            LayoutSize::from_terminal(screen.width, screen.height)
        };

        let [main, status] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(screen);
        let [list_area, preview_area] =
            Layout::horizontal([Constraint::Length(layout.list_width), Constraint::Fill(1)])
                .areas(main);

        NoteList::new().render(f, state, list_area);
        PreviewPane::new().render(f, &state.preview, preview_area);
        StatusBar::new().render(f, state, status);

        let dur = start.elapsed();
        self.stats.total += dur;
        if dur.as_millis() > 16 {
            self.stats.slow += 1;
        }
        self.stats.frames += 1;
        trace!("Frame {} drawn in {:?}", self.stats.frames, dur);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fs::note_entry::NoteEntry;
    use crate::model::preview_state::PreviewState;
    use crate::model::ui_state::UIMode;
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    fn state_with(names: &[&str]) -> AppState {
        let config = Config {
            notes_dir: PathBuf::from("/notes"),
            ..Config::default()
        };
        let mut state = AppState::new(Arc::new(config));
        let base = SystemTime::now();
        state.list.set_items(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| NoteEntry::new(*n, base - Duration::from_secs(i as u64 * 60)))
                .collect(),
        );
        state.ui.set_layout(60, 12);
        state
    }

    fn draw(state: &AppState) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let mut renderer = UIRenderer::new();
        terminal.draw(|f| renderer.render(f, state)).unwrap();
        let stats = renderer.stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.average(), stats.total);

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    fn screen_contains(rows: &[String], needle: &str) -> bool {
        rows.iter().any(|row| row.contains(needle))
    }

    #[test]
    fn renders_list_preview_and_status() {
        let mut state = state_with(&["b.md", "a.md"]);
        state.preview = PreviewState {
            title: "b.md".into(),
            body: "line1\nline2".into(),
            truncated: true,
        };

        let rows = draw(&state);
        assert!(screen_contains(&rows, "▶ b.md"));
        assert!(screen_contains(&rows, "a.md"));
        assert!(screen_contains(&rows, "line1"));
        assert!(screen_contains(&rows, "line2"));
        assert!(screen_contains(&rows, "…"));
        assert!(rows[11].contains("1/2"));

        // list column is a third of the width
        let list_column: String = rows[1].chars().take(20).collect();
        assert!(list_column.contains("b.md"));
        assert!(!list_column.contains("line1"));
    }

    #[test]
    fn renders_sentinel_and_filter_prompt() {
        let mut state = state_with(&["alpha.md"]);
        state.ui.mode = UIMode::Filter;
        state.list.set_filter("zz");

        let rows = draw(&state);
        assert!(screen_contains(&rows, "No file selected"));
        assert!(rows[11].contains("/zz"));
        assert!(rows[11].contains("0/0"));
    }

    #[test]
    fn average_spreads_total_over_frames() {
        let stats = RenderStats {
            frames: 4,
            slow: 0,
            total: Duration::from_millis(20),
        };
        assert_eq!(stats.average(), Duration::from_millis(5));
        assert_eq!(RenderStats::default().average(), Duration::ZERO);
    }

    #[test]
    fn shows_latest_notification() {
        let mut state = state_with(&["a.md"]);
        state.ui.show_info("Selected: a.md");

        let rows = draw(&state);
        assert!(rows[11].contains("Selected: a.md"));
    }
}
