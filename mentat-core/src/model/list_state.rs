//! Note list with filter and key-based selection.
//!
//! The selection is stored as the selected entry's key (its file name), not
//! an index, so it survives rescans and refiltering. When present it always
//! names an entry in `items`.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::debug;

use crate::fs::note_entry::NoteEntry;

#[derive(Debug, Clone, Default)]
pub struct ListState {
    items: Vec<NoteEntry>,
    filter: String,
    /// Indices into `items` that pass the filter, in list order.
    visible: Vec<usize>,
    selected: Option<String>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[NoteEntry] {
        &self.items
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_filtered(&self) -> bool {
        !self.filter.is_empty()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_entries(&self) -> impl Iterator<Item = &NoteEntry> + '_ {
        self.visible.iter().map(|&i| &self.items[i])
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_entry(&self) -> Option<&NoteEntry> {
        let key = self.selected.as_deref()?;
        self.items.iter().find(|e| e.key() == key)
    }

    /// Position of the selection within the filtered view.
    pub fn selected_visible_index(&self) -> Option<usize> {
        let key = self.selected.as_deref()?;
        self.visible
            .iter()
            .position(|&i| self.items[i].key() == key)
    }

    /// Replaces the items wholesale. The selection defaults to the first
    /// visible entry when there was none, is kept when its entry survived,
    /// and is cleared otherwise.
    pub fn set_items(&mut self, items: Vec<NoteEntry>) {
        self.items = items;
        self.refilter();

        self.selected = match self.selected.take() {
            None => self.first_visible_key(),
            Some(key) if self.is_visible(&key) => Some(key),
            Some(key) => {
                debug!("Selected note {} disappeared, clearing selection", key);
                None
            }
        };
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.refilter();
        self.reselect_after_filter();
    }

    pub fn push_filter_char(&mut self, c: char) {
        let mut filter = std::mem::take(&mut self.filter);
        filter.push(c);
        self.set_filter(filter);
    }

    pub fn pop_filter_char(&mut self) {
        let mut filter = std::mem::take(&mut self.filter);
        filter.pop();
        self.set_filter(filter);
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(String::new());
    }

    pub fn select_next(&mut self) {
        self.move_selection(1);
    }

    pub fn select_prev(&mut self) {
        self.move_selection(-1);
    }

    pub fn page_down(&mut self, page: usize) {
        self.move_selection(page as isize);
    }

    pub fn page_up(&mut self, page: usize) {
        self.move_selection(-(page as isize));
    }

    pub fn select_first(&mut self) {
        self.selected = self.first_visible_key();
    }

    pub fn select_last(&mut self) {
        self.selected = self
            .visible
            .last()
            .map(|&i| self.items[i].key().to_string());
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }

        let target = match self.selected_visible_index() {
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
            None => 0,
        };
        self.selected = Some(self.items[self.visible[target]].key().to_string());
    }

    fn first_visible_key(&self) -> Option<String> {
        self.visible
            .first()
            .map(|&i| self.items[i].key().to_string())
    }

    fn is_visible(&self, key: &str) -> bool {
        self.visible.iter().any(|&i| self.items[i].key() == key)
    }

    fn reselect_after_filter(&mut self) {
        let keep = self
            .selected
            .as_deref()
            .is_some_and(|key| self.is_visible(key));
        if !keep {
            self.selected = self.first_visible_key();
        }
    }

    /// Case-insensitive fuzzy match; every whitespace-separated token must
    /// match. List order (recency) is preserved.
    fn refilter(&mut self) {
        let tokens: Vec<String> = self
            .filter
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        if tokens.is_empty() {
            self.visible = (0..self.items.len()).collect();
            return;
        }

        let matcher = SkimMatcherV2::default();
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                let name = entry.name.to_lowercase();
                tokens
                    .iter()
                    .all(|token| matcher.fuzzy_match(&name, token).is_some())
            })
            .map(|(i, _)| i)
            .collect();

        debug!(
            filtered_count = self.visible.len(),
            total = self.items.len(),
            "note filter applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn entries(names: &[&str]) -> Vec<NoteEntry> {
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(10_000);
        names
            .iter()
            .enumerate()
            .map(|(i, n)| NoteEntry::new(*n, base - Duration::from_secs(i as u64)))
            .collect()
    }

    fn visible(list: &ListState) -> Vec<&str> {
        list.visible_entries().map(NoteEntry::key).collect()
    }

    #[test]
    fn first_scan_selects_first_entry() {
        let mut list = ListState::new();
        list.set_items(entries(&["b.md", "a.md"]));
        assert_eq!(list.selected(), Some("b.md"));
    }

    #[test]
    fn rescan_keeps_surviving_selection() {
        let mut list = ListState::new();
        list.set_items(entries(&["b.md", "a.md"]));
        list.select_next();
        assert_eq!(list.selected(), Some("a.md"));

        list.set_items(entries(&["c.md", "b.md", "a.md"]));
        assert_eq!(list.selected(), Some("a.md"));
        assert_eq!(list.selected_visible_index(), Some(2));
    }

    #[test]
    fn rescan_clears_vanished_selection() {
        let mut list = ListState::new();
        list.set_items(entries(&["b.md", "a.md"]));
        list.set_items(entries(&["c.md"]));
        assert_eq!(list.selected(), None);

        list.set_items(Vec::new());
        assert_eq!(list.selected(), None);
        assert_eq!(list.visible_len(), 0);
    }

    #[test]
    fn navigation_clamps_at_edges() {
        let mut list = ListState::new();
        list.set_items(entries(&["a.md", "b.md", "c.md"]));

        list.select_prev();
        assert_eq!(list.selected(), Some("a.md"));
        list.page_down(10);
        assert_eq!(list.selected(), Some("c.md"));
        list.select_next();
        assert_eq!(list.selected(), Some("c.md"));
        list.select_first();
        assert_eq!(list.selected(), Some("a.md"));
        list.select_last();
        assert_eq!(list.selected(), Some("c.md"));
        list.page_up(2);
        assert_eq!(list.selected(), Some("a.md"));
    }

    #[test]
    fn fuzzy_filter_preserves_recency_order() {
        let mut list = ListState::new();
        list.set_items(entries(&["groceries.md", "meeting-notes.md", "gym-log.md"]));

        list.set_filter("gr");
        assert_eq!(visible(&list), vec!["groceries.md"]);

        list.set_filter("G");
        assert_eq!(visible(&list), vec!["groceries.md", "meeting-notes.md", "gym-log.md"]);

        list.set_filter("meet notes");
        assert_eq!(visible(&list), vec!["meeting-notes.md"]);
        assert_eq!(list.selected(), Some("meeting-notes.md"));
    }

    #[test]
    fn filter_hiding_selection_moves_it_to_first_match() {
        let mut list = ListState::new();
        list.set_items(entries(&["alpha.md", "beta.md", "gamma.md"]));
        list.select_last();

        for c in "bet".chars() {
            list.push_filter_char(c);
        }
        assert_eq!(list.selected(), Some("beta.md"));

        list.set_filter("zzz");
        assert_eq!(list.visible_len(), 0);
        assert_eq!(list.selected(), None);

        list.clear_filter();
        assert_eq!(list.selected(), Some("alpha.md"));
    }

    #[test]
    fn filter_keeps_visible_selection() {
        let mut list = ListState::new();
        list.set_items(entries(&["alpha.md", "beta.md", "alphabet.md"]));
        list.select_last();

        list.set_filter("alpha");
        assert_eq!(list.selected(), Some("alphabet.md"));
        list.pop_filter_char();
        assert_eq!(list.filter(), "alph");
        assert_eq!(list.selected(), Some("alphabet.md"));
    }
}
