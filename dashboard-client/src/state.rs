// Dashboard view state: category filter, scroll window and detail modal

use chrono::{DateTime, Utc};

use backend_domain::{LootEntry, LootPage, LootTotals};

use crate::filters::{is_excluded, CategoryFilter};
use crate::metadata::ItemMetadata;

pub const PAGE_SIZE: usize = 24;
pub const MAX_ENTRIES: usize = 500;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    Loading(LootEntry),
    Loaded(LootEntry, ItemMetadata),
    /// Metadata lookup failed or found nothing; the entry itself still renders.
    Unavailable(LootEntry),
}

impl ModalState {
    pub fn entry(&self) -> Option<&LootEntry> {
        match self {
            ModalState::Closed => None,
            ModalState::Loading(entry)
            | ModalState::Loaded(entry, _)
            | ModalState::Unavailable(entry) => Some(entry),
        }
    }
}

#[derive(Debug)]
pub struct CharacterColumn<'a> {
    pub character: &'a str,
    pub entries: Vec<&'a LootEntry>,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    entries: Vec<LootEntry>,
    totals: LootTotals,
    category: CategoryFilter,
    character: Option<String>,
    page_size: usize,
    window: usize,
    loading: bool,
    last_update: Option<DateTime<Utc>>,
    modal: ModalState,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl DashboardState {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            entries: Vec::new(),
            totals: LootTotals::default(),
            category: CategoryFilter::All,
            character: None,
            page_size,
            window: page_size,
            loading: true,
            last_update: None,
            modal: ModalState::Closed,
        }
    }

    /// Poll result: the server page becomes the whole list.
    pub fn replace(&mut self, page: LootPage, now: DateTime<Utc>) {
        self.entries = page.logs;
        self.entries.truncate(MAX_ENTRIES);
        self.totals = page.totals;
        self.last_update = Some(now);
        self.loading = false;
    }

    /// Push result: prepends one entry. Returns false when it was ignored.
    pub fn append(&mut self, entry: LootEntry) -> bool {
        if !self.matches(&entry) || self.entries.iter().any(|e| e.id == entry.id) {
            return false;
        }
        self.totals.record(entry.quality, 1);
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
        true
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        if self.category != category {
            self.loading = true;
        }
        self.category = category;
        self.window = self.page_size;
    }

    /// Pushed entries for other characters are dropped.
    pub fn set_character(&mut self, character: Option<String>) {
        self.character = character.filter(|name| !name.is_empty());
    }

    /// Sets the visible window to `pages` pages. Polls leave it untouched.
    pub fn show_pages(&mut self, pages: usize) {
        self.window = self.page_size * pages.max(1);
    }

    /// Extends the visible window by one page. False when nothing more exists.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.window += self.page_size;
        true
    }

    pub fn has_more(&self) -> bool {
        self.filtered().count() > self.window
    }

    pub fn visible_entries(&self) -> Vec<&LootEntry> {
        self.filtered().take(self.window).collect()
    }

    /// Visible entries bucketed by character. The list is newest first, so
    /// first appearance orders the columns by each character's latest drop.
    pub fn columns(&self) -> Vec<CharacterColumn<'_>> {
        let mut columns: Vec<CharacterColumn<'_>> = Vec::new();
        for entry in self.visible_entries() {
            match columns
                .iter_mut()
                .find(|column| column.character == entry.character)
            {
                Some(column) => column.entries.push(entry),
                None => columns.push(CharacterColumn {
                    character: &entry.character,
                    entries: vec![entry],
                }),
            }
        }
        columns
    }

    /// Opens the modal for `id`; the caller fetches metadata for the returned entry.
    pub fn select(&mut self, id: &str) -> Option<LootEntry> {
        let entry = self.entries.iter().find(|entry| entry.id == id)?.clone();
        self.modal = ModalState::Loading(entry.clone());
        Some(entry)
    }

    /// Completes a pending lookup. Results for an entry no longer selected are dropped.
    pub fn set_details(&mut self, id: &str, details: Option<ItemMetadata>) {
        let ModalState::Loading(entry) = &self.modal else {
            return;
        };
        if entry.id != id {
            return;
        }
        let entry = entry.clone();
        self.modal = match details {
            Some(details) => ModalState::Loaded(entry, details),
            None => ModalState::Unavailable(entry),
        };
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    pub fn totals(&self) -> &LootTotals {
        &self.totals
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    pub fn entries(&self) -> &[LootEntry] {
        &self.entries
    }

    fn matches(&self, entry: &LootEntry) -> bool {
        self.category.matches(entry)
            && self
                .character
                .as_deref()
                .map_or(true, |character| entry.character == character)
    }

    fn filtered(&self) -> impl Iterator<Item = &LootEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| !is_excluded(&entry.item_name) && self.matches(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::Quality;

    fn entry(id: &str, character: &str, item: &str, quality: Quality) -> LootEntry {
        LootEntry {
            id: id.to_string(),
            timestamp: "2025-10-15T10:00:00Z".to_string(),
            character: character.to_string(),
            character_class: None,
            level: None,
            difficulty: None,
            item_name: item.to_string(),
            item_id: String::new(),
            quality,
            location: "Unknown".to_string(),
            dropped_by: String::new(),
            stats: Vec::new(),
        }
    }

    fn page(logs: Vec<LootEntry>) -> LootPage {
        let mut totals = LootTotals::default();
        for log in &logs {
            totals.record(log.quality, 1);
        }
        LootPage { logs, totals }
    }

    #[test]
    fn replace_clears_loading_and_stamps_time() {
        let mut state = DashboardState::default();
        assert!(state.is_loading());
        let now = Utc::now();

        state.replace(page(vec![entry("a", "Bob", "Shako", Quality::Unique)]), now);

        assert!(!state.is_loading());
        assert_eq!(state.last_update(), Some(now));
        assert_eq!(state.totals().uniques, 1);
    }

    #[test]
    fn append_prepends_and_skips_known_or_filtered() {
        let mut state = DashboardState::default();
        state.replace(page(vec![entry("a", "Bob", "Shako", Quality::Unique)]), Utc::now());
        state.set_category(CategoryFilter::Only(Quality::Unique));

        assert!(state.append(entry("b", "Amy", "Arachnid Mesh", Quality::Unique)));
        assert!(!state.append(entry("b", "Amy", "Arachnid Mesh", Quality::Unique)));
        assert!(!state.append(entry("c", "Amy", "Ber Rune", Quality::Rune)));

        assert_eq!(state.entries()[0].id, "b");
        assert_eq!(state.totals().total, 2);
        assert_eq!(state.totals().runes, 0);
    }

    #[test]
    fn append_drops_other_characters() {
        let mut state = DashboardState::default();
        state.set_character(Some("Bob".to_string()));
        state.replace(page(vec![entry("a", "Bob", "Shako", Quality::Unique)]), Utc::now());

        assert!(!state.append(entry("b", "Amy", "Ber Rune", Quality::Rune)));
        assert!(state.append(entry("c", "Bob", "Ber Rune", Quality::Rune)));

        let columns = state
            .columns()
            .iter()
            .map(|column| column.character)
            .collect::<Vec<_>>();
        assert_eq!(columns, vec!["Bob"]);
        assert_eq!(state.totals().total, 2);
    }

    #[test]
    fn window_is_stable_across_polls() {
        let mut state = DashboardState::new(24);
        state.show_pages(2);
        let logs = (0..100)
            .map(|n| entry(&n.to_string(), "Bob", "Ring", Quality::Rare))
            .collect::<Vec<_>>();

        for _ in 0..4 {
            state.replace(page(logs.clone()), Utc::now());
            assert_eq!(state.visible_entries().len(), 48);
        }
    }

    #[test]
    fn list_is_capped() {
        let mut state = DashboardState::default();
        for n in 0..MAX_ENTRIES + 10 {
            state.append(entry(&n.to_string(), "Bob", "Ring", Quality::Rare));
        }
        assert_eq!(state.entries().len(), MAX_ENTRIES);
        assert_eq!(state.entries()[0].id, (MAX_ENTRIES + 9).to_string());
    }

    #[test]
    fn excluded_items_never_show() {
        let mut state = DashboardState::default();
        state.replace(
            page(vec![
                entry("a", "Bob", "Full Rejuvenation Potion", Quality::Normal),
                entry("b", "Bob", "Shako", Quality::Unique),
                entry("c", "Bob", "Key of Hate", Quality::Normal),
            ]),
            Utc::now(),
        );
        let visible = state
            .visible_entries()
            .iter()
            .map(|e| e.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(visible, vec!["b"]);
    }

    #[test]
    fn window_grows_by_page_and_resets_on_category_change() {
        let mut state = DashboardState::new(2);
        state.replace(
            page(
                (0..5)
                    .map(|n| entry(&n.to_string(), "Bob", "Ring", Quality::Rare))
                    .collect(),
            ),
            Utc::now(),
        );

        assert_eq!(state.visible_entries().len(), 2);
        assert!(state.load_more());
        assert!(state.load_more());
        assert_eq!(state.visible_entries().len(), 5);
        assert!(!state.has_more());
        assert!(!state.load_more());

        state.set_category(CategoryFilter::Only(Quality::Rare));
        assert_eq!(state.visible_entries().len(), 2);
    }

    #[test]
    fn columns_follow_latest_drop_per_character() {
        let mut state = DashboardState::default();
        state.replace(
            page(vec![
                entry("1", "Amy", "Ber Rune", Quality::Rune),
                entry("2", "Bob", "Shako", Quality::Unique),
                entry("3", "Amy", "Ring", Quality::Rare),
            ]),
            Utc::now(),
        );

        let columns = state.columns();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].character, "Amy");
        let amy = columns[0].entries.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(amy, vec!["1", "3"]);
        assert_eq!(columns[1].character, "Bob");
    }

    #[test]
    fn modal_moves_through_loading() {
        let mut state = DashboardState::default();
        state.replace(
            page(vec![
                entry("a", "Bob", "Shako", Quality::Unique),
                entry("b", "Bob", "Ber Rune", Quality::Rune),
            ]),
            Utc::now(),
        );

        assert!(state.select("missing").is_none());
        assert_eq!(state.modal(), &ModalState::Closed);

        state.select("a").expect("selected");
        assert!(matches!(state.modal(), ModalState::Loading(e) if e.id == "a"));

        state.set_details("b", Some(ItemMetadata::default()));
        assert!(matches!(state.modal(), ModalState::Loading(_)));

        state.set_details("a", None);
        assert!(matches!(state.modal(), ModalState::Unavailable(e) if e.id == "a"));

        state.select("b");
        state.set_details("b", Some(ItemMetadata::default()));
        assert!(matches!(state.modal(), ModalState::Loaded(e, _) if e.id == "b"));

        state.close_modal();
        assert!(state.modal().entry().is_none());
    }
}
