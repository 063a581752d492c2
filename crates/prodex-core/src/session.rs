//! Application state tying the catalog, index, scheduler and pager together
//!
//! A [`Session`] is the single writer for one catalog. Mutations build the
//! replacement index before anything is swapped, so a query sees either the
//! old generation with its old index or the new generation with its new index.

use crate::config::{self, Config};
use crate::import::{CsvImporter, ImportError, ParsedCatalog};
use crate::index::{SearchIndex, SearchOutcome};
use crate::paginate::ResultSet;
use crate::record::{Generation, ProductRecord};
use crate::scheduler::{Debouncer, Ticket};
use crate::store::{CatalogStore, FileStore, StoreError};
use std::fmt;
use std::path::Path;
use std::time::Instant;

/// Shown when no search term has been entered
pub const PROMPT: &str = "enter a search term";

/// Shown when a search term matched nothing
pub const NO_RESULTS: &str = "no results";

#[derive(Debug, Clone, Default)]
pub enum SearchState {
    #[default]
    NoQuery,
    Results(ResultSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Import,
    Reset,
}

/// What a catalog mutation did
#[derive(Debug)]
pub struct CatalogUpdate {
    pub kind: UpdateKind,
    /// Size of the now active catalog
    pub records: usize,
    pub short_rows: usize,
    pub excluded_rows: usize,
    /// Set when the new catalog is active but could not be saved
    pub save_error: Option<StoreError>,
}

impl fmt::Display for CatalogUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UpdateKind::Import => write!(f, "imported {} records", self.records)?,
            UpdateKind::Reset => write!(f, "catalog reset to {} default records", self.records)?,
        }
        if let Some(e) = &self.save_error {
            write!(f, " (not saved: {e})")?;
        }
        Ok(())
    }
}

pub struct Session {
    store: CatalogStore,
    index: SearchIndex,
    importer: CsvImporter,
    debouncer: Debouncer,
    /// Raw text of the last committed search
    committed: String,
    state: SearchState,
}

impl Session {
    pub fn new(store: CatalogStore, config: &Config) -> Self {
        let index = SearchIndex::build(store.records().clone());
        Self {
            store,
            index,
            importer: CsvImporter::new(config.import.clone()),
            debouncer: Debouncer::new(config.debounce()),
            committed: String::new(),
            state: SearchState::NoQuery,
        }
    }

    /// Session backed by the JSON file store inside `home`
    pub fn open(home: &Path, config: &Config) -> Self {
        let backend = FileStore::new(config::store_dir(home));
        Self::new(
            CatalogStore::open(Box::new(backend), config.storage_key.clone()),
            config,
        )
    }

    pub fn records(&self) -> &Generation {
        self.store.records()
    }

    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Raw text of the last committed search
    pub fn committed_text(&self) -> &str {
        &self.committed
    }

    /// A keystroke changed the search box. The search runs once input goes quiet.
    pub fn on_search_input(&mut self, text: impl Into<String>, now: Instant) -> Ticket {
        self.debouncer.schedule(text, now)
    }

    /// Run the debounced search if it is due. Returns true if a search ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(fired) => {
                self.search_now(&fired.text);
                true
            }
            None => false,
        }
    }

    /// Whether a debounced search is waiting to run
    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Search immediately, bypassing the debounce
    pub fn search_now(&mut self, text: &str) {
        self.committed = text.to_string();
        self.state = match self.index.query(text) {
            SearchOutcome::NoQuery => SearchState::NoQuery,
            SearchOutcome::Matches(m) => SearchState::Results(ResultSet::new(m.records)),
        };
    }

    /// Drop any pending input and return to the empty prompt
    pub fn clear_search(&mut self) {
        self.debouncer.cancel();
        self.search_now("");
    }

    /// Prompt or empty-result message, `None` when there are results to show
    pub fn status(&self) -> Option<&'static str> {
        match &self.state {
            SearchState::NoQuery => Some(PROMPT),
            SearchState::Results(rs) if rs.is_empty() => Some(NO_RESULTS),
            SearchState::Results(_) => None,
        }
    }

    fn results(&self) -> Option<&ResultSet> {
        match &self.state {
            SearchState::Results(rs) => Some(rs),
            SearchState::NoQuery => None,
        }
    }

    /// Total matches of the current search
    pub fn result_count(&self) -> usize {
        self.results().map_or(0, ResultSet::len)
    }

    /// Records on the current page
    pub fn page_records(&self) -> &[ProductRecord] {
        match self.results() {
            Some(rs) => rs.current(),
            None => &[],
        }
    }

    /// 1-based page shown, 0 when there is nothing to page through
    pub fn current_page(&self) -> usize {
        match self.results() {
            Some(rs) if !rs.is_empty() => rs.current_page(),
            _ => 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.results().map_or(0, ResultSet::page_count)
    }

    /// Pager controls are only worth showing with more than one page
    pub fn pagination_visible(&self) -> bool {
        self.page_count() > 1
    }

    pub fn has_prev_page(&self) -> bool {
        self.results().is_some_and(ResultSet::has_prev)
    }

    pub fn has_next_page(&self) -> bool {
        self.results().is_some_and(ResultSet::has_next)
    }

    /// Step by `delta` pages; moves past either edge are ignored
    pub fn change_page(&mut self, delta: isize) -> usize {
        if let SearchState::Results(rs) = &mut self.state {
            rs.change_page(delta);
        }
        self.current_page()
    }

    /// Jump to a page; out-of-range requests are ignored
    pub fn go_to_page(&mut self, page: usize) -> usize {
        if let SearchState::Results(rs) = &mut self.state {
            rs.go_to(page);
        }
        self.current_page()
    }

    /// Replace the catalog with pasted CSV text.
    ///
    /// On error nothing changes. On success the catalog, its saved copy and
    /// the index are all replaced before this returns.
    pub fn import_csv(&mut self, text: &str) -> Result<CatalogUpdate, ImportError> {
        self.import_bytes(text.as_bytes())
    }

    /// Like [`Session::import_csv`] for raw file or stdin contents
    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<CatalogUpdate, ImportError> {
        let parsed = match self.importer.parse_bytes(bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Import rejected: {e}");
                return Err(e);
            }
        };
        let ParsedCatalog {
            records,
            short_rows,
            excluded_rows,
        } = parsed;

        let save_error = self.swap_generation(records.into());
        let update = CatalogUpdate {
            kind: UpdateKind::Import,
            records: self.record_count(),
            short_rows,
            excluded_rows,
            save_error,
        };
        log::info!("{update}");
        Ok(update)
    }

    /// Restore the built-in seed catalog
    pub fn reset(&mut self) -> CatalogUpdate {
        let save_error = self.swap_generation(crate::record::default_seed().into());
        let update = CatalogUpdate {
            kind: UpdateKind::Reset,
            records: self.record_count(),
            short_rows: 0,
            excluded_rows: 0,
            save_error,
        };
        log::info!("{update}");
        update
    }

    /// Build the new index first, then swap store and index together and
    /// rerun the committed search against the new generation.
    fn swap_generation(&mut self, generation: Generation) -> Option<StoreError> {
        let index = SearchIndex::build(generation.clone());
        let save_error = self.store.replace(generation).err();
        self.index = index;
        let committed = std::mem::take(&mut self.committed);
        self.search_now(&committed);
        save_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::default_seed;
    use crate::store::tests::BrokenStore;
    use crate::store::{MemoryStore, DEFAULT_STORAGE_KEY};
    use std::time::Duration;

    const MS: Duration = Duration::from_millis(1);
    const HEADER: &str = "code,class,category,name,spec";

    fn session() -> Session {
        let store = CatalogStore::open(Box::new(MemoryStore::new()), DEFAULT_STORAGE_KEY);
        Session::new(store, &Config::default())
    }

    fn catalog_csv(rows: usize) -> String {
        let mut text = String::from(HEADER);
        for i in 1..=rows {
            text.push_str(&format!("\nP{i:03},x,Pumps,Pump model {i},{i}0W"));
        }
        text
    }

    fn codes(records: &[ProductRecord]) -> Vec<&str> {
        records.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn test_starts_with_prompt() {
        let s = session();
        assert_eq!(s.record_count(), default_seed().len());
        assert_eq!(s.status(), Some(PROMPT));
        assert!(s.page_records().is_empty());
        assert_eq!(s.page_count(), 0);
        assert_eq!(s.current_page(), 0);
        assert!(!s.pagination_visible());
    }

    #[test]
    fn test_blank_search_is_prompt_not_no_results() {
        let mut s = session();
        s.search_now("   ");
        assert_eq!(s.status(), Some(PROMPT));
        s.search_now("zzzz-missing");
        assert_eq!(s.status(), Some(NO_RESULTS));
        assert_eq!(s.current_page(), 0);
    }

    #[test]
    fn test_debounced_typing_runs_one_search() {
        let mut s = session();
        let t0 = Instant::now();
        for (i, text) in ["0", "01", "016", "0163"].into_iter().enumerate() {
            let now = t0 + (i as u32 * 50) * MS;
            assert!(!s.poll(now));
            s.on_search_input(text, now);
        }
        assert!(s.search_pending());
        assert_eq!(s.status(), Some(PROMPT));
        assert!(!s.poll(t0 + 400 * MS));
        assert!(s.poll(t0 + 450 * MS));
        assert!(!s.poll(t0 + 900 * MS));
        assert_eq!(s.committed_text(), "0163");
        assert_eq!(codes(s.page_records()), vec!["0163NA", "0163ND"]);
        assert_eq!(s.status(), None);
    }

    #[test]
    fn test_clear_search_cancels_pending_input() {
        let mut s = session();
        let t0 = Instant::now();
        s.search_now("perouse");
        s.on_search_input("perouse s", t0);
        s.clear_search();
        assert!(!s.poll(t0 + 1000 * MS));
        assert_eq!(s.status(), Some(PROMPT));
    }

    #[test]
    fn test_paging_through_results() {
        let mut s = session();
        s.import_csv(&catalog_csv(45)).unwrap();
        s.search_now("pump");
        assert_eq!(s.result_count(), 45);
        assert_eq!(s.page_count(), 3);
        assert!(s.pagination_visible());
        assert!(!s.has_prev_page());
        assert_eq!(s.page_records().len(), 20);

        assert_eq!(s.change_page(-1), 1);
        assert_eq!(s.change_page(1), 2);
        assert_eq!(s.page_records()[0].code, "P021");
        assert_eq!(s.go_to_page(3), 3);
        assert_eq!(s.page_records().len(), 5);
        assert!(!s.has_next_page());
        assert_eq!(s.change_page(1), 3);

        // A new query always starts on page 1
        s.search_now("p0");
        assert_eq!(s.current_page(), 1);
    }

    #[test]
    fn test_single_page_hides_pagination() {
        let mut s = session();
        s.search_now("perouse");
        assert_eq!(s.page_count(), 1);
        assert!(!s.pagination_visible());
    }

    #[test]
    fn test_import_replaces_catalog_and_index() {
        let mut s = session();
        let text = format!("{HEADER}\nZZ01,x,Cat,Name,Spec\n0001,x,Cat,Widget,Small\n");
        let update = s.import_csv(&text).unwrap();
        assert_eq!(update.records, 1);
        assert_eq!(update.excluded_rows, 1);
        assert!(update.save_error.is_none());
        assert_eq!(update.to_string(), "imported 1 records");

        assert_eq!(s.records()[0].id, 1);
        s.search_now("widget");
        assert_eq!(codes(s.page_records()), vec!["0001"]);
        s.search_now("perouse");
        assert_eq!(s.status(), Some(NO_RESULTS));
    }

    #[test]
    fn test_rejected_import_keeps_previous_catalog() {
        let mut s = session();
        s.search_now("0163");
        let before = s.records().clone();

        let err = s.import_csv(&format!("{HEADER}\nZZ9,x,c,n,s\n")).unwrap_err();
        assert!(matches!(err, ImportError::NoValidRows { .. }));
        assert!(matches!(s.import_csv(""), Err(ImportError::EmptyInput)));
        let err = s.import_bytes(b"h\nA,b,\xff,d,e\n").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));

        assert_eq!(&s.records()[..], &before[..]);
        assert_eq!(codes(s.page_records()), vec!["0163NA", "0163ND"]);
    }

    #[test]
    fn test_import_reruns_committed_search() {
        let mut s = session();
        s.search_now("pump");
        assert_eq!(s.status(), Some(NO_RESULTS));
        s.import_csv(&catalog_csv(3)).unwrap();
        assert_eq!(s.result_count(), 3);
        assert_eq!(s.current_page(), 1);
    }

    #[test]
    fn test_reset_restores_seed() {
        let mut s = session();
        s.import_csv(&catalog_csv(5)).unwrap();
        let update = s.reset();
        assert_eq!(update.kind, UpdateKind::Reset);
        assert_eq!(update.records, default_seed().len());
        assert_eq!(&s.records()[..], &default_seed()[..]);
        s.search_now("0185");
        assert_eq!(codes(s.page_records()), vec!["0185NA"]);
    }

    #[test]
    fn test_save_failure_is_reported_not_fatal() {
        let store = CatalogStore::open(Box::new(BrokenStore), DEFAULT_STORAGE_KEY);
        let mut s = Session::new(store, &Config::default());
        assert_eq!(s.record_count(), default_seed().len());

        let update = s.import_csv(&catalog_csv(2)).unwrap();
        assert!(update.save_error.is_some());
        assert_eq!(s.record_count(), 2);
        insta::assert_snapshot!(
            update,
            @"imported 2 records (not saved: Storage backend error: permission denied)"
        );
    }

    #[test]
    fn test_open_persists_between_sessions() {
        let home = tempfile::tempdir().unwrap();
        let config = Config::default();
        let mut s = Session::open(home.path(), &config);
        s.import_csv(&catalog_csv(4)).unwrap();
        drop(s);

        let s = Session::open(home.path(), &config);
        assert_eq!(s.record_count(), 4);
        assert!(home.path().join("store").join("product_data.json").exists());
    }
}
