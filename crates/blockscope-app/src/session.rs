//! List session - the consumer that owns the visible record list
//!
//! A session is shared as `Arc<ListSession>` by the app state and only ever
//! referenced weakly by outstanding scans. Dropping the state's handle ends
//! the session; later deliveries find nothing to upgrade.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use blockscope_core::prelude::*;
use blockscope_core::{sort_records, EpisodeRecord, ListDisplayState, SortKey};

/// Unique identifier for a list session
pub type SessionId = u64;

static SESSION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a new unique session ID
pub fn next_session_id() -> SessionId {
    SESSION_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// The record list as currently displayed
#[derive(Debug, Clone, Default)]
pub struct ListView {
    records: Vec<EpisodeRecord>,
    sort_key: SortKey,
    display_state: ListDisplayState,
    max_stored_count: usize,
}

impl ListView {
    pub fn new(sort_key: SortKey, max_stored_count: usize) -> Self {
        Self {
            records: Vec::new(),
            sort_key,
            display_state: ListDisplayState::Loading,
            max_stored_count,
        }
    }

    pub fn records(&self) -> &[EpisodeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn display_state(&self) -> ListDisplayState {
        self.display_state
    }

    /// Swap in a freshly scanned list, ordered by the current key.
    pub fn replace(&mut self, mut records: Vec<EpisodeRecord>) {
        sort_records(&mut records, self.sort_key);
        self.records = records;
        self.display_state = ListDisplayState::for_len(self.records.len());
    }

    /// Re-order the loaded list in place.
    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
        sort_records(&mut self.records, key);
    }

    pub fn toggle_sort(&mut self) -> SortKey {
        self.set_sort_key(self.sort_key.toggled());
        self.sort_key
    }

    pub fn find(&self, start_time: &str) -> Option<&EpisodeRecord> {
        self.records.iter().find(|r| r.start_time == start_time)
    }

    /// Drop a record from the list. Returns it if it was listed.
    pub fn remove(&mut self, start_time: &str) -> Option<EpisodeRecord> {
        let index = self.records.iter().position(|r| r.start_time == start_time)?;
        let record = self.records.remove(index);
        self.display_state = ListDisplayState::for_len(self.records.len());
        Some(record)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.display_state = ListDisplayState::Empty;
    }

    /// Position label: `MAX. ` on the first row of a full list, otherwise a
    /// countdown so the oldest-numbered row is `1. `.
    pub fn row_label(&self, position: usize) -> String {
        let len = self.records.len();
        if position == 0 && len == self.max_stored_count {
            "MAX. ".to_string()
        } else {
            format!("{}. ", len.saturating_sub(position))
        }
    }

    pub fn row_title(&self, position: usize) -> Option<String> {
        let record = self.records.get(position)?;
        Some(format!(
            "{}{} blocked {}ms",
            self.row_label(position),
            record.stack_summary,
            record.duration_ms
        ))
    }
}

/// A live consumer of scan results
#[derive(Debug)]
pub struct ListSession {
    pub id: SessionId,
    view: Mutex<ListView>,
}

impl ListSession {
    pub fn new(sort_key: SortKey, max_stored_count: usize) -> Self {
        Self {
            id: next_session_id(),
            view: Mutex::new(ListView::new(sort_key, max_stored_count)),
        }
    }

    /// Lock the view. A poisoned lock still yields the data.
    pub fn view(&self) -> MutexGuard<'_, ListView> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the currently displayed records
    pub fn snapshot(&self) -> Vec<EpisodeRecord> {
        self.view().records().to_vec()
    }

    pub fn deliver(&self, records: Vec<EpisodeRecord>) {
        let mut view = self.view();
        view.replace(records);
        debug!("Session {} now lists {} record(s)", self.id, view.len());
    }
}
