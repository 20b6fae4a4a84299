//! In-flight registry - outstanding scans and who they deliver to
//!
//! Each submitted scan gets a [`ScanId`] and a weak link to the session that
//! asked for it. The link is resolved once, at delivery. Forgetting clears
//! every link so results that arrive later are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::session::ListSession;

/// Identifier of one submitted scan
pub type ScanId = u64;

#[derive(Debug, Default)]
pub struct InFlightRegistry {
    next_id: ScanId,
    entries: HashMap<ScanId, Weak<ListSession>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new scan for `session`.
    pub fn register(&mut self, session: &Arc<ListSession>) -> ScanId {
        self.next_id += 1;
        let id = self.next_id;
        self.entries.insert(id, Arc::downgrade(session));
        id
    }

    /// Remove a scan's entry and resolve its session.
    ///
    /// `None` when the scan was forgotten or the session is gone.
    pub fn take(&mut self, id: ScanId) -> Option<Arc<ListSession>> {
        self.entries.remove(&id)?.upgrade()
    }

    /// Forget every outstanding scan. Returns how many were dropped.
    pub fn forget_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn contains(&self, id: ScanId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockscope_core::SortKey;

    fn session() -> Arc<ListSession> {
        Arc::new(ListSession::new(SortKey::Cost, 30))
    }

    #[test]
    fn test_register_and_take() {
        let mut registry = InFlightRegistry::new();
        let session = session();

        let id = registry.register(&session);
        assert!(registry.contains(id));

        let resolved = registry.take(id).unwrap();
        assert_eq!(resolved.id, session.id);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_distinct() {
        let mut registry = InFlightRegistry::new();
        let session = session();
        let first = registry.register(&session);
        let second = registry.register(&session);
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_take_after_session_dropped() {
        let mut registry = InFlightRegistry::new();
        let session = session();
        let id = registry.register(&session);
        drop(session);

        assert!(registry.take(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_does_not_keep_session_alive() {
        let mut registry = InFlightRegistry::new();
        let session = session();
        registry.register(&session);
        assert_eq!(Arc::strong_count(&session), 1);
    }

    #[test]
    fn test_forget_all() {
        let mut registry = InFlightRegistry::new();
        let session = session();
        let id = registry.register(&session);
        registry.register(&session);

        assert_eq!(registry.forget_all(), 2);
        assert!(registry.take(id).is_none());
    }
}
