//! Application state (Model in TEA pattern)

use std::path::PathBuf;
use std::sync::Arc;

use blockscope_core::prelude::*;
use blockscope_core::EpisodeRecord;

use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::policy::PolicyFilter;
use crate::registry::InFlightRegistry;
use crate::session::{ListSession, SessionId};
use crate::store::RecordStore;

#[derive(Debug)]
pub struct AppState {
    /// Application settings from config file
    pub settings: Settings,

    /// The record directory
    pub store: RecordStore,

    /// Inclusion policy shared with every queued scan
    pub policy: Arc<PolicyFilter>,

    /// The live list consumer, if any. The only strong handle.
    pub session: Option<Arc<ListSession>>,

    /// Outstanding scans
    pub registry: InFlightRegistry,

    pub quitting: bool,

    /// Events produced while handling the current message
    pending_events: Vec<EngineEvent>,
}

impl AppState {
    pub fn new(settings: Settings, record_dir: impl Into<PathBuf>) -> Self {
        let policy = Arc::new(PolicyFilter::from_settings(&settings.filter));
        Self {
            settings,
            store: RecordStore::new(record_dir),
            policy,
            session: None,
            registry: InFlightRegistry::new(),
            quitting: false,
            pending_events: Vec::new(),
        }
    }

    /// Use a custom policy (e.g. a custom whitelist matcher).
    pub fn with_policy(mut self, policy: PolicyFilter) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// Replace the current session with a fresh one.
    pub fn open_session(&mut self) -> Arc<ListSession> {
        let session = Arc::new(ListSession::new(
            self.settings.ui.default_sort,
            self.settings.records.max_stored_count,
        ));
        self.session = Some(session.clone());
        session
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Look up a listed record by its start time.
    pub fn find_record(&self, start_time: &str) -> Result<EpisodeRecord> {
        self.session
            .as_ref()
            .and_then(|s| s.view().find(start_time).cloned())
            .ok_or_else(|| Error::record_not_found(start_time))
    }

    pub fn push_event(&mut self, event: EngineEvent) {
        self.pending_events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_session_replaces_previous() {
        let mut state = AppState::new(Settings::default(), "/records");
        let first = state.open_session();
        let second = state.open_session();

        assert_ne!(first.id, second.id);
        assert_eq!(state.session_id(), Some(second.id));
        assert_eq!(Arc::strong_count(&first), 1);
    }

    #[test]
    fn test_find_record_without_session() {
        let state = AppState::new(Settings::default(), "/records");
        let err = state.find_record("06-12 10:00:00.123").unwrap_err();
        assert!(matches!(err, Error::RecordNotFound { .. }));
    }

    #[test]
    fn test_events_are_drained() {
        let mut state = AppState::new(Settings::default(), "/records");
        state.push_event(EngineEvent::Shutdown);
        assert_eq!(state.take_events().len(), 1);
        assert!(state.take_events().is_empty());
    }
}
