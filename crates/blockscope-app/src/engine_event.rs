//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`. The headless runner and the CLI are both driven
//! entirely by these.

use std::path::PathBuf;

use blockscope_core::{EpisodeRecord, ListDisplayState, SortKey};

use crate::registry::ScanId;
use crate::session::SessionId;

#[derive(Debug, Clone)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // List Updates
    // ─────────────────────────────────────────────────────────
    /// A session's list was replaced or re-ordered
    ListUpdated {
        session_id: SessionId,
        records: Vec<EpisodeRecord>,
        display_state: ListDisplayState,
        sort_key: SortKey,
    },

    /// One record was discarded by the user
    RecordRemoved {
        session_id: Option<SessionId>,
        record: Box<EpisodeRecord>,
    },

    /// Every record file was deleted
    ListCleared { deleted: usize },

    /// A scan result arrived with nobody left to receive it
    ScanDropped { scan_id: ScanId },

    // ─────────────────────────────────────────────────────────
    // Share
    // ─────────────────────────────────────────────────────────
    Shared {
        start_time: String,
        destination: String,
    },

    ShareFailed { start_time: String, reason: String },

    // ─────────────────────────────────────────────────────────
    // Errors and Lifecycle
    // ─────────────────────────────────────────────────────────
    /// No listed record has this start time
    RecordNotFound { start_time: String },

    /// Record files appeared or changed on disk
    FilesChanged { paths: Vec<PathBuf> },

    Shutdown,
}

impl EngineEvent {
    /// Get a string label for the event type (for logging/filtering)
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ListUpdated { .. } => "list_updated",
            Self::RecordRemoved { .. } => "record_removed",
            Self::ListCleared { .. } => "list_cleared",
            Self::ScanDropped { .. } => "scan_dropped",
            Self::Shared { .. } => "shared",
            Self::ShareFailed { .. } => "share_failed",
            Self::RecordNotFound { .. } => "record_not_found",
            Self::FilesChanged { .. } => "files_changed",
            Self::Shutdown => "shutdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_event_type_labels() {
        assert_eq!(EngineEvent::Shutdown.event_type(), "shutdown");
        assert_eq!(
            EngineEvent::ListCleared { deleted: 3 }.event_type(),
            "list_cleared"
        );
        assert_eq!(
            EngineEvent::ListUpdated {
                session_id: 1,
                records: Vec::new(),
                display_state: ListDisplayState::Empty,
                sort_key: SortKey::Cost,
            }
            .event_type(),
            "list_updated"
        );
        assert_eq!(
            EngineEvent::RecordNotFound {
                start_time: "x".to_string()
            }
            .event_type(),
            "record_not_found"
        );
    }
}
