//! Message types for the application (TEA pattern)

use std::path::PathBuf;

use blockscope_core::{EpisodeRecord, SortKey};

use crate::registry::ScanId;

/// User commands on the record list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    /// Switch between cost and recency ordering
    Sort,

    /// Delete every record file and empty the list
    DeleteAll,

    /// Hand a record's text summary to the share target
    Share { start_time: String },

    /// Hand a record's backing file to the share target
    ShareStackDump { start_time: String },
}

/// All possible messages in the application
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Session Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Start a new list session (replacing any current one) and load it
    OpenSession,

    /// Tear down the current session; outstanding scans become inert
    ForgetSession,

    /// Rescan the record directory for the current session
    Load,

    // ─────────────────────────────────────────────────────────
    // Loader Results
    // ─────────────────────────────────────────────────────────
    /// A scan finished on the background worker
    ScanCompleted {
        scan_id: ScanId,
        records: Vec<EpisodeRecord>,
    },

    /// A scan could not be queued
    ScanFailed { scan_id: ScanId, reason: String },

    /// The background worker finished deleting every record file
    RecordsCleared { deleted: usize },

    // ─────────────────────────────────────────────────────────
    // List Commands
    // ─────────────────────────────────────────────────────────
    Command(ListCommand),

    /// Order the list by a specific key
    SetSort(SortKey),

    /// Discard one record (file and list entry)
    Remove { start_time: String },

    // ─────────────────────────────────────────────────────────
    // Share Results
    // ─────────────────────────────────────────────────────────
    ShareCompleted {
        start_time: String,
        destination: String,
    },

    ShareFailed { start_time: String, reason: String },

    // ─────────────────────────────────────────────────────────
    // Record Directory Watcher
    // ─────────────────────────────────────────────────────────
    /// Files appeared or changed in the record directory
    RecordsChanged { paths: Vec<PathBuf> },

    WatcherError { message: String },

    /// Stop processing
    Quit,
}
