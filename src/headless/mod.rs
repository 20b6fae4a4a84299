//! Headless mode - NDJSON event output for scripts
//!
//! `blockscope watch` keeps a list session open on the record directory and
//! prints one JSON object per line for every engine event. Commands are read
//! from stdin, one per line.
//!
//! # Example Output
//!
//! ```json
//! {"event":"list_updated","session_id":1,"display_state":"populated","sort":"cost","records":[...],"timestamp":1718186401000}
//! {"event":"record_removed","start_time":"06-12 10:00:00.123","path":"/sdcard/blockcanary/a.log","timestamp":1718186402000}
//! ```

pub mod runner;

use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use blockscope_app::EngineEvent;
use blockscope_core::{EpisodeRecord, ListDisplayState, SortKey};

/// One listed record, as printed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    pub start_time: String,
    pub duration_ms: i64,
    pub summary: String,
    pub path: PathBuf,
}

impl From<&EpisodeRecord> for RecordRow {
    fn from(record: &EpisodeRecord) -> Self {
        Self {
            start_time: record.start_time.clone(),
            duration_ms: record.duration_ms,
            summary: record.stack_summary.clone(),
            path: record.backing_file.path.clone(),
        }
    }
}

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    ListUpdated {
        session_id: u64,
        display_state: ListDisplayState,
        sort: SortKey,
        records: Vec<RecordRow>,
        timestamp: i64,
    },

    RecordRemoved {
        start_time: String,
        path: PathBuf,
        timestamp: i64,
    },

    ListCleared {
        deleted: usize,
        timestamp: i64,
    },

    ScanDropped {
        scan_id: u64,
        timestamp: i64,
    },

    Shared {
        start_time: String,
        destination: String,
        timestamp: i64,
    },

    ShareFailed {
        start_time: String,
        reason: String,
        timestamp: i64,
    },

    RecordNotFound {
        start_time: String,
        timestamp: i64,
    },

    FilesChanged {
        count: usize,
        timestamp: i64,
    },

    Error {
        message: String,
        timestamp: i64,
    },

    Shutdown {
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Serialize to one JSON line on stdout.
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn error(message: String) -> Self {
        Self::Error {
            message,
            timestamp: Self::now(),
        }
    }
}

impl From<EngineEvent> for HeadlessEvent {
    fn from(event: EngineEvent) -> Self {
        let timestamp = Self::now();
        match event {
            EngineEvent::ListUpdated {
                session_id,
                records,
                display_state,
                sort_key,
            } => Self::ListUpdated {
                session_id,
                display_state,
                sort: sort_key,
                records: records.iter().map(RecordRow::from).collect(),
                timestamp,
            },
            EngineEvent::RecordRemoved { record, .. } => Self::RecordRemoved {
                start_time: record.start_time,
                path: record.backing_file.path,
                timestamp,
            },
            EngineEvent::ListCleared { deleted } => Self::ListCleared { deleted, timestamp },
            EngineEvent::ScanDropped { scan_id } => Self::ScanDropped { scan_id, timestamp },
            EngineEvent::Shared {
                start_time,
                destination,
            } => Self::Shared {
                start_time,
                destination,
                timestamp,
            },
            EngineEvent::ShareFailed { start_time, reason } => Self::ShareFailed {
                start_time,
                reason,
                timestamp,
            },
            EngineEvent::RecordNotFound { start_time } => Self::RecordNotFound {
                start_time,
                timestamp,
            },
            EngineEvent::FilesChanged { paths } => Self::FilesChanged {
                count: paths.len(),
                timestamp,
            },
            EngineEvent::Shutdown => Self::Shutdown { timestamp },
        }
    }
}
