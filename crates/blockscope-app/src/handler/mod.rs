//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `commands`: List commands (sort, delete all, share)

pub(crate) mod commands;
pub(crate) mod update;


use std::path::PathBuf;

use blockscope_core::EpisodeRecord;

use crate::loader::ScanJob;
use crate::message::Message;
use crate::store::RecordStore;

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Queue a scan on the loader worker
    SubmitScan(ScanJob),

    /// Queue deletion of every record file on the loader worker
    DeleteAll { store: RecordStore },

    /// Delete one record file right away
    DeleteRecordFile { store: RecordStore, path: PathBuf },

    /// Hand a record to the share target
    Share {
        record: Box<EpisodeRecord>,
        stack_dump: bool,
    },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }
}
