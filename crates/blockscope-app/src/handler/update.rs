//! Main update function - handles state transitions (TEA pattern)

use std::sync::Arc;

use blockscope_core::prelude::*;
use blockscope_core::EpisodeRecord;

use crate::engine_event::EngineEvent;
use crate::loader::ScanJob;
use crate::message::Message;
use crate::registry::ScanId;
use crate::session::ListSession;
use crate::state::AppState;

use super::{commands, UpdateAction, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        // ─────────────────────────────────────────────────────────
        // Session Lifecycle
        // ─────────────────────────────────────────────────────────
        Message::OpenSession => {
            if state.session.is_some() {
                forget_session(state);
            }
            let session = state.open_session();
            info!("Opened list session {}", session.id);
            UpdateResult::message(Message::Load)
        }

        Message::ForgetSession => {
            forget_session(state);
            UpdateResult::none()
        }

        Message::Load => handle_load(state),

        // ─────────────────────────────────────────────────────────
        // Loader Results
        // ─────────────────────────────────────────────────────────
        Message::ScanCompleted { scan_id, records } => {
            handle_scan_completed(state, scan_id, records)
        }

        Message::ScanFailed { scan_id, reason } => {
            state.registry.take(scan_id);
            error!("Scan {} was not queued: {}", scan_id, reason);
            UpdateResult::none()
        }

        Message::RecordsCleared { deleted } => {
            state.push_event(EngineEvent::ListCleared { deleted });
            // Scans queued before the delete may have delivered stale rows
            if state.session.is_some() {
                UpdateResult::message(Message::Load)
            } else {
                UpdateResult::none()
            }
        }

        // ─────────────────────────────────────────────────────────
        // List Commands
        // ─────────────────────────────────────────────────────────
        Message::Command(command) => commands::handle_command(state, command),

        Message::SetSort(key) => {
            if let Some(session) = state.session.clone() {
                session.view().set_sort_key(key);
                state.push_event(list_updated(&session));
            }
            UpdateResult::none()
        }

        Message::Remove { start_time } => handle_remove(state, start_time),

        // ─────────────────────────────────────────────────────────
        // Share Results
        // ─────────────────────────────────────────────────────────
        Message::ShareCompleted {
            start_time,
            destination,
        } => {
            state.push_event(EngineEvent::Shared {
                start_time,
                destination,
            });
            UpdateResult::none()
        }

        Message::ShareFailed { start_time, reason } => {
            warn!("Share of {} failed: {}", start_time, reason);
            state.push_event(EngineEvent::ShareFailed { start_time, reason });
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Record Directory Watcher
        // ─────────────────────────────────────────────────────────
        Message::RecordsChanged { paths } => {
            debug!("{} record file(s) changed", paths.len());
            state.push_event(EngineEvent::FilesChanged { paths });
            if state.session.is_some() {
                UpdateResult::message(Message::Load)
            } else {
                UpdateResult::none()
            }
        }

        Message::WatcherError { message } => {
            warn!("Record watcher error: {}", message);
            UpdateResult::none()
        }

        Message::Quit => {
            state.quitting = true;
            UpdateResult::none()
        }
    }
}

/// Build a `ListUpdated` event from the session's current view.
pub(crate) fn list_updated(session: &ListSession) -> EngineEvent {
    let view = session.view();
    EngineEvent::ListUpdated {
        session_id: session.id,
        records: view.records().to_vec(),
        display_state: view.display_state(),
        sort_key: view.sort_key(),
    }
}

fn forget_session(state: &mut AppState) {
    let forgotten = state.registry.forget_all();
    if let Some(session) = state.session.take() {
        info!(
            "Forgot list session {} ({} scan(s) in flight)",
            session.id, forgotten
        );
    }
}

fn handle_load(state: &mut AppState) -> UpdateResult {
    let Some(session) = state.session.clone() else {
        debug!("Load requested with no list session");
        return UpdateResult::none();
    };

    let scan_id = state.registry.register(&session);
    let sort_key = session.view().sort_key();
    debug!("Submitting scan {} for session {}", scan_id, session.id);

    UpdateResult::action(UpdateAction::SubmitScan(ScanJob {
        scan_id,
        store: state.store.clone(),
        policy: Arc::clone(&state.policy),
        sort_key,
    }))
}

fn handle_scan_completed(
    state: &mut AppState,
    scan_id: ScanId,
    mut records: Vec<EpisodeRecord>,
) -> UpdateResult {
    let Some(session) = state.registry.take(scan_id) else {
        debug!("Scan {}: {}", scan_id, Error::StaleConsumer);
        state.push_event(EngineEvent::ScanDropped { scan_id });
        return UpdateResult::none();
    };

    // Files may have been removed since the worker read them
    records.retain(|r| r.backing_file.exists());
    session.deliver(records);
    state.push_event(list_updated(&session));
    UpdateResult::none()
}

fn handle_remove(state: &mut AppState, start_time: String) -> UpdateResult {
    let removed = state
        .session
        .as_ref()
        .and_then(|s| s.view().remove(&start_time));

    let Some(record) = removed else {
        warn!("{}", Error::record_not_found(&start_time));
        state.push_event(EngineEvent::RecordNotFound { start_time });
        return UpdateResult::none();
    };

    let path = record.backing_file.path.clone();
    state.push_event(EngineEvent::RecordRemoved {
        session_id: state.session_id(),
        record: Box::new(record),
    });

    UpdateResult::action(UpdateAction::DeleteRecordFile {
        store: state.store.clone(),
        path,
    })
}
