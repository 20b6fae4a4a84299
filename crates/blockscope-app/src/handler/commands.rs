//! List command handlers

use blockscope_core::prelude::*;

use crate::engine_event::EngineEvent;
use crate::message::ListCommand;
use crate::state::AppState;

use super::update::list_updated;
use super::{UpdateAction, UpdateResult};

/// Dispatch one list command
pub fn handle_command(state: &mut AppState, command: ListCommand) -> UpdateResult {
    match command {
        ListCommand::Sort => {
            if let Some(session) = state.session.clone() {
                let key = session.view().toggle_sort();
                debug!("Session {} sorted by {}", session.id, key.label());
                state.push_event(list_updated(&session));
            }
            UpdateResult::none()
        }

        ListCommand::DeleteAll => {
            if let Some(session) = state.session.clone() {
                session.view().clear();
                state.push_event(list_updated(&session));
            }
            UpdateResult::action(UpdateAction::DeleteAll {
                store: state.store.clone(),
            })
        }

        ListCommand::Share { start_time } => share(state, start_time, false),

        ListCommand::ShareStackDump { start_time } => share(state, start_time, true),
    }
}

fn share(state: &mut AppState, start_time: String, stack_dump: bool) -> UpdateResult {
    match state.find_record(&start_time) {
        Ok(record) => UpdateResult::action(UpdateAction::Share {
            record: Box::new(record),
            stack_dump,
        }),
        Err(e) => {
            warn!("{}", e);
            state.push_event(EngineEvent::RecordNotFound { start_time });
            UpdateResult::none()
        }
    }
}
