//! Message processing
//!
//! Runs a message (and any follow-up messages) through the TEA update
//! function and dispatches the resulting actions.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::actions::handle_action;
use crate::handler;
use crate::loader::Loader;
use crate::message::Message;
use crate::share::ShareTarget;
use crate::state::AppState;

/// Process a message through the TEA update function
pub fn process_message(
    state: &mut AppState,
    message: Message,
    msg_tx: &mpsc::Sender<Message>,
    loader: &Loader,
    share_target: &Arc<dyn ShareTarget>,
) {
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        if let Some(action) = result.action {
            handle_action(action, msg_tx.clone(), loader, Arc::clone(share_target));
        }

        msg = result.message;
    }
}
