//! Action handlers: UpdateAction dispatch and background task spawning

use std::sync::Arc;

use tokio::sync::mpsc;

use blockscope_core::prelude::*;

use crate::handler::UpdateAction;
use crate::loader::{Loader, WorkerJob};
use crate::message::Message;
use crate::share::{share_record, ShareTarget};

/// Execute an action
pub fn handle_action(
    action: UpdateAction,
    msg_tx: mpsc::Sender<Message>,
    loader: &Loader,
    share_target: Arc<dyn ShareTarget>,
) {
    match action {
        UpdateAction::SubmitScan(job) => {
            let scan_id = job.scan_id;
            if let Err(e) = loader.submit(WorkerJob::Scan(job)) {
                warn!("Scan {} not queued: {}", scan_id, e);
                // The registry entry is only released by this message
                tokio::spawn(async move {
                    let msg = Message::ScanFailed {
                        scan_id,
                        reason: e.to_string(),
                    };
                    if msg_tx.send(msg).await.is_err() {
                        debug!("Engine channel closed before scan {} failure", scan_id);
                    }
                });
            }
        }

        UpdateAction::DeleteAll { store } => {
            if let Err(e) = loader.submit(WorkerJob::DeleteAll { store }) {
                error!("Delete-all not queued: {}", e);
            }
        }

        UpdateAction::DeleteRecordFile { store, path } => {
            // Best effort: the record is already gone from the list
            if let Err(e) = store.delete(&path) {
                error!("{}", e);
            }
        }

        UpdateAction::Share { record, stack_dump } => {
            tokio::spawn(async move {
                let start_time = record.start_time.clone();
                let result = tokio::task::spawn_blocking(move || {
                    share_record(share_target.as_ref(), &record, stack_dump)
                })
                .await;

                let msg = match result {
                    Ok(Ok(destination)) => Message::ShareCompleted {
                        start_time,
                        destination,
                    },
                    Ok(Err(e)) => Message::ShareFailed {
                        start_time,
                        reason: e.to_string(),
                    },
                    Err(e) => Message::ShareFailed {
                        start_time,
                        reason: format!("share task failed: {e}"),
                    },
                };
                let _ = msg_tx.send(msg).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterSettings;
    use crate::loader::ScanJob;
    use crate::policy::PolicyFilter;
    use crate::share::MockShareTarget;
    use crate::store::RecordStore;
    use blockscope_core::SortKey;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rejected_scan_reported_even_when_channel_is_full() {
        let temp = tempdir().unwrap();
        let (msg_tx, mut msg_rx) = mpsc::channel(1);
        let mut loader = Loader::spawn(msg_tx.clone());
        loader.shutdown().await;

        msg_tx.try_send(Message::Quit).unwrap();

        let job = ScanJob {
            scan_id: 7,
            store: RecordStore::new(temp.path()),
            policy: Arc::new(PolicyFilter::from_settings(&FilterSettings::default())),
            sort_key: SortKey::Cost,
        };
        handle_action(
            UpdateAction::SubmitScan(job),
            msg_tx,
            &loader,
            Arc::new(MockShareTarget::new()),
        );

        assert!(matches!(msg_rx.recv().await, Some(Message::Quit)));
        let msg = tokio::time::timeout(Duration::from_secs(5), msg_rx.recv())
            .await
            .expect("scan failure was dropped");
        assert!(matches!(msg, Some(Message::ScanFailed { scan_id: 7, .. })));
    }
}
