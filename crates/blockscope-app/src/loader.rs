//! Loader - the single background worker behind every scan
//!
//! Jobs are queued on an unbounded channel and run one at a time, in
//! submission order, on the blocking pool. The worker never sees a session:
//! a scan carries only its [`ScanId`] and its result goes back to the engine
//! as [`Message::ScanCompleted`], where the in-flight registry decides
//! whether anyone is still listening.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use blockscope_core::prelude::*;
use blockscope_core::{sort_records, EpisodeRecord, SortKey};

use crate::message::Message;
use crate::policy::PolicyFilter;
use crate::registry::ScanId;
use crate::store::RecordStore;

/// One directory scan
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub scan_id: ScanId,
    pub store: RecordStore,
    pub policy: Arc<PolicyFilter>,
    pub sort_key: SortKey,
}

/// Work the background worker serializes
#[derive(Debug, Clone)]
pub enum WorkerJob {
    Scan(ScanJob),
    DeleteAll { store: RecordStore },
}

/// Read, filter and sort the record directory.
///
/// Never fails: unreadable directories and corrupt files end up as an
/// empty or shorter list.
pub fn run_scan(store: &RecordStore, policy: &PolicyFilter, sort_key: SortKey) -> Vec<EpisodeRecord> {
    let records = store.list_valid_records();
    let mut visible = policy.apply(records, store);
    sort_records(&mut visible, sort_key);
    visible
}

/// Handle to the background worker
#[derive(Debug)]
pub struct Loader {
    job_tx: Option<mpsc::UnboundedSender<WorkerJob>>,
    worker: Option<JoinHandle<()>>,
}

impl Loader {
    /// Start the worker. Must be called inside a tokio runtime.
    pub fn spawn(msg_tx: mpsc::Sender<Message>) -> Self {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(job_rx, msg_tx));
        Self {
            job_tx: Some(job_tx),
            worker: Some(worker),
        }
    }

    /// Queue a job behind everything already submitted.
    pub fn submit(&self, job: WorkerJob) -> Result<()> {
        let job_tx = self.job_tx.as_ref().ok_or(Error::ChannelClosed)?;
        job_tx
            .send(job)
            .map_err(|e| Error::channel_send(format!("loader worker stopped: {e}")))
    }

    /// Stop accepting jobs and wait for the queued ones to finish.
    pub async fn shutdown(&mut self) {
        self.job_tx.take();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                error!("Loader worker ended abnormally: {}", e);
            }
        }
    }
}

async fn run_worker(mut job_rx: mpsc::UnboundedReceiver<WorkerJob>, msg_tx: mpsc::Sender<Message>) {
    debug!("Loader worker started");

    while let Some(job) = job_rx.recv().await {
        let msg = match job {
            WorkerJob::Scan(job) => {
                let scan_id = job.scan_id;
                let records = tokio::task::spawn_blocking(move || {
                    run_scan(&job.store, &job.policy, job.sort_key)
                })
                .await
                .unwrap_or_else(|e| {
                    error!("Scan {} panicked: {}", scan_id, e);
                    Vec::new()
                });
                trace!("Scan {} produced {} record(s)", scan_id, records.len());
                Message::ScanCompleted { scan_id, records }
            }
            WorkerJob::DeleteAll { store } => {
                let deleted = tokio::task::spawn_blocking(move || store.delete_all())
                    .await
                    .unwrap_or_else(|e| {
                        error!("Delete-all panicked: {}", e);
                        0
                    });
                Message::RecordsCleared { deleted }
            }
        };

        if msg_tx.send(msg).await.is_err() {
            debug!("Engine channel closed, loader worker stopping");
            break;
        }
    }

    debug!("Loader worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterSettings;
    use crate::store::test_support::{file_count, write_record};
    use tempfile::tempdir;

    const APP_FRAME: &str = "com.example.feed.FeedAdapter.bind(FeedAdapter.java:88)";

    fn policy() -> Arc<PolicyFilter> {
        Arc::new(PolicyFilter::from_settings(&FilterSettings::default()))
    }

    #[test]
    fn test_run_scan_sorts_by_key() {
        let temp = tempdir().unwrap();
        write_record(temp.path(), "a.log", 100, &[APP_FRAME]);
        write_record(temp.path(), "b.log", 900, &[APP_FRAME]);
        write_record(temp.path(), "c.log", 400, &[APP_FRAME]);

        let store = RecordStore::new(temp.path());
        let records = run_scan(&store, &policy(), SortKey::Cost);

        let durations: Vec<i64> = records.iter().map(|r| r.duration_ms).collect();
        assert_eq!(durations, vec![900, 400, 100]);
        assert!(records.iter().all(|r| r.stack_summary == "FeedAdapter.java:88"));
    }

    #[test]
    fn test_run_scan_on_missing_directory() {
        let temp = tempdir().unwrap();
        let store = RecordStore::new(temp.path().join("missing"));
        assert!(run_scan(&store, &policy(), SortKey::Cost).is_empty());
    }

    #[tokio::test]
    async fn test_worker_delivers_in_submission_order() {
        let temp = tempdir().unwrap();
        write_record(temp.path(), "a.log", 100, &[APP_FRAME]);

        let (msg_tx, mut msg_rx) = mpsc::channel(16);
        let mut loader = Loader::spawn(msg_tx);
        let store = RecordStore::new(temp.path());

        for scan_id in 1..=3 {
            loader
                .submit(WorkerJob::Scan(ScanJob {
                    scan_id,
                    store: store.clone(),
                    policy: policy(),
                    sort_key: SortKey::Cost,
                }))
                .unwrap();
        }

        for expected in 1..=3 {
            match msg_rx.recv().await {
                Some(Message::ScanCompleted { scan_id, records }) => {
                    assert_eq!(scan_id, expected);
                    assert_eq!(records.len(), 1);
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }

        loader.shutdown().await;
    }

    #[tokio::test]
    async fn test_worker_delete_all() {
        let temp = tempdir().unwrap();
        write_record(temp.path(), "a.log", 100, &[APP_FRAME]);
        write_record(temp.path(), "b.log", 200, &[APP_FRAME]);

        let (msg_tx, mut msg_rx) = mpsc::channel(16);
        let mut loader = Loader::spawn(msg_tx);
        loader
            .submit(WorkerJob::DeleteAll {
                store: RecordStore::new(temp.path()),
            })
            .unwrap();

        match msg_rx.recv().await {
            Some(Message::RecordsCleared { deleted }) => assert_eq!(deleted, 2),
            other => panic!("unexpected message: {other:?}"),
        }
        assert_eq!(file_count(temp.path()), 0);

        loader.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_fails() {
        let (msg_tx, _msg_rx) = mpsc::channel(16);
        let mut loader = Loader::spawn(msg_tx);
        loader.shutdown().await;

        let temp = tempdir().unwrap();
        let result = loader.submit(WorkerJob::DeleteAll {
            store: RecordStore::new(temp.path()),
        });
        assert!(matches!(result, Err(Error::ChannelClosed)));
    }
}
