//! Record directory watcher
//!
//! Watches the record directory for files the detection engine writes and
//! asks for a rescan, with debouncing. Removals are ignored: scans delete
//! files themselves and must not trigger another scan.
//!
//! The debounce window is the only guard against reading a record that is
//! still being written. A detector that stalls mid-write for longer than
//! `debounce_ms` leaves a truncated file, which the rescan rejects and
//! deletes like any other corrupt record. Raise `debounce_ms` above the
//! detector's worst write time if that matters.

use std::path::PathBuf;
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use tokio::sync::mpsc;

use blockscope_core::prelude::*;

use crate::config::WatcherSettings;
use crate::message::Message;

/// Watches one record directory
pub struct RecordWatcher {
    dir: PathBuf,
    debounce: Duration,
    /// Handle to stop the watcher
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl RecordWatcher {
    pub fn new(dir: impl Into<PathBuf>, settings: &WatcherSettings) -> Self {
        Self {
            dir: dir.into(),
            debounce: Duration::from_millis(settings.debounce_ms),
            stop_tx: None,
        }
    }

    /// Start watching. Sends `Message::RecordsChanged` to the channel.
    pub fn start(&mut self, message_tx: mpsc::Sender<Message>) -> Result<()> {
        if self.is_running() {
            return Err(Error::config("record watcher is already running"));
        }

        let dir = self.dir.clone();
        let debounce = self.debounce;
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel();
        self.stop_tx = Some(stop_tx);

        tokio::task::spawn_blocking(move || {
            Self::run_watcher(dir, debounce, message_tx, stop_rx);
        });

        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    fn run_watcher(
        dir: PathBuf,
        debounce: Duration,
        message_tx: mpsc::Sender<Message>,
        mut stop_rx: tokio::sync::oneshot::Receiver<()>,
    ) {
        let tx_clone = message_tx.clone();

        let debouncer_result = new_debouncer(debounce, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let mut paths: Vec<PathBuf> = events
                        .iter()
                        .filter(|event| event.kind.is_create() || event.kind.is_modify())
                        .flat_map(|event| event.paths.iter().cloned())
                        .collect();
                    paths.sort();
                    paths.dedup();

                    if paths.is_empty() {
                        return;
                    }

                    debug!("Record watcher saw {} changed file(s)", paths.len());
                    let _ = tx_clone.blocking_send(Message::RecordsChanged { paths });
                }
                Err(errors) => {
                    for error in errors {
                        warn!("Record watcher error: {:?}", error);
                        let _ = tx_clone.blocking_send(Message::WatcherError {
                            message: error.to_string(),
                        });
                    }
                }
            }
        });

        let mut debouncer = match debouncer_result {
            Ok(d) => d,
            Err(e) => {
                error!("Failed to create record watcher: {}", e);
                let _ = message_tx.blocking_send(Message::WatcherError {
                    message: format!("Failed to create watcher: {}", e),
                });
                return;
            }
        };

        if let Err(e) = debouncer.watch(&dir, RecursiveMode::NonRecursive) {
            warn!("Failed to watch {}: {}", dir.display(), e);
            let _ = message_tx.blocking_send(Message::WatcherError {
                message: e.to_string(),
            });
            return;
        }
        info!("Watching: {}", dir.display());

        loop {
            match stop_rx.try_recv() {
                Ok(()) | Err(tokio::sync::oneshot::error::TryRecvError::Closed) => {
                    info!("Record watcher stopping");
                    break;
                }
                Err(tokio::sync::oneshot::error::TryRecvError::Empty) => {
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    }
}

impl Drop for RecordWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
