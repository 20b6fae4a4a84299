//! Engine - shared orchestration core for every frontend
//!
//! Owns the application state, the message channel, the loader worker, the
//! share target and the optional record watcher. Frontends feed it messages
//! and subscribe to [`EngineEvent`]s.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use blockscope_core::prelude::*;

use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::loader::Loader;
use crate::message::Message;
use crate::policy::PolicyFilter;
use crate::process;
use crate::session::ListSession;
use crate::share::{default_share_dir, ExportShareTarget, ShareTarget};
use crate::state::AppState;
use crate::watcher::RecordWatcher;

pub struct Engine {
    /// TEA application state (the Model)
    pub state: AppState,

    /// Sender half of the message channel.
    /// Clone this to give to input sources (watcher, background tasks).
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the message channel.
    pub msg_rx: mpsc::Receiver<Message>,

    /// The single background worker all scans run on
    loader: Loader,

    share_target: Arc<dyn ShareTarget>,

    /// Record directory watcher. None until started or if it failed.
    watcher: Option<RecordWatcher>,

    /// Event broadcaster for external consumers.
    event_tx: broadcast::Sender<EngineEvent>,
}

impl Engine {
    /// Create an engine for a record directory.
    ///
    /// Spawns the loader worker, so this must run inside a tokio runtime.
    pub fn new(settings: Settings, record_dir: impl Into<PathBuf>) -> Self {
        let state = AppState::new(settings, record_dir);
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);
        let loader = Loader::spawn(msg_tx.clone());
        let (event_tx, _) = broadcast::channel(256);

        info!("Engine ready for {}", state.store.dir().display());

        Self {
            state,
            msg_tx,
            msg_rx,
            loader,
            share_target: Arc::new(ExportShareTarget::new(default_share_dir())),
            watcher: None,
            event_tx,
        }
    }

    pub fn with_share_target(mut self, target: Arc<dyn ShareTarget>) -> Self {
        self.share_target = target;
        self
    }

    pub fn with_policy(mut self, policy: PolicyFilter) -> Self {
        self.state = self.state.with_policy(policy);
        self
    }

    /// Subscribe to engine events.
    ///
    /// If the subscriber falls behind, older events are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Process a single message through the TEA update cycle, then emit the
    /// events it produced.
    pub fn process_message(&mut self, msg: Message) {
        process::process_message(
            &mut self.state,
            msg,
            &self.msg_tx,
            &self.loader,
            &self.share_target,
        );

        for event in self.state.take_events() {
            trace!("Engine event: {}", event.event_type());
            self.emit(event);
        }
    }

    /// Drain and process all pending messages from the channel.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Wait for the next message and process it.
    ///
    /// Returns false once the channel is closed.
    pub async fn process_next(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.process_message(msg);
                true
            }
            None => false,
        }
    }

    /// Start the record watcher if enabled in settings.
    pub fn start_watcher(&mut self) {
        if !self.state.settings.watcher.enabled {
            debug!("Record watcher disabled");
            return;
        }

        let mut watcher = RecordWatcher::new(self.state.store.dir(), &self.state.settings.watcher);
        match watcher.start(self.msg_tx.clone()) {
            Ok(()) => self.watcher = Some(watcher),
            Err(e) => warn!("Failed to start record watcher: {}", e),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.state.quitting
    }

    pub fn session(&self) -> Option<&Arc<ListSession>> {
        self.state.session.as_ref()
    }

    /// Stop the watcher and let queued worker jobs finish.
    pub async fn shutdown(&mut self) {
        self.emit(EngineEvent::Shutdown);

        if let Some(ref mut watcher) = self.watcher {
            watcher.stop();
        }

        self.loader.shutdown().await;
        info!("Engine shut down");
    }

    /// send() returns Err only if there are no receivers, which is fine.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
