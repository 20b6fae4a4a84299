//! Pipeline - drives an [`Engine`] to completion for one-shot commands
//!
//! The CLI commands open a session, wait for its first list, issue at most
//! one command and wait for the event that settles it.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError};

use blockscope_app::config::Settings;
use blockscope_app::{Engine, EngineEvent, ListSession, Message, PolicyFilter, ShareTarget};
use blockscope_core::prelude::*;
use blockscope_core::EpisodeRecord;

pub struct Pipeline {
    engine: Engine,
    events: broadcast::Receiver<EngineEvent>,
}

impl Pipeline {
    /// Must be called inside a tokio runtime.
    pub fn new(settings: Settings, record_dir: impl Into<PathBuf>) -> Self {
        let engine = Engine::new(settings, record_dir);
        let events = engine.subscribe();
        Self { engine, events }
    }

    pub fn with_share_target(mut self, target: Arc<dyn ShareTarget>) -> Self {
        self.engine = self.engine.with_share_target(target);
        self
    }

    pub fn with_policy(mut self, policy: PolicyFilter) -> Self {
        self.engine = self.engine.with_policy(policy);
        self
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn session(&self) -> Option<&Arc<ListSession>> {
        self.engine.session()
    }

    /// Open a list session and wait for its first delivery.
    pub async fn open(&mut self) -> Result<Vec<EpisodeRecord>> {
        self.engine.process_message(Message::OpenSession);
        self.wait_for_list().await
    }

    /// Wait for the next `ListUpdated` event and return its records.
    pub async fn wait_for_list(&mut self) -> Result<Vec<EpisodeRecord>> {
        match self
            .wait_for(|e| matches!(e, EngineEvent::ListUpdated { .. }))
            .await?
        {
            EngineEvent::ListUpdated { records, .. } => Ok(records),
            _ => Err(Error::ChannelClosed),
        }
    }

    /// Process a message and everything it causes.
    pub fn send(&mut self, msg: Message) {
        self.engine.process_message(msg);
    }

    /// Process messages until an event matching `pred` is broadcast.
    pub async fn wait_for<F>(&mut self, pred: F) -> Result<EngineEvent>
    where
        F: Fn(&EngineEvent) -> bool,
    {
        loop {
            loop {
                match self.events.try_recv() {
                    Ok(event) if pred(&event) => return Ok(event),
                    Ok(_) => {}
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!("Pipeline missed {} engine event(s)", skipped);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Closed) => return Err(Error::ChannelClosed),
                }
            }

            if !self.engine.process_next().await {
                return Err(Error::ChannelClosed);
            }
        }
    }

    /// Look up a listed record by start time.
    pub fn find(&self, start_time: &str) -> Result<EpisodeRecord> {
        self.engine.state.find_record(start_time)
    }

    /// Shut the engine down, letting queued worker jobs finish.
    pub async fn finish(mut self) {
        self.engine.shutdown().await;
    }
}
