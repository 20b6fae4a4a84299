//! blockscope-app - Record loading and list orchestration for blockscope
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the record
//! list: the record store, the inclusion policy, the single-worker loader with
//! its in-flight registry, list sessions, configuration loading, sharing and
//! directory watching, tied together by the [`Engine`].

pub mod actions;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod loader;
pub mod message;
pub mod policy;
pub mod process;
pub mod registry;
pub mod session;
pub mod share;
pub mod state;
pub mod store;
pub mod watcher;

// Re-export primary types
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use loader::{run_scan, Loader, ScanJob, WorkerJob};
pub use message::{ListCommand, Message};
pub use policy::{PolicyDecision, PolicyFilter, RecordMatcher, Whitelist};
pub use registry::{InFlightRegistry, ScanId};
pub use session::{ListSession, ListView, SessionId};
pub use share::{ExportShareTarget, ShareTarget};
pub use state::AppState;
pub use store::RecordStore;
