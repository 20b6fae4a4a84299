//! # blockscope-core - Core Domain Types
//!
//! Foundation crate for blockscope. Provides the block record model, the
//! record file parser, stack trace handling, list ordering, error handling
//! and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Records (`record`)
//! - [`EpisodeRecord`] - One parsed block episode
//! - [`BackingFile`] - The persisted file behind a record
//! - [`DeviceContext`] - Device/app info written alongside an episode
//!
//! ### Stack Traces (`stack_trace`)
//! - [`StackEntry`], [`StackFrame`] - Captured thread stacks
//! - [`concern_summary()`] - Concern-stack summary for a record's stacks
//!
//! ### Ordering (`sort`)
//! - [`SortKey`] - Cost or recency ordering
//! - [`sort_records()`] - Stable in-place sort
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with `recoverable` vs `fatal` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! ```rust
//! use blockscope_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod record;
pub mod sort;
pub mod stack_trace;
pub mod types;

pub use error::{Error, Result};
pub use record::{BackingFile, DeviceContext, EpisodeRecord};
pub use sort::{sort_records, SortKey};
pub use stack_trace::{concern_summary, split_entries, StackEntry, StackFrame};
pub use types::ListDisplayState;
