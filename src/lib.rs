//! blockscope Library
//!
//! Command-line frontends over the record pipeline in `blockscope-app`:
//! one-shot list commands and a headless NDJSON watch mode.

// Module declarations
pub mod cli;
pub mod headless;
pub mod pipeline;

// Re-export main entry points
pub use headless::runner::run_headless;
pub use pipeline::Pipeline;
