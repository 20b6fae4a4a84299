//! Error types for the record pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading, filtering and presenting block records
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Record Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed block record {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid block record {path}: {reason}")]
    Validation { path: PathBuf, reason: String },

    #[error("Record directory unavailable: {path}")]
    DirectoryUnavailable { path: PathBuf },

    #[error("Failed to delete {path}: {reason}")]
    DeleteFailed { path: PathBuf, reason: String },

    #[error("No block record with start time: {start_time}")]
    RecordNotFound { start_time: String },

    // ─────────────────────────────────────────────────────────────
    // Consumer Errors
    // ─────────────────────────────────────────────────────────────
    #[error("List consumer is gone, result dropped")]
    StaleConsumer,

    #[error("Share failed: {message}")]
    Share { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel send error: {message}")]
    ChannelSend { message: String },

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn validation(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn directory_unavailable(path: impl Into<PathBuf>) -> Self {
        Self::DirectoryUnavailable { path: path.into() }
    }

    pub fn delete_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DeleteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn record_not_found(start_time: impl Into<String>) -> Self {
        Self::RecordNotFound {
            start_time: start_time.into(),
        }
    }

    pub fn share(message: impl Into<String>) -> Self {
        Self::Share {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn channel_send(message: impl Into<String>) -> Self {
        Self::ChannelSend {
            message: message.into(),
        }
    }

    /// True for errors the record file itself is to blame for.
    ///
    /// The store deletes the backing file for these.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::Parse { .. } | Error::Validation { .. })
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. }
                | Error::Validation { .. }
                | Error::DirectoryUnavailable { .. }
                | Error::DeleteFailed { .. }
                | Error::StaleConsumer
                | Error::RecordNotFound { .. }
                | Error::Share { .. }
                | Error::ChannelSend { .. }
        )
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config { .. } | Error::ChannelClosed)
    }
}
