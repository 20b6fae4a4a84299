//! Configuration types

use std::path::PathBuf;

use blockscope_core::SortKey;
use serde::{Deserialize, Serialize};

/// Application settings (config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub records: RecordSettings,

    #[serde(default)]
    pub filter: FilterSettings,

    #[serde(default)]
    pub ui: UiSettings,

    #[serde(default)]
    pub watcher: WatcherSettings,
}

/// Where records live and how many the detector keeps
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordSettings {
    /// Directory the detection engine writes records into
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Cap the detector applies to stored records. Informational only:
    /// the list marks its first row when it holds exactly this many.
    #[serde(default = "default_max_stored_count")]
    pub max_stored_count: usize,
}

impl Default for RecordSettings {
    fn default() -> Self {
        Self {
            directory: None,
            max_stored_count: default_max_stored_count(),
        }
    }
}

/// Inclusion policy for listed records
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterSettings {
    /// Delete the backing file of whitelisted records while hiding them
    #[serde(default = "default_true")]
    pub delete_files_in_whitelist: bool,

    /// Hide records whose concern-stack summary is empty
    #[serde(default)]
    pub filter_non_concern_stack: bool,

    /// Substrings that mark a stack as caused by something known/ignored
    #[serde(default = "default_whitelist")]
    pub whitelist: Vec<String>,

    /// Package prefixes of interest for the concern-stack summary.
    /// Empty means "the recorded process name".
    #[serde(default)]
    pub concern_packages: Vec<String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            delete_files_in_whitelist: true,
            filter_non_concern_stack: false,
            whitelist: default_whitelist(),
            concern_packages: Vec::new(),
        }
    }
}

/// List presentation settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UiSettings {
    /// Ordering used for a fresh list
    #[serde(default)]
    pub default_sort: SortKey,
}

/// Record directory watcher settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatcherSettings {
    /// Rescan when files appear or change in the record directory
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Debounce duration in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_max_stored_count() -> usize {
    30
}

fn default_whitelist() -> Vec<String> {
    vec!["org.chromium".to_string()]
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}
