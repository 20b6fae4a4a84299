//! Policy filter - decides which valid records reach the visible list
//!
//! Two independent checks run in order:
//! 1. Whitelist: matching records are hidden, and their backing file is
//!    deleted when `delete_files_in_whitelist` is set.
//! 2. Concern stack: the summary is computed for every record; when
//!    `filter_non_concern_stack` is set an empty summary hides the record.
//!    Files are never deleted by this check.

use std::sync::Arc;

use blockscope_core::prelude::*;
use blockscope_core::{concern_summary, EpisodeRecord};

use crate::config::FilterSettings;
use crate::store::RecordStore;

/// Predicate marking a record as caused by something known/ignored.
pub trait RecordMatcher: Send + Sync {
    fn matches(&self, record: &EpisodeRecord) -> bool;
}

impl<F> RecordMatcher for F
where
    F: Fn(&EpisodeRecord) -> bool + Send + Sync,
{
    fn matches(&self, record: &EpisodeRecord) -> bool {
        self(record)
    }
}

/// Substring whitelist over the raw stack text.
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    patterns: Vec<String>,
}

impl Whitelist {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl RecordMatcher for Whitelist {
    fn matches(&self, record: &EpisodeRecord) -> bool {
        !self.patterns.is_empty()
            && record
                .stack_entries
                .iter()
                .any(|entry| entry.contains_any(&self.patterns))
    }
}

/// Outcome of evaluating one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Include,

    /// Hidden by the whitelist; `file_deleted` is true once the backing
    /// file is gone and the record must not be used any further.
    Whitelisted { file_deleted: bool },

    /// Hidden because the concern-stack summary is empty. File kept.
    NonConcern,
}

impl PolicyDecision {
    pub fn is_included(&self) -> bool {
        matches!(self, PolicyDecision::Include)
    }
}

/// Configured inclusion policy
#[derive(Clone)]
pub struct PolicyFilter {
    matcher: Arc<dyn RecordMatcher>,
    delete_files_in_whitelist: bool,
    filter_non_concern_stack: bool,
    concern_packages: Vec<String>,
}

impl std::fmt::Debug for PolicyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyFilter")
            .field("delete_files_in_whitelist", &self.delete_files_in_whitelist)
            .field("filter_non_concern_stack", &self.filter_non_concern_stack)
            .field("concern_packages", &self.concern_packages)
            .finish_non_exhaustive()
    }
}

impl Default for PolicyFilter {
    fn default() -> Self {
        Self::from_settings(&FilterSettings::default())
    }
}

impl PolicyFilter {
    pub fn from_settings(settings: &FilterSettings) -> Self {
        Self {
            matcher: Arc::new(Whitelist::new(settings.whitelist.iter().cloned())),
            delete_files_in_whitelist: settings.delete_files_in_whitelist,
            filter_non_concern_stack: settings.filter_non_concern_stack,
            concern_packages: settings.concern_packages.clone(),
        }
    }

    /// Replace the whitelist with a custom predicate.
    pub fn with_matcher(mut self, matcher: impl RecordMatcher + 'static) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    /// Packages the summary is computed against. Falls back to the
    /// record's process name when none are configured.
    fn packages_for(&self, record: &EpisodeRecord) -> Vec<String> {
        if !self.concern_packages.is_empty() {
            return self.concern_packages.clone();
        }
        record.context.process.iter().cloned().collect()
    }

    /// Compute and cache the concern-stack summary.
    pub fn summarize(&self, record: &mut EpisodeRecord) {
        let packages = self.packages_for(record);
        record.stack_summary = concern_summary(&record.stack_entries, &packages);
    }

    /// Run both checks against a valid record.
    ///
    /// The summary is cached on the record in every case except a deleted
    /// whitelisted file, which is never looked at again.
    pub fn evaluate(&self, record: &mut EpisodeRecord, store: &RecordStore) -> PolicyDecision {
        let mut decision = PolicyDecision::Include;

        if self.matcher.matches(record) {
            let mut file_deleted = false;
            if self.delete_files_in_whitelist {
                match store.delete(&record.backing_file.path) {
                    Ok(()) => file_deleted = true,
                    Err(e) => warn!("Whitelisted record kept on disk: {}", e),
                }
            }
            trace!(
                "Whitelisted {} (deleted: {})",
                record.backing_file.file_name(),
                file_deleted
            );
            if file_deleted {
                return PolicyDecision::Whitelisted { file_deleted };
            }
            decision = PolicyDecision::Whitelisted { file_deleted };
        }

        self.summarize(record);
        if decision.is_included()
            && self.filter_non_concern_stack
            && record.stack_summary.is_empty()
        {
            trace!("No concern stack in {}", record.backing_file.file_name());
            decision = PolicyDecision::NonConcern;
        }

        decision
    }

    /// Keep the records that pass the policy and are still on disk.
    pub fn apply(&self, records: Vec<EpisodeRecord>, store: &RecordStore) -> Vec<EpisodeRecord> {
        let total = records.len();
        let mut visible = Vec::with_capacity(total);

        for mut record in records {
            if !self.evaluate(&mut record, store).is_included() {
                continue;
            }
            if !record.backing_file.exists() {
                debug!(
                    "{} vanished during the scan, skipping",
                    record.backing_file.path.display()
                );
                continue;
            }
            visible.push(record);
        }

        debug!("Policy kept {} of {} record(s)", visible.len(), total);
        visible
    }
}
