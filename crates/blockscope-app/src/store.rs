//! Record store - the directory of persisted block records
//!
//! Every regular file in the record directory is one episode. Files that
//! cannot be read, parsed or validated are deleted during a scan: the
//! directory is a cache of episodes, not an archive.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use blockscope_core::prelude::*;
use blockscope_core::EpisodeRecord;

/// Access to the record directory
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Regular files in the record directory, ordered by name.
    pub fn record_files(&self) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|_| Error::directory_unavailable(&self.dir))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .collect();
        files.sort();
        Ok(files)
    }

    /// Parse every record in the directory, deleting the ones that fail.
    ///
    /// An unlistable directory yields an empty list. Per-file failures are
    /// logged and never returned.
    pub fn list_valid_records(&self) -> Vec<EpisodeRecord> {
        let files = match self.record_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("{}", e);
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(files.len());
        for path in files {
            match EpisodeRecord::from_file(&path) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Could not read block record, deleting: {}", e);
                    if let Err(e) = self.delete(&path) {
                        error!("{}", e);
                    }
                }
            }
        }

        debug!(
            "Parsed {} valid record(s) from {}",
            records.len(),
            self.dir.display()
        );
        records
    }

    /// Delete one record file.
    ///
    /// A file that is already gone counts as deleted.
    pub fn delete(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                trace!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::delete_failed(path, e.to_string())),
        }
    }

    /// Delete every record file. Returns how many were removed.
    pub fn delete_all(&self) -> usize {
        let files = match self.record_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("{}", e);
                return 0;
            }
        };

        let mut deleted = 0;
        for path in files {
            match self.delete(&path) {
                Ok(()) => deleted += 1,
                Err(e) => error!("{}", e),
            }
        }
        info!("Deleted {} record(s) from {}", deleted, self.dir.display());
        deleted
    }
}
