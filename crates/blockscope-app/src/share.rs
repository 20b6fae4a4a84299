//! Share collaborator - hands a record's text or file to the outside world
//!
//! The pipeline only guarantees that a shared file is readable before it is
//! handed off. Where it goes is up to the [`ShareTarget`].

use std::path::{Path, PathBuf};

use blockscope_core::prelude::*;
use blockscope_core::EpisodeRecord;

/// Destination for shared records
#[cfg_attr(test, mockall::automock)]
pub trait ShareTarget: Send + Sync {
    /// Share a plain-text summary. Returns a description of where it went.
    fn share_text(&self, name: &str, text: &str) -> Result<String>;

    /// Share a file. Returns a description of where it went.
    fn share_file(&self, path: &Path) -> Result<String>;
}

/// Make `path` readable by everyone before it leaves the process.
pub fn prepare_for_share(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| Error::share(format!("{}: {}", path.display(), e)))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = metadata.permissions();
        let mode = permissions.mode();
        if mode & 0o444 != 0o444 {
            permissions.set_mode(mode | 0o444);
            std::fs::set_permissions(path, permissions)
                .map_err(|e| Error::share(format!("{}: {}", path.display(), e)))?;
        }
    }
    #[cfg(not(unix))]
    let _ = metadata;

    Ok(())
}

/// Share one record, as text or as its backing file.
pub fn share_record(
    target: &dyn ShareTarget,
    record: &EpisodeRecord,
    stack_dump: bool,
) -> Result<String> {
    if stack_dump {
        let path = &record.backing_file.path;
        prepare_for_share(path)?;
        target.share_file(path)
    } else {
        target.share_text(&share_name(record), &record.share_text())
    }
}

fn share_name(record: &EpisodeRecord) -> String {
    let stem = record
        .backing_file
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.is_empty() {
        record
            .start_time
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    } else {
        stem
    }
}

/// Where exported shares go when no directory is given
pub fn default_share_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("blockscope")
        .join("shared")
}

/// Writes shared text and copies shared files into a directory
#[derive(Debug, Clone)]
pub struct ExportShareTarget {
    out_dir: PathBuf,
}

impl ExportShareTarget {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.out_dir)
            .map_err(|e| Error::share(format!("{}: {}", self.out_dir.display(), e)))
    }
}

impl ShareTarget for ExportShareTarget {
    fn share_text(&self, name: &str, text: &str) -> Result<String> {
        self.ensure_dir()?;
        let dest = self.out_dir.join(format!("{name}.txt"));
        std::fs::write(&dest, text)
            .map_err(|e| Error::share(format!("{}: {}", dest.display(), e)))?;
        info!("Shared record text to {}", dest.display());
        Ok(dest.display().to_string())
    }

    fn share_file(&self, path: &Path) -> Result<String> {
        self.ensure_dir()?;
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::share(format!("not a file: {}", path.display())))?;
        let dest = self.out_dir.join(file_name);
        std::fs::copy(path, &dest)
            .map_err(|e| Error::share(format!("{}: {}", dest.display(), e)))?;
        info!("Shared record file to {}", dest.display());
        Ok(dest.display().to_string())
    }
}
