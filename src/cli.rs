//! One-shot CLI commands
//!
//! Each command runs the full pipeline once against the record directory and
//! writes human-readable output to the given writer.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use blockscope_app::config::{self, Settings};
use blockscope_app::{EngineEvent, ExportShareTarget, ListCommand, Message};
use blockscope_core::prelude::*;
use blockscope_core::SortKey;

use crate::pipeline::Pipeline;

/// Pick the record directory: explicit flag first, then config.
pub fn resolve_record_dir(flag: Option<PathBuf>, settings: &Settings) -> Result<PathBuf> {
    flag.or_else(|| settings.records.directory.clone())
        .ok_or_else(|| {
            Error::config("no record directory: pass --dir or set [records] directory")
        })
}

/// Print the visible list, one row per record.
pub async fn list(
    settings: Settings,
    dir: &Path,
    sort: Option<SortKey>,
    out: &mut impl Write,
) -> Result<usize> {
    let mut pipeline = Pipeline::new(settings, dir);
    pipeline.open().await?;

    if let Some(key) = sort {
        pipeline.send(Message::SetSort(key));
    }

    let count = match pipeline.session() {
        Some(session) => {
            let view = session.view();
            if view.display_state().is_empty() {
                writeln!(out, "No block records in {}", dir.display())?;
            }
            for (position, record) in view.records().iter().enumerate() {
                let title = view.row_title(position).unwrap_or_default();
                writeln!(out, "{:<24} {}", record.start_time, title)?;
            }
            view.len()
        }
        None => 0,
    };

    pipeline.finish().await;
    Ok(count)
}

/// Print one record in full.
pub async fn show(
    settings: Settings,
    dir: &Path,
    start_time: &str,
    out: &mut impl Write,
) -> Result<()> {
    let mut pipeline = Pipeline::new(settings, dir);
    pipeline.open().await?;
    let found = pipeline.find(start_time);
    pipeline.finish().await;

    let record = found?;
    writeln!(out, "{}", record.backing_file.path.display())?;
    write!(out, "{}", record.share_text())?;
    Ok(())
}

/// Delete one record file.
pub async fn remove(
    settings: Settings,
    dir: &Path,
    start_time: &str,
    out: &mut impl Write,
) -> Result<()> {
    let mut pipeline = Pipeline::new(settings, dir);
    pipeline.open().await?;

    pipeline.send(Message::Remove {
        start_time: start_time.to_string(),
    });
    let event = pipeline
        .wait_for(|e| {
            matches!(
                e,
                EngineEvent::RecordRemoved { .. } | EngineEvent::RecordNotFound { .. }
            )
        })
        .await;
    pipeline.finish().await;

    match event? {
        EngineEvent::RecordRemoved { record, .. } => {
            writeln!(out, "Removed {}", record.backing_file.path.display())?;
            Ok(())
        }
        _ => Err(Error::record_not_found(start_time)),
    }
}

/// Delete every record file.
pub async fn clear(settings: Settings, dir: &Path, out: &mut impl Write) -> Result<usize> {
    let mut pipeline = Pipeline::new(settings, dir);

    pipeline.send(Message::Command(ListCommand::DeleteAll));
    let event = pipeline
        .wait_for(|e| matches!(e, EngineEvent::ListCleared { .. }))
        .await;
    pipeline.finish().await;

    match event? {
        EngineEvent::ListCleared { deleted } => {
            writeln!(out, "Deleted {} record(s)", deleted)?;
            Ok(deleted)
        }
        _ => Err(Error::ChannelClosed),
    }
}

/// Export a record's text summary, or its file with `stack_dump`.
pub async fn share(
    settings: Settings,
    dir: &Path,
    start_time: &str,
    stack_dump: bool,
    out_dir: Option<PathBuf>,
    out: &mut impl Write,
) -> Result<String> {
    let mut pipeline = Pipeline::new(settings, dir);
    if let Some(out_dir) = out_dir {
        pipeline = pipeline.with_share_target(Arc::new(ExportShareTarget::new(out_dir)));
    }
    pipeline.open().await?;

    let start_time = start_time.to_string();
    let command = if stack_dump {
        ListCommand::ShareStackDump { start_time }
    } else {
        ListCommand::Share { start_time }
    };
    pipeline.send(Message::Command(command));

    let event = pipeline
        .wait_for(|e| {
            matches!(
                e,
                EngineEvent::Shared { .. }
                    | EngineEvent::ShareFailed { .. }
                    | EngineEvent::RecordNotFound { .. }
            )
        })
        .await;
    pipeline.finish().await;

    match event? {
        EngineEvent::Shared { destination, .. } => {
            writeln!(out, "Shared to {}", destination)?;
            Ok(destination)
        }
        EngineEvent::ShareFailed { reason, .. } => Err(Error::share(reason)),
        EngineEvent::RecordNotFound { start_time } => Err(Error::record_not_found(start_time)),
        _ => Err(Error::ChannelClosed),
    }
}

/// Write the default config file.
pub fn init_config(path: &Path, out: &mut impl Write) -> Result<PathBuf> {
    let written = config::init_config_file(path)?;
    writeln!(out, "Config: {}", written.display())?;
    Ok(written)
}
