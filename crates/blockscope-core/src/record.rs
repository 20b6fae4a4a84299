//! Block episode records and the on-disk record format.
//!
//! One file holds one episode. The detection engine writes `key = value`
//! header lines followed by a `stack =` section:
//!
//! ```text
//! model = Pixel 6
//! process = com.example
//! time = 1200
//! thread-time = 900
//! time-start = 06-12 10:00:00.123
//! time-end = 06-12 10:00:01.323
//! stack =
//! 06-12 10:00:00.500
//! com.example.feed.FeedAdapter.bind(FeedAdapter.java:88)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::stack_trace::{split_entries, StackEntry};

/// Separator between a key and its value
pub const KV_SEPARATOR: &str = " = ";

// Record keys
pub const KEY_QUA: &str = "qua";
pub const KEY_MODEL: &str = "model";
pub const KEY_API_LEVEL: &str = "api-level";
pub const KEY_IMEI: &str = "imei";
pub const KEY_UID: &str = "uid";
pub const KEY_CPU_CORE: &str = "cpu-core";
pub const KEY_CPU_BUSY: &str = "cpu-busy";
pub const KEY_CPU_RATE: &str = "cpu-rate";
pub const KEY_TIME_COST: &str = "time";
pub const KEY_THREAD_TIME_COST: &str = "thread-time";
pub const KEY_TIME_START: &str = "time-start";
pub const KEY_TIME_END: &str = "time-end";
pub const KEY_STACK: &str = "stack";
pub const KEY_PROCESS: &str = "process";
pub const KEY_VERSION_NAME: &str = "versionName";
pub const KEY_VERSION_CODE: &str = "versionCode";
pub const KEY_NETWORK: &str = "network";
pub const KEY_TOTAL_MEMORY: &str = "totalMemory";
pub const KEY_FREE_MEMORY: &str = "freeMemory";

/// The persisted file behind a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackingFile {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

impl BackingFile {
    pub fn new(path: impl Into<PathBuf>, modified: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            modified,
        }
    }

    /// Read the last-modified time of `path` from the filesystem.
    pub fn from_path(path: &Path) -> Result<Self> {
        let modified: SystemTime = std::fs::metadata(path)?.modified()?;
        Ok(Self::new(path, DateTime::<Utc>::from(modified)))
    }

    /// File name, used as the handle between list and detail views.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// True while the file is still on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Device and application context written alongside an episode.
///
/// All fields are informational; none take part in validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceContext {
    pub qua: Option<String>,
    pub model: Option<String>,
    pub api_level: Option<String>,
    pub imei: Option<String>,
    pub uid: Option<String>,
    pub cpu_core: Option<u32>,
    pub cpu_busy: Option<bool>,
    pub cpu_rate: Option<String>,
    pub process: Option<String>,
    pub version_name: Option<String>,
    pub version_code: Option<String>,
    pub network: Option<String>,
    pub total_memory: Option<String>,
    pub free_memory: Option<String>,
}

/// One parsed block episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeRecord {
    /// Start timestamp as written by the detector; unique per episode
    pub start_time: String,

    pub end_time: Option<String>,

    /// Wall-clock cost of the block
    pub duration_ms: i64,

    /// CPU time the UI thread spent during the block
    pub thread_time_ms: Option<i64>,

    pub context: DeviceContext,

    pub stack_entries: Vec<StackEntry>,

    pub backing_file: BackingFile,

    /// Concern-stack summary; empty until the policy filter computes it
    pub stack_summary: String,
}

impl EpisodeRecord {
    /// Read and parse a record file, then validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let backing_file = BackingFile::from_path(path)?;
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8(bytes)
            .map_err(|_| Error::parse(path, "record is not valid UTF-8"))?;

        let record = Self::parse(&content, backing_file)?;
        record.validate()?;
        Ok(record)
    }

    /// Parse record content. Does not validate.
    pub fn parse(content: &str, backing_file: BackingFile) -> Result<Self> {
        let path = backing_file.path.clone();
        let mut start_time = None;
        let mut end_time = None;
        let mut duration_ms = None;
        let mut thread_time_ms = None;
        let mut context = DeviceContext::default();
        let mut stack_entries = Vec::new();

        let mut lines = content.lines();
        while let Some(line) = lines.next() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = split_key_value(line);

            if key == KEY_STACK {
                let mut stack_text: Vec<&str> = Vec::new();
                if !value.is_empty() {
                    stack_text.push(value);
                }
                stack_text.extend(lines.by_ref());
                stack_entries = split_entries(&stack_text.join("\n"));
                break;
            }

            let value = value.to_string();
            match key {
                KEY_TIME_START => start_time = Some(value),
                KEY_TIME_END => end_time = Some(value),
                KEY_TIME_COST => duration_ms = Some(parse_number(&path, key, &value)?),
                KEY_THREAD_TIME_COST => thread_time_ms = Some(parse_number(&path, key, &value)?),
                KEY_QUA => context.qua = Some(value),
                KEY_MODEL => context.model = Some(value),
                KEY_API_LEVEL => context.api_level = Some(value),
                KEY_IMEI => context.imei = Some(value),
                KEY_UID => context.uid = Some(value),
                KEY_CPU_CORE => {
                    context.cpu_core = Some(parse_number::<u32>(&path, key, &value)?);
                }
                KEY_CPU_BUSY => context.cpu_busy = value.parse().ok(),
                KEY_CPU_RATE => context.cpu_rate = Some(value),
                KEY_PROCESS => context.process = Some(value),
                KEY_VERSION_NAME => context.version_name = Some(value),
                KEY_VERSION_CODE => context.version_code = Some(value),
                KEY_NETWORK => context.network = Some(value),
                KEY_TOTAL_MEMORY => context.total_memory = Some(value),
                KEY_FREE_MEMORY => context.free_memory = Some(value),
                _ => {}
            }
        }

        let duration_ms =
            duration_ms.ok_or_else(|| Error::parse(&path, format!("missing '{KEY_TIME_COST}'")))?;

        Ok(Self {
            start_time: start_time.unwrap_or_default(),
            end_time,
            duration_ms,
            thread_time_ms,
            context,
            stack_entries,
            backing_file,
            stack_summary: String::new(),
        })
    }

    /// Semantic checks a parsed record must pass before it can be listed.
    pub fn validate(&self) -> Result<()> {
        let path = &self.backing_file.path;

        if self.start_time.trim().is_empty() {
            return Err(Error::validation(path, "missing start time"));
        }
        if self.duration_ms <= 0 {
            return Err(Error::validation(
                path,
                format!("non-positive duration {}ms", self.duration_ms),
            ));
        }
        if self.stack_entries.is_empty() {
            return Err(Error::validation(path, "missing stack"));
        }
        Ok(())
    }

    /// Textual summary handed to the share collaborator.
    pub fn share_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EpisodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = &self.context;
        let optional: [(&str, Option<String>); 14] = [
            (KEY_QUA, ctx.qua.clone()),
            (KEY_MODEL, ctx.model.clone()),
            (KEY_API_LEVEL, ctx.api_level.clone()),
            (KEY_IMEI, ctx.imei.clone()),
            (KEY_UID, ctx.uid.clone()),
            (KEY_CPU_CORE, ctx.cpu_core.map(|c| c.to_string())),
            (KEY_PROCESS, ctx.process.clone()),
            (KEY_VERSION_NAME, ctx.version_name.clone()),
            (KEY_VERSION_CODE, ctx.version_code.clone()),
            (KEY_NETWORK, ctx.network.clone()),
            (KEY_TOTAL_MEMORY, ctx.total_memory.clone()),
            (KEY_FREE_MEMORY, ctx.free_memory.clone()),
            (KEY_CPU_BUSY, ctx.cpu_busy.map(|b| b.to_string())),
            (KEY_CPU_RATE, ctx.cpu_rate.clone()),
        ];

        for (key, value) in optional {
            if let Some(value) = value {
                writeln!(f, "{key}{KV_SEPARATOR}{value}")?;
            }
        }

        writeln!(f, "{KEY_TIME_COST}{KV_SEPARATOR}{}", self.duration_ms)?;
        if let Some(thread_time) = self.thread_time_ms {
            writeln!(f, "{KEY_THREAD_TIME_COST}{KV_SEPARATOR}{thread_time}")?;
        }
        writeln!(f, "{KEY_TIME_START}{KV_SEPARATOR}{}", self.start_time)?;
        if let Some(end) = &self.end_time {
            writeln!(f, "{KEY_TIME_END}{KV_SEPARATOR}{end}")?;
        }

        writeln!(f, "{KEY_STACK} =")?;
        for (i, entry) in self.stack_entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", entry.raw)?;
        }
        Ok(())
    }
}

fn split_key_value(line: &str) -> (&str, &str) {
    match line.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (line, ""),
    }
}

fn parse_number<T: std::str::FromStr>(path: &Path, key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::parse(path, format!("'{key}' is not a number: {value:?}")))
}
