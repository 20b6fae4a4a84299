//! Stack trace parsing for captured UI-thread stacks.
//!
//! A block record carries one or more thread-stack entries. Each entry starts
//! with the capture timestamp followed by JVM-style frames:
//!
//! ```text
//! 06-12 10:00:00.500
//! com.example.feed.FeedAdapter.bind(FeedAdapter.java:88)
//! android.os.Looper.loop(Looper.java:193)
//! ```
//!
//! This module turns those entries into frames and derives the concern-stack
//! summary used for listing and filtering.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

// ─────────────────────────────────────────────────────────────────────────────
// Regex Patterns
// ─────────────────────────────────────────────────────────────────────────────

/// Matches a JVM frame: `com.example.Foo.bar(Foo.java:12)`, optionally prefixed by `at `.
/// Captures: 1=declaring class, 2=method, 3=location
pub static JVM_FRAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:at\s+)?([\w$]+(?:\.[\w$]+)*)\.([\w$<>\-]+)\(([^()]*)\)$")
        .expect("Invalid JVM_FRAME_REGEX")
});

/// Matches the line number part of a location: `Foo.java:12`
/// Captures: 1=file, 2=line
static LOCATION_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+):(\d+)$").expect("Invalid LOCATION_LINE_REGEX"));

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A single frame of a captured stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame {
    /// Fully qualified declaring class (e.g., "com.example.feed.FeedAdapter")
    pub class_name: String,

    /// Method name (e.g., "bind", "<init>")
    pub method: String,

    /// Text between the parentheses (e.g., "FeedAdapter.java:88", "Native Method")
    pub location: String,

    /// Line number when the location carries one
    pub line: Option<u32>,
}

impl StackFrame {
    /// Parse a single frame line. Returns `None` for non-frame lines.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = JVM_FRAME_REGEX.captures(line.trim())?;
        let location = caps.get(3)?.as_str().to_string();
        let line = LOCATION_LINE_REGEX
            .captures(&location)
            .and_then(|c| c.get(2))
            .and_then(|m| m.as_str().parse().ok());

        Some(Self {
            class_name: caps.get(1)?.as_str().to_string(),
            method: caps.get(2)?.as_str().to_string(),
            location,
            line,
        })
    }

    /// `class.method`, the string concern packages are matched against.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.class_name, self.method)
    }

    /// True if the frame belongs to any of the given package prefixes.
    pub fn is_in_any(&self, packages: &[String]) -> bool {
        packages
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| self.class_name.starts_with(p.as_str()))
    }
}

/// One captured thread stack (timestamp line plus frames).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StackEntry {
    /// Raw entry text, lines joined with `\n`
    pub raw: String,

    /// Capture timestamp, when the first line is not a frame
    pub captured_at: Option<String>,

    /// Frames that matched the JVM frame format
    pub frames: Vec<StackFrame>,
}

impl StackEntry {
    /// Build an entry from its non-empty lines.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut entry = Self::default();
        let mut raw_lines = Vec::new();

        for line in lines {
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            raw_lines.push(line);

            match StackFrame::parse(line) {
                Some(frame) => entry.frames.push(frame),
                None if entry.frames.is_empty() && entry.captured_at.is_none() => {
                    entry.captured_at = Some(line.trim().to_string());
                }
                None => {}
            }
        }

        entry.raw = raw_lines.join("\n");
        entry
    }

    /// True if the raw text contains any of the patterns.
    pub fn contains_any(&self, patterns: &[String]) -> bool {
        patterns
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| self.raw.contains(p.as_str()))
    }
}

/// Split the stack section of a record into entries.
///
/// Blank lines separate entries; an entry with no text is dropped.
pub fn split_entries(stack_text: &str) -> Vec<StackEntry> {
    let mut entries = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in stack_text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                entries.push(StackEntry::from_lines(current.drain(..)));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        entries.push(StackEntry::from_lines(current));
    }

    entries
}

/// Derive the concern-stack summary for a set of entries.
///
/// Returns the location of the first frame (in entry order) inside any of
/// `packages`. With no packages configured the first frame of the first entry
/// that has frames is used instead. Returns an empty string when nothing
/// matches.
pub fn concern_summary(entries: &[StackEntry], packages: &[String]) -> String {
    let has_packages = packages.iter().any(|p| !p.is_empty());

    if !has_packages {
        return entries
            .iter()
            .find_map(|e| e.frames.first())
            .map(|f| f.location.clone())
            .unwrap_or_default();
    }

    entries
        .iter()
        .flat_map(|e| e.frames.iter())
        .find(|f| f.is_in_any(packages))
        .map(|f| f.location.clone())
        .unwrap_or_default()
}
