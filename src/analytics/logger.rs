use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::fetcher::CycleReport;

/// Size at which the tick log is cut back to its most recent entries.
const MAX_LOG_BYTES: u64 = 1024 * 1024;
/// Entries kept when the log is cut back.
const KEEP_ENTRIES: usize = 2_000;

// ---------------------------------------------------------------------------
// Tick log entry (JSONL)
// ---------------------------------------------------------------------------

/// A single entry in the tick log (`~/.guildwatch/tick-log.jsonl`).
///
/// One entry is appended per fetch cycle, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLogEntry {
    pub timestamp: String,
    pub duration_ms: u64,
    /// Size of the new user snapshot, if one was received.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub users: Option<usize>,
    /// Size of the new guild snapshot, if one was received.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub guilds: Option<usize>,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl TickLogEntry {
    pub fn from_report(report: &CycleReport, duration_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            duration_ms,
            users: report.users.as_ref().map(Vec::len),
            guilds: report.guilds.as_ref().map(Vec::len),
            connected: report.connected,
            error: report.error.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Record a finished cycle. Best-effort: I/O errors are ignored.
pub fn log_tick(report: &CycleReport, duration_ms: u64) {
    let Some(path) = tick_log_path() else {
        return;
    };
    let _ = append_entry(&path, &TickLogEntry::from_report(report, duration_ms));
    let _ = trim_log(&path, MAX_LOG_BYTES, KEEP_ENTRIES);
}

// ---------------------------------------------------------------------------
// Reading log entries
// ---------------------------------------------------------------------------

/// Read the last `limit` entries from the tick log, oldest first.
///
/// Returns an empty vec if the log does not exist.
pub fn read_recent_entries(limit: usize) -> Vec<TickLogEntry> {
    tick_log_path()
        .map(|path| read_entries(&path, limit))
        .unwrap_or_default()
}

/// Read the last `limit` entries of a JSONL file, skipping malformed lines.
pub fn read_entries(path: &Path, limit: usize) -> Vec<TickLogEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    let mut entries: Vec<TickLogEntry> = BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| serde_json::from_str(&line).ok())
        .collect();

    let excess = entries.len().saturating_sub(limit);
    entries.drain(..excess);
    entries
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

pub fn append_entry(path: &Path, entry: &TickLogEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Rewrite the log with only its last `keep` entries once it exceeds
/// `max_bytes`. Returns whether the file was rewritten.
pub fn trim_log(path: &Path, max_bytes: u64, keep: usize) -> Result<bool> {
    let Ok(meta) = fs::metadata(path) else {
        return Ok(false);
    };
    if meta.len() <= max_bytes {
        return Ok(false);
    }

    let mut lines = String::new();
    for entry in read_entries(path, keep) {
        lines.push_str(&serde_json::to_string(&entry)?);
        lines.push('\n');
    }

    let tmp = path.with_extension("jsonl.tmp");
    fs::write(&tmp, lines)?;
    fs::rename(&tmp, path)?;
    Ok(true)
}

/// Return the path to the tick log file.
pub fn tick_log_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("tick-log.jsonl"))
}
