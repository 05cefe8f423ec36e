use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: u32 = 1;

/// Sentinel extension for paths whose basename has no `.`.
pub const NO_EXTENSION: &str = "no-extension";

/// Signed extension key (`+go`, `-rs`) to line count, built fresh per commit.
pub type ChurnMap = BTreeMap<String, i64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Added,
    Removed,
}

impl Direction {
    pub fn sign(self) -> char {
        match self {
            Direction::Added => '+',
            Direction::Removed => '-',
        }
    }
}

pub fn signed_key(direction: Direction, extension: &str) -> String {
    format!("{}{}", direction.sign(), extension)
}

/// Adds every counter of `part` into `into`.
pub fn merge_churn(into: &mut ChurnMap, part: ChurnMap) {
    for (key, value) in part {
        *into.entry(key).or_insert(0) += value;
    }
}

/// One persisted line of the log store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub commit_id: String,
    pub repository_path: String,
    pub branch: String,
    pub timestamp: i64,
    pub display_time: String,
    pub author_email: String,
    pub churn: ChurnMap,
}

/// Renders an author timestamp in the local timezone.
pub fn display_time(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %z").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub log_path: String,
    pub lower_bound: i64,
    pub include_deletions: bool,
    pub entries: Vec<RankedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub repositories_found: usize,
    pub repositories_scanned: usize,
    pub repositories_skipped: usize,
    pub branches_walked: usize,
    pub records_written: usize,
}
