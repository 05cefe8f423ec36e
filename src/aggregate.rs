use crate::error::{ChurnError, Result};
use crate::model::{ChurnMap, RankedEntry};
use crate::store::LogReader;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use tracing::warn;

/// Summed churn of a log store after windowing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub totals: BTreeMap<String, i64>,
    /// Records at or after the lower bound.
    pub records: usize,
    pub skipped_lines: usize,
}

impl Aggregation {
    /// Totals by value, largest first. Equal totals keep ascending key order.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        rank(&self.totals)
    }
}

pub fn rank(totals: &BTreeMap<String, i64>) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = totals
        .iter()
        .map(|(key, total)| RankedEntry {
            key: key.clone(),
            total: *total,
        })
        .collect();
    entries.sort_by(|a, b| b.total.cmp(&a.total));
    entries
}

/// Folds one commit's churn into the running totals.
///
/// Without deletions only `+` keys count and are keyed by the bare extension.
/// With deletions every key counts under its signed form, so `+go` and `-go`
/// stay separate buckets.
pub fn fold_churn(totals: &mut BTreeMap<String, i64>, churn: &ChurnMap, include_deletions: bool) {
    for (key, value) in churn {
        if include_deletions {
            *totals.entry(key.clone()).or_insert(0) += value;
        } else if let Some(ext) = key.strip_prefix('+') {
            *totals.entry(ext.to_string()).or_insert(0) += value;
        }
    }
}

pub fn aggregate_file<P: AsRef<Path>>(
    path: P,
    lower_bound: i64,
    include_deletions: bool,
) -> Result<Aggregation> {
    let reader = LogReader::open(path)?;
    aggregate_records(reader, lower_bound, include_deletions)
}

pub fn aggregate<R: BufRead>(input: R, lower_bound: i64, include_deletions: bool) -> Result<Aggregation> {
    aggregate_records(LogReader::new(input), lower_bound, include_deletions)
}

fn aggregate_records<R: BufRead>(
    reader: LogReader<R>,
    lower_bound: i64,
    include_deletions: bool,
) -> Result<Aggregation> {
    let mut agg = Aggregation::default();
    for record in reader {
        let record = match record {
            Ok(r) => r,
            Err(e @ ChurnError::RecordParse { .. }) => {
                warn!("{e}");
                agg.skipped_lines += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        if record.timestamp < lower_bound {
            continue;
        }
        agg.records += 1;
        fold_churn(&mut agg.totals, &record.churn, include_deletions);
    }
    Ok(agg)
}
