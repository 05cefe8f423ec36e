use crate::aggregate::aggregate_file;
use crate::cli::{CommonArgs, ReportArgs};
use crate::config::ReportConfig;
use crate::model::{RankedEntry, ReportOutput, SCHEMA_VERSION};
use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Write;

pub fn exec(common: &CommonArgs, args: &ReportArgs) -> Result<()> {
    let config = ReportConfig {
        log_path: common.log_path(),
        lookback_days: args.days,
        include_deletions: args.all,
        limit: args.limit,
    };
    let lower_bound = config.lower_bound(Utc::now().timestamp());

    let aggregation = aggregate_file(&config.log_path, lower_bound, config.include_deletions)
        .with_context(|| format!("Failed to read log store {}", config.log_path.display()))?;
    if aggregation.skipped_lines > 0 {
        tracing::warn!("Skipped {} malformed log lines", aggregation.skipped_lines);
    }

    let mut entries = aggregation.ranked();
    if let Some(limit) = config.limit {
        entries.truncate(limit);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        write_json(&mut out, &entries, &config, lower_bound)
    } else if args.ndjson {
        write_ndjson(&mut out, &entries)
    } else {
        write_table(&mut out, &entries)
    }
}

pub fn write_table<W: Write>(out: &mut W, entries: &[RankedEntry]) -> Result<()> {
    if entries.is_empty() {
        tracing::warn!("No churn recorded");
        return Ok(());
    }
    for entry in entries {
        writeln!(out, "{:>20} | {}", entry.key, entry.total)?;
    }
    Ok(())
}

pub fn write_json<W: Write>(
    out: &mut W,
    entries: &[RankedEntry],
    config: &ReportConfig,
    lower_bound: i64,
) -> Result<()> {
    let output = ReportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        log_path: config.log_path.to_string_lossy().to_string(),
        lower_bound,
        include_deletions: config.include_deletions,
        entries: entries.to_vec(),
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

pub fn write_ndjson<W: Write>(out: &mut W, entries: &[RankedEntry]) -> Result<()> {
    for entry in entries {
        writeln!(out, "{}", serde_json::to_string(entry)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<RankedEntry> {
        vec![
            RankedEntry { key: "go".to_string(), total: 14 },
            RankedEntry { key: "-no-extension".to_string(), total: 3 },
        ]
    }

    #[test]
    fn table_right_aligns_keys() {
        let mut out = Vec::new();
        write_table(&mut out, &entries()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "                  go | 14\n       -no-extension | 3\n"
        );
    }

    #[test]
    fn empty_table_prints_nothing() {
        let mut out = Vec::new();
        write_table(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn ndjson_has_one_entry_per_line() {
        let mut out = Vec::new();
        write_ndjson(&mut out, &entries()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec![r#"{"key":"go","total":14}"#, r#"{"key":"-no-extension","total":3}"#]);
    }

    #[test]
    fn json_document_carries_window() {
        let mut out = Vec::new();
        let mut config = ReportConfig::new("/tmp/log.csv");
        config.include_deletions = true;
        write_json(&mut out, &entries(), &config, 42).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["lower_bound"], 42);
        assert_eq!(v["include_deletions"], true);
        assert_eq!(v["entries"][0]["key"], "go");
    }
}
