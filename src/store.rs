//! Append-only, line-oriented log of per-commit churn.
//!
//! Each line holds seven comma-separated fields:
//! `commit_id,repository_path,branch,unix_ts,display_ts,email,churn_json`.
//! Fields are not escaped; only the trailing JSON object may contain commas.

use crate::error::{ChurnError, Result};
use crate::model::{ChurnMap, LogRecord};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

const FIELD_COUNT: usize = 7;

/// Receives records produced by the commit walker.
pub trait RecordSink {
    fn emit(&mut self, record: LogRecord) -> Result<()>;
}

impl RecordSink for Vec<LogRecord> {
    fn emit(&mut self, record: LogRecord) -> Result<()> {
        self.push(record);
        Ok(())
    }
}

pub fn format_record(record: &LogRecord) -> Result<String> {
    let churn = serde_json::to_string(&record.churn)?;
    Ok(format!(
        "{},{},{},{},{},{},{}",
        record.commit_id,
        record.repository_path,
        record.branch,
        record.timestamp,
        record.display_time,
        record.author_email,
        churn
    ))
}

/// Parses one log line. `line_no` is 1-based and only used for error reporting.
pub fn parse_record(line: &str, line_no: usize) -> Result<LogRecord> {
    let malformed = |reason: String| ChurnError::RecordParse { line: line_no, reason };

    let fields: Vec<&str> = line.splitn(FIELD_COUNT, ',').collect();
    if fields.len() < FIELD_COUNT {
        return Err(malformed(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    let timestamp = fields[3]
        .trim()
        .parse::<i64>()
        .map_err(|e| malformed(format!("bad timestamp '{}': {e}", fields[3])))?;
    let churn: ChurnMap = serde_json::from_str(fields[6].trim_end())
        .map_err(|e| malformed(format!("bad churn map: {e}")))?;

    Ok(LogRecord {
        commit_id: fields[0].to_string(),
        repository_path: fields[1].to_string(),
        branch: fields[2].to_string(),
        timestamp,
        display_time: fields[4].to_string(),
        author_email: fields[5].to_string(),
        churn,
    })
}

/// Single buffered writer over the log file, flushed once by [`LogWriter::finish`].
pub struct LogWriter {
    out: BufWriter<File>,
    path: PathBuf,
    written: usize,
}

impl LogWriter {
    /// Truncates or creates the log file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ChurnError::OutputIo {
                path: path.clone(),
                source,
            })?;
        }
        let file = File::create(&path).map_err(|source| ChurnError::OutputIo {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            out: BufWriter::new(file),
            path,
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> Result<usize> {
        self.out.flush().map_err(|source| ChurnError::OutputIo {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.written)
    }
}

impl RecordSink for LogWriter {
    fn emit(&mut self, record: LogRecord) -> Result<()> {
        let line = format_record(&record)?;
        writeln!(self.out, "{line}").map_err(|source| ChurnError::OutputIo {
            path: self.path.clone(),
            source,
        })?;
        self.written += 1;
        Ok(())
    }
}

/// Streams records back out of a log, one line at a time.
///
/// Yields `Err(RecordParse)` for malformed lines and keeps going; I/O errors
/// end the iteration after being reported once.
pub struct LogReader<R> {
    input: R,
    buf: Vec<u8>,
    line_no: usize,
    done: bool,
}

impl LogReader<std::io::BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(std::io::BufReader::new(file)))
    }
}

impl<R: BufRead> LogReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            buf: Vec::new(),
            line_no: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for LogReader<R> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            self.buf.clear();
            match self.input.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
            self.line_no += 1;

            let line = match std::str::from_utf8(&self.buf) {
                Ok(text) => text.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    return Some(Err(ChurnError::RecordParse {
                        line: self.line_no,
                        reason: format!("invalid utf-8: {e}"),
                    }))
                }
            };
            if line.is_empty() {
                continue;
            }
            return Some(parse_record(line, self.line_no));
        }
    }
}
