use std::path::{Path, PathBuf};

const SECONDS_PER_DAY: i64 = 60 * 60 * 24;

/// Inputs of one scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub search_root: PathBuf,
    /// Only commits whose author email equals this are recorded.
    pub author_filter: Option<String>,
    pub output: PathBuf,
    /// With no `author_filter`, use each repository's own `user.email`
    /// and skip repositories that have none.
    pub resolve_author_from_repo_config: bool,
    pub deduplicate_by_commit_id: bool,
    pub progress: bool,
}

impl ScanConfig {
    pub fn new(search_root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            search_root: search_root.into(),
            author_filter: None,
            output: output.into(),
            resolve_author_from_repo_config: false,
            deduplicate_by_commit_id: false,
            progress: false,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author_filter = Some(author.into()).filter(|a: &String| !a.is_empty());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub log_path: PathBuf,
    /// Negative means the whole history.
    pub lookback_days: i64,
    pub include_deletions: bool,
    pub limit: Option<usize>,
}

impl ReportConfig {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            lookback_days: -1,
            include_deletions: false,
            limit: None,
        }
    }

    /// Inclusive lower timestamp bound relative to `now`, never below 0.
    pub fn lower_bound(&self, now: i64) -> i64 {
        if self.lookback_days < 0 {
            0
        } else {
            now.saturating_sub(self.lookback_days.saturating_mul(SECONDS_PER_DAY))
                .max(0)
        }
    }
}

/// Shells often require `@` to be written as `\@`.
pub fn unescape_email(raw: &str) -> String {
    raw.replace("\\@", "@")
}

/// `<home>/commit_history_<email>.csv`, falling back to the working directory
/// when no home directory can be found.
pub fn default_log_path(email: &str) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    log_path_in(&home, email)
}

pub fn log_path_in(dir: &Path, email: &str) -> PathBuf {
    dir.join(format!("commit_history_{email}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_lookback_starts_at_epoch() {
        let cfg = ReportConfig::new("log.csv");
        assert_eq!(cfg.lower_bound(1_000_000), 0);
    }

    #[test]
    fn lookback_counts_whole_days() {
        let mut cfg = ReportConfig::new("log.csv");
        cfg.lookback_days = 2;
        assert_eq!(cfg.lower_bound(1_000_000), 1_000_000 - 172_800);
        cfg.lookback_days = 0;
        assert_eq!(cfg.lower_bound(1_000_000), 1_000_000);
    }

    #[test]
    fn huge_lookback_clamps_to_epoch() {
        let mut cfg = ReportConfig::new("log.csv");
        cfg.lookback_days = i64::MAX / 1000;
        assert_eq!(cfg.lower_bound(1_700_000_000), 0);
        cfg.lookback_days = i64::MAX;
        assert_eq!(cfg.lower_bound(1_700_000_000), 0);
        cfg.lookback_days = 30_000;
        assert_eq!(cfg.lower_bound(1_700_000_000), 0);
    }

    #[test]
    fn email_unescaping_and_log_name() {
        assert_eq!(unescape_email("dev\\@example.com"), "dev@example.com");
        assert_eq!(
            log_path_in(Path::new("/home/dev"), "dev@example.com"),
            PathBuf::from("/home/dev/commit_history_dev@example.com.csv")
        );
        assert_eq!(
            log_path_in(Path::new("/home/dev"), ""),
            PathBuf::from("/home/dev/commit_history_.csv")
        );
    }

    #[test]
    fn empty_author_means_no_filter() {
        let cfg = ScanConfig::new(".", "out.csv").with_author("");
        assert!(cfg.author_filter.is_none());
        let cfg = ScanConfig::new(".", "out.csv").with_author("a@b.c");
        assert_eq!(cfg.author_filter.as_deref(), Some("a@b.c"));
    }
}
