//! Discovery feeds repository paths through a rendezvous channel to a single
//! scan worker that owns the log writer. Closing the channel ends the scan;
//! the worker answers on a separate one-shot channel once its output is flushed.

use crate::cli::{CommonArgs, ScanArgs};
use crate::config::ScanConfig;
use crate::discovery::discover;
use crate::error::{ChurnError, Result};
use crate::git::GitRepo;
use crate::model::ScanSummary;
use crate::store::LogWriter;
use crate::walker::CommitWalker;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Instant;
use tracing::{info, warn};

pub fn exec(common: &CommonArgs, args: &ScanArgs) -> anyhow::Result<()> {
    let root = std::fs::canonicalize(&args.path)
        .with_context(|| format!("Search path {} is not accessible", args.path.display()))?;

    let mut config = ScanConfig::new(root, common.log_path());
    config.author_filter = common.author();
    config.resolve_author_from_repo_config = args.resolve_author;
    config.deduplicate_by_commit_id = args.dedup;
    config.progress = !common.quiet && console::Term::stderr().is_term();

    let summary = run_scan(&config).context("Scan aborted")?;
    if summary.repositories_found == 0 {
        warn!("No repositories found under {}", config.search_root.display());
    }
    Ok(())
}

/// Scans every repository under `config.search_root` into `config.output`.
///
/// Fails only when the log cannot be created, written or flushed.
pub fn run_scan(config: &ScanConfig) -> Result<ScanSummary> {
    let started = Instant::now();
    let writer = LogWriter::create(&config.output)?;
    info!(
        "Scanning {} into {}",
        config.search_root.display(),
        writer.path().display()
    );

    let (repo_tx, repo_rx) = mpsc::sync_channel::<PathBuf>(0);
    let (done_tx, done_rx) = mpsc::sync_channel::<Result<ScanSummary>>(1);

    let worker_config = config.clone();
    let worker = thread::Builder::new()
        .name("scan-worker".to_string())
        .spawn(move || {
            let outcome = scan_worker(repo_rx, writer, &worker_config);
            let _ = done_tx.send(outcome);
        })?;

    let found = discover(&config.search_root, &repo_tx);
    drop(repo_tx);

    let outcome = done_rx
        .recv()
        .map_err(|_| ChurnError::Other("Scan worker exited without reporting".to_string()))?;
    if worker.join().is_err() {
        warn!("Scan worker panicked after reporting");
    }

    let mut summary = outcome?;
    summary.repositories_found = found;
    info!(
        "Scan finished in {}: {} repositories, {} records",
        humantime::format_duration(started.elapsed()),
        summary.repositories_scanned,
        summary.records_written
    );
    Ok(summary)
}

fn scan_worker(
    paths: Receiver<PathBuf>,
    mut writer: LogWriter,
    config: &ScanConfig,
) -> Result<ScanSummary> {
    let pb = if config.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut summary = ScanSummary::default();
    for path in paths {
        pb.set_message(format!("{} ({} records)", path.display(), writer.written()));
        match scan_repository(&path, config, &mut writer, &mut summary) {
            Ok(true) => summary.repositories_scanned += 1,
            Ok(false) => summary.repositories_skipped += 1,
            Err(e) => {
                pb.finish_and_clear();
                return Err(e);
            }
        }
        pb.tick();
    }

    summary.records_written = writer.finish()?;
    pb.finish_and_clear();
    Ok(summary)
}

/// `Ok(false)` when the repository was skipped; `Err` only for fatal errors.
fn scan_repository(
    path: &Path,
    config: &ScanConfig,
    writer: &mut LogWriter,
    summary: &mut ScanSummary,
) -> Result<bool> {
    let repo = match GitRepo::open(path) {
        Ok(repo) => repo,
        Err(e) => {
            warn!("{e}");
            return Ok(false);
        }
    };

    let author = match &config.author_filter {
        Some(author) => Some(author.clone()),
        None if config.resolve_author_from_repo_config => match repo.configured_email() {
            Some(email) => Some(email),
            None => {
                warn!("No user.email configured for {}; skipping", path.display());
                return Ok(false);
            }
        },
        None => None,
    };

    let branches = match repo.local_branches() {
        Ok(b) => b,
        Err(e) => {
            warn!("Cannot enumerate branches of {}: {e}", path.display());
            return Ok(false);
        }
    };

    let mut walker = CommitWalker::new(&repo, author, config.deduplicate_by_commit_id);
    for branch in &branches {
        match walker.walk(branch, &mut *writer) {
            Ok(_) => summary.branches_walked += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!("Stopped walking {} in {}: {e}", branch.name, path.display()),
        }
    }
    Ok(true)
}
