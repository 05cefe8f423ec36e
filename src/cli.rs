use crate::config::{default_log_path, unescape_email};
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "extchurn")]
#[command(about = "Scan git repositories and rank line churn by file extension")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "The author (by email) to search for")]
    pub email: Option<String>,

    #[arg(long, global = true, help = "Log store path [default: ~/commit_history_<email>.csv]")]
    pub log: Option<PathBuf>,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "More diagnostics (-v info, -vv debug)")]
    pub verbose: u8,

    #[arg(long, global = true, help = "Only report errors and hide progress")]
    pub quiet: bool,
}

impl CommonArgs {
    pub fn author(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(unescape_email)
            .filter(|e| !e.is_empty())
    }

    pub fn log_path(&self) -> PathBuf {
        match &self.log {
            Some(path) => path.clone(),
            None => default_log_path(&self.author().unwrap_or_default()),
        }
    }

    pub fn init_tracing(&self) {
        let level = if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                _ => Level::DEBUG,
            }
        };
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    #[arg(long, default_value = ".", help = "Directory to search for repositories")]
    pub path: PathBuf,

    #[arg(long, help = "Skip the scan and report on the existing log")]
    pub skip: bool,

    #[arg(long, help = "Without --email, filter each repository by its own user.email")]
    pub resolve_author: bool,

    #[arg(long, help = "Record a commit once per repository even if several branches reach it")]
    pub dedup: bool,
}

#[derive(Args, Clone)]
pub struct ReportArgs {
    #[arg(long, default_value_t = -1, allow_negative_numbers = true, help = "History in days to include (-1 for all)")]
    pub days: i64,

    #[arg(long, help = "Show deletions as separate buckets")]
    pub all: bool,

    #[arg(long, help = "Show at most this many entries")]
    pub limit: Option<usize>,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON")]
    pub ndjson: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan repositories into the log, then report
    Scan {
        #[command(flatten)]
        scan: ScanArgs,

        #[command(flatten)]
        report: ReportArgs,
    },
    /// Report on an existing log
    Report {
        #[command(flatten)]
        report: ReportArgs,
    },
    /// List the files at the tip of local branches
    Files {
        #[arg(long, help = "Path to git repository")]
        repo: PathBuf,

        #[arg(long, help = "Only this branch")]
        branch: Option<String>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Scan { scan, report } => {
                if !scan.skip {
                    crate::pipeline::exec(&self.common, &scan)?;
                }
                crate::report::exec(&self.common, &report)
            }
            Commands::Report { report } => crate::report::exec(&self.common, &report),
            Commands::Files { repo, branch } => crate::files::exec(&repo, branch.as_deref()),
        }
    }
}
