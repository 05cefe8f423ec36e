use crate::error::Result;
use crate::git::{Branch, GitRepo};
use crate::model::{display_time, LogRecord};
use crate::store::RecordSink;
use gix::ObjectId;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Walks branches of one repository and emits a record per retained commit.
pub struct CommitWalker<'r> {
    repo: &'r GitRepo,
    author: Option<String>,
    seen: Option<HashSet<ObjectId>>,
}

impl<'r> CommitWalker<'r> {
    /// `author` of `None` (or empty) retains every commit. With `dedup`, a
    /// commit already emitted from an earlier branch of this repository is not
    /// emitted again.
    pub fn new(repo: &'r GitRepo, author: Option<String>, dedup: bool) -> Self {
        Self {
            repo,
            author: author.filter(|a| !a.is_empty()),
            seen: dedup.then(HashSet::new),
        }
    }

    /// Returns the number of records emitted. Unreadable commits are skipped;
    /// only history enumeration and sink failures are returned.
    pub fn walk(&mut self, branch: &Branch, sink: &mut dyn RecordSink) -> Result<usize> {
        let order = self.repo.topo_order(branch.tip)?;
        debug!("Walking {} ({} commits)", branch.name, order.len());

        let repository_path = self.repo.path().display().to_string();
        let mut emitted = 0;
        for id in order {
            let commit = match self.repo.commit_meta(id) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Skipping commit {id} on {}: {e}", branch.name);
                    continue;
                }
            };

            if let Some(author) = &self.author {
                if &commit.author_email != author {
                    continue;
                }
            }
            if let Some(seen) = &mut self.seen {
                if !seen.insert(id) {
                    continue;
                }
            }

            let churn = self.repo.classify_commit(&commit);
            sink.emit(LogRecord {
                commit_id: id.to_string(),
                repository_path: repository_path.clone(),
                branch: branch.name.clone(),
                timestamp: commit.timestamp,
                display_time: display_time(commit.timestamp),
                author_email: commit.author_email,
                churn,
            })?;
            emitted += 1;
        }
        Ok(emitted)
    }
}
