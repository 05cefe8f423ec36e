use crate::error::{ChurnError, Result};
use gix::{ObjectId, Repository};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct GitRepo {
    pub(super) repo: Repository,
    path: PathBuf,
}

/// A local branch: full reference name plus the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub tip: ObjectId,
}

/// The parts of a commit the scanner needs, detached from the object buffer.
#[derive(Debug, Clone)]
pub struct CommitMeta {
    pub id: ObjectId,
    pub author_email: String,
    pub timestamp: i64,
    pub parents: Vec<ObjectId>,
    pub tree: ObjectId,
}

impl GitRepo {
    /// Open the repository at exactly `path` (a work tree or a git dir).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = gix::open(path).map_err(|e| ChurnError::RepositoryOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let path = repo.path().to_path_buf();
        Ok(Self { repo, path })
    }

    /// The git dir of the repository.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `user.email` from the repository's resolved configuration.
    pub fn configured_email(&self) -> Option<String> {
        self.repo
            .config_snapshot()
            .string("user.email")
            .map(|email| email.to_string())
            .filter(|email| !email.is_empty())
    }

    /// Every branch under `refs/heads/`. Branches that cannot be peeled to a
    /// commit are reported and left out.
    pub fn local_branches(&self) -> Result<Vec<Branch>> {
        let platform = self
            .repo
            .references()
            .map_err(|e| ChurnError::Git(format!("Cannot read references: {e}")))?;
        let iter = platform
            .local_branches()
            .map_err(|e| ChurnError::Git(format!("Cannot list local branches: {e}")))?;

        let mut branches = Vec::new();
        for reference in iter {
            let mut reference = match reference {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping unreadable branch in {}: {e}", self.path.display());
                    continue;
                }
            };
            let name = reference.name().as_bstr().to_string();
            match reference.peel_to_id_in_place() {
                Ok(id) => branches.push(Branch {
                    name,
                    tip: id.detach(),
                }),
                Err(e) => warn!("Skipping branch {name}: {e}"),
            }
        }
        Ok(branches)
    }

    pub fn find_branch(&self, name: &str) -> Result<Branch> {
        let full = if name.starts_with("refs/") {
            name.to_string()
        } else {
            format!("refs/heads/{name}")
        };
        self.local_branches()?
            .into_iter()
            .find(|b| b.name == full)
            .ok_or_else(|| ChurnError::Git(format!("No local branch named {name}")))
    }

    pub fn commit_meta(&self, id: ObjectId) -> Result<CommitMeta> {
        let commit = self.repo.find_commit(id)?;
        let author = commit.author()?;
        let author_email = author.email.to_string();
        let timestamp = author.seconds();
        let tree = commit.tree_id()?.detach();
        let parents = commit.parent_ids().map(|p| p.detach()).collect();
        Ok(CommitMeta {
            id,
            author_email,
            timestamp,
            parents,
            tree,
        })
    }

    /// All commits reachable from `tip` in topological order: no commit is
    /// listed before every one of its children in the reachable set.
    ///
    /// The reachable set is gathered with an explicit stack, then emitted with
    /// Kahn's algorithm. A LIFO ready list keeps runs of first parents together
    /// the way `git log --topo-order` does.
    ///
    /// A parent missing from the object store (the boundary of a shallow
    /// clone) ends history there; only an unreadable `tip` is an error.
    pub fn topo_order(&self, tip: ObjectId) -> Result<Vec<ObjectId>> {
        let mut parents_of: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
        let mut pending_children: HashMap<ObjectId, usize> = HashMap::new();
        let mut seen: HashSet<ObjectId> = HashSet::from([tip]);
        let mut stack = vec![tip];

        while let Some(id) = stack.pop() {
            let commit = match self.repo.find_commit(id) {
                Ok(commit) => commit,
                Err(e) if id != tip => {
                    warn!("History of {} ends before {id}: {e}", self.path.display());
                    pending_children.remove(&id);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let parents: Vec<ObjectId> = commit.parent_ids().map(|p| p.detach()).collect();
            for parent in &parents {
                *pending_children.entry(*parent).or_insert(0) += 1;
                if seen.insert(*parent) {
                    stack.push(*parent);
                }
            }
            parents_of.insert(id, parents);
        }

        let mut order = Vec::with_capacity(parents_of.len());
        let mut ready = vec![tip];
        while let Some(id) = ready.pop() {
            order.push(id);
            let parents = parents_of.get(&id).map(Vec::as_slice).unwrap_or_default();
            for parent in parents.iter().rev() {
                if let Some(count) = pending_children.get_mut(parent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(*parent);
                    }
                }
            }
        }
        Ok(order)
    }
}
