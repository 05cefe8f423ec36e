use super::repo::{CommitMeta, GitRepo};
use crate::error::{ChurnError, Result};
use crate::extension;
use crate::model::{merge_churn, signed_key, ChurnMap, Direction};
use gix::object::tree::diff::ChangeDetached;
use gix::ObjectId;
use similar::TextDiff;
use tracing::warn;

impl GitRepo {
    /// Line churn of `commit` against every one of its parents, summed.
    ///
    /// Root commits yield an empty map. A parent whose diff fails contributes
    /// nothing; the remaining parents are still counted.
    pub fn classify_commit(&self, commit: &CommitMeta) -> ChurnMap {
        let mut churn = ChurnMap::new();
        for parent in &commit.parents {
            match self.churn_against_parent(*parent, commit.tree) {
                Ok(part) => merge_churn(&mut churn, part),
                Err(e) => warn!("Skipping parent of {}: {e}", commit.id),
            }
        }
        churn
    }

    /// Churn of the tree `tree` relative to the tree of commit `parent`.
    pub fn churn_against_parent(&self, parent: ObjectId, tree: ObjectId) -> Result<ChurnMap> {
        self.diff_parent(parent, tree)
            .map_err(|e| ChurnError::DiffCompute(format!("against {parent}: {e}")))
    }

    fn diff_parent(&self, parent: ObjectId, tree: ObjectId) -> Result<ChurnMap> {
        let parent_tree = self.repo.find_commit(parent)?.tree()?;
        let tree = self.repo.find_tree(tree)?;

        let changes: Vec<ChangeDetached> =
            self.repo.diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)?;

        let mut churn = ChurnMap::new();
        for change in changes {
            self.handle_change(change, &mut churn)?;
        }
        Ok(churn)
    }

    fn handle_change(&self, change: ChangeDetached, churn: &mut ChurnMap) -> Result<()> {
        match change {
            ChangeDetached::Addition {
                id,
                location,
                entry_mode,
                ..
            } => {
                if is_file(entry_mode) {
                    self.tally(churn, &location.to_string(), None, Some(id))?;
                }
            }
            ChangeDetached::Deletion {
                id,
                location,
                entry_mode,
                ..
            } => {
                if is_file(entry_mode) {
                    self.tally(churn, &location.to_string(), Some(id), None)?;
                }
            }
            ChangeDetached::Modification {
                previous_id,
                previous_entry_mode,
                id,
                entry_mode,
                location,
                ..
            } => {
                let old = is_file(previous_entry_mode).then_some(previous_id);
                let new = is_file(entry_mode).then_some(id);
                if old.is_some() || new.is_some() {
                    self.tally(churn, &location.to_string(), old, new)?;
                }
            }
            ChangeDetached::Rewrite {
                source_id,
                source_location,
                source_entry_mode,
                id,
                location,
                entry_mode,
                copy,
                ..
            } => {
                // Rename tracking is undone: the source counts as deleted and
                // the destination as added, each under its own path.
                if !copy && is_file(source_entry_mode) {
                    self.tally(churn, &source_location.to_string(), Some(source_id), None)?;
                }
                if is_file(entry_mode) {
                    self.tally(churn, &location.to_string(), None, Some(id))?;
                }
            }
        }
        Ok(())
    }

    /// Counts inserted and deleted lines between two blobs, keyed by the
    /// extension of `old_path`. Binary blobs contribute nothing.
    fn tally(
        &self,
        churn: &mut ChurnMap,
        old_path: &str,
        old: Option<ObjectId>,
        new: Option<ObjectId>,
    ) -> Result<()> {
        let (Some(old_text), Some(new_text)) = (self.blob_text(old)?, self.blob_text(new)?) else {
            return Ok(());
        };
        tally_lines(churn, extension::classify(old_path), &old_text, &new_text);
        Ok(())
    }

    /// Text of a blob, the empty string for a missing side, `None` if binary.
    fn blob_text(&self, id: Option<ObjectId>) -> Result<Option<String>> {
        let Some(id) = id else {
            return Ok(Some(String::new()));
        };
        let object = self.repo.find_object(id)?;
        if is_binary(&object.data) {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&object.data).into_owned()))
    }
}

fn is_file(mode: gix::objs::tree::EntryMode) -> bool {
    !mode.is_tree() && !mode.is_commit()
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(8192).any(|&b| b == 0)
}

/// Adds one to `+ext` for every line with no old-side position and one to
/// `-ext` for every line with no new-side position. Context lines are ignored.
pub(crate) fn tally_lines(churn: &mut ChurnMap, ext: &str, old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);
    let mut added = 0i64;
    let mut removed = 0i64;
    for change in diff.iter_all_changes() {
        if change.old_index().is_none() {
            added += 1;
        }
        if change.new_index().is_none() {
            removed += 1;
        }
    }
    if added > 0 {
        *churn.entry(signed_key(Direction::Added, ext)).or_insert(0) += added;
    }
    if removed > 0 {
        *churn.entry(signed_key(Direction::Removed, ext)).or_insert(0) += removed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(pairs: &[(&str, i64)]) -> ChurnMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn pure_insertion_counts_added_lines() {
        let mut churn = ChurnMap::new();
        tally_lines(&mut churn, "go", "", "a\nb\nc\n");
        assert_eq!(churn, map(&[("+go", 3)]));
    }

    #[test]
    fn deletions_increment_the_minus_key() {
        let mut churn = ChurnMap::new();
        tally_lines(&mut churn, "rs", "a\nb\nc\n", "a\n");
        assert_eq!(churn, map(&[("-rs", 2)]));
    }

    #[test]
    fn replaced_line_counts_both_directions() {
        let mut churn = ChurnMap::new();
        tally_lines(&mut churn, "py", "a\nb\nc\n", "a\nB\nc\n");
        assert_eq!(churn, map(&[("+py", 1), ("-py", 1)]));
    }

    #[test]
    fn unchanged_text_adds_no_keys() {
        let mut churn = ChurnMap::new();
        tally_lines(&mut churn, "md", "same\n", "same\n");
        assert!(churn.is_empty());
    }

    #[test]
    fn binary_detection_looks_for_nul() {
        assert!(is_binary(b"PNG\0\x01"));
        assert!(!is_binary(b"plain text\n"));
    }
}
