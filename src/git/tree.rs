use super::repo::GitRepo;
use crate::error::Result;
use gix::ObjectId;

impl GitRepo {
    /// Every file path in a tree, `/`-joined from the tree root.
    ///
    /// Walks with a worklist of pending `(prefix, tree)` pairs so nesting depth
    /// never grows the call stack. Submodule entries are not listed.
    pub fn list_files(&self, tree_id: ObjectId) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let mut pending: Vec<(String, ObjectId)> = vec![(String::new(), tree_id)];

        while let Some((prefix, id)) = pending.pop() {
            let tree = self.repo.find_tree(id)?;
            let decoded = tree.decode()?;
            for entry in &decoded.entries {
                let path = if prefix.is_empty() {
                    entry.filename.to_string()
                } else {
                    format!("{prefix}/{}", entry.filename)
                };
                if entry.mode.is_tree() {
                    pending.push((path, entry.oid.to_owned()));
                } else if !entry.mode.is_commit() {
                    files.push(path);
                }
            }
        }
        Ok(files)
    }
}
