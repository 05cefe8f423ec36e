use crate::git::GitRepo;
use anyhow::Context;
use std::path::Path;

pub fn exec(repo_path: &Path, branch: Option<&str>) -> anyhow::Result<()> {
    let repo = GitRepo::open(repo_path).context("Failed to open git repository")?;
    let branches = match branch {
        Some(name) => vec![repo.find_branch(name)?],
        None => repo
            .local_branches()
            .context("Failed to list local branches")?,
    };

    for branch in branches {
        let tip = repo
            .commit_meta(branch.tip)
            .with_context(|| format!("Failed to read tip of {}", branch.name))?;
        let mut files = repo
            .list_files(tip.tree)
            .with_context(|| format!("Failed to list files of {}", branch.name))?;
        files.sort();
        println!("{}", branch.name);
        for file in files {
            println!("  {file}");
        }
    }
    Ok(())
}
