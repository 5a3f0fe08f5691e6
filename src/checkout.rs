use crate::diff;
use crate::error::Error;
use crate::index::Index;
use crate::refs;
use crate::repository::Repository;
use crate::workdir;

use anyhow::Result;

/// Switch the working copy, index and HEAD to `target` (a branch name or a
/// commit hash). Refuses rather than overwrite local edits.
pub fn checkout(repo: &Repository, target: &str) -> Result<String> {
    repo.require_worktree()?;

    if refs::current_branch_name(repo)?.as_deref() == Some(target) {
        return Ok(format!("Already on '{target}'"));
    }

    let hash = repo.resolve_commit(target)?;

    let mut index = Index::load(repo)?;
    let blocked = diff::changed_files_commit_would_overwrite(repo, &index, &hash)?;
    if !blocked.is_empty() {
        return Err(Error::UncommittedChanges { action: "checkout", paths: blocked }.into());
    }

    let head_toc = repo.head_toc()?;
    let target_toc = repo.read_commit_toc(&hash)?;

    workdir::apply_diff(repo, &diff::diff(&head_toc, &target_toc))?;
    index.replace_with_toc(&target_toc);
    index.save(repo)?;

    // A branch name attaches HEAD; anything else detaches it at the commit.
    if repo.gitlet_file(&refs::to_local_ref(target)).exists() {
        refs::attach_head(repo, target)?;
        Ok(format!("Switched to branch '{target}'"))
    } else {
        refs::detach_head(repo, &hash)?;
        Ok(format!(
            "Note: checking out '{target}'.\nYou are in 'detached HEAD' state."
        ))
    }
}
