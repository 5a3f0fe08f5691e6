use crate::error::Error;
use crate::index::Index;
use crate::repository::Repository;
use crate::workdir;

use std::path::Path;

use anyhow::{bail, Result};

/// Delete tracked files from disk and index. Matching is against the
/// index, not the working copy; `-r` is required for directories and any
/// matched file with uncommitted modifications vs HEAD blocks the whole
/// removal.
pub fn rm(repo: &Repository, pathspec: &Path, recursive: bool, force: bool) -> Result<()> {
    repo.require_worktree()?;

    if force {
        return Err(Error::Unsupported("rm -f").into());
    }

    let rel = workdir::normalize_pathspec(repo, pathspec)?;
    let index = Index::load(repo)?;
    let matched = index.matching_paths(&rel);

    if matched.is_empty() {
        return Err(Error::PathspecMismatch(pathspec.display().to_string()).into());
    }
    if !recursive && (matched.len() > 1 || repo.root.join(&rel).is_dir()) {
        bail!("fatal: not removing '{rel}' recursively without -r");
    }

    //
    // Refuse when disk content has diverged from HEAD.
    //

    let head_toc = repo.head_toc()?;
    let working = workdir::working_toc(repo, &matched)?;

    let changed: Vec<String> = matched
        .iter()
        .filter(|path| working.get(*path) != head_toc.get(*path))
        .cloned()
        .collect();
    if !changed.is_empty() {
        return Err(Error::UncommittedChanges { action: "rm", paths: changed }.into());
    }

    let mut index = index;
    for path in &matched {
        workdir::delete_file(repo, path)?;
        index.write_rm(path)?;
    }
    index.save(repo)?;

    Ok(())
}
