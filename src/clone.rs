use crate::diff;
use crate::fetch;
use crate::index::{Index, Toc};
use crate::refs;
use crate::remote;
use crate::repository::{Repository, DEFAULT_BRANCH};
use crate::workdir;

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};

/// Copy a repository at a local path: init the target, record the source
/// as `origin`, fetch everything, then point master at the remote master
/// and materialize the working copy (skipped when bare).
pub fn clone(remote_path: &Path, target: &Path, bare: bool) -> Result<String> {
    // The source must already be a repository.
    let source = Repository::open(remote_path)
        .map_err(|_| anyhow::anyhow!("fatal: repository '{}' does not exist", remote_path.display()))?;

    if target.exists() && fs::read_dir(target)?.next().is_some() {
        bail!(
            "fatal: destination path '{}' already exists and is not an empty directory",
            target.display()
        );
    }
    if Repository::find(target)?.is_some() {
        bail!(
            "fatal: destination path '{}' is inside an existing repository",
            target.display()
        );
    }

    let mut repo = Repository::init(target, bare)?;
    remote::add(&mut repo, "origin", &source.root.to_string_lossy())?;
    fetch::fetch(&repo, "origin")?;

    if let Some(hash) = refs::hash_of(&repo, &refs::to_remote_ref("origin", DEFAULT_BRANCH))? {
        refs::write_hash(&repo, &refs::to_local_ref(DEFAULT_BRANCH), &hash)?;

        if !bare {
            let toc = repo.read_commit_toc(&hash)?;
            workdir::apply_diff(&repo, &diff::diff(&Toc::new(), &toc))?;
            let mut index = Index::load(&repo)?;
            index.replace_with_toc(&toc);
            index.save(&repo)?;
        }
    }

    Ok(format!("Cloning into '{}'", target.display()))
}
