//! Low-level commands: direct index and ref manipulation, 1:1 with the
//! porcelain's internals.

use crate::hash::hash_to_hex;
use crate::index::Index;
use crate::refs;
use crate::repository::Repository;
use crate::workdir;

use std::path::Path;

use anyhow::{bail, Result};

/// `update-index <path> (--add | --remove)`: stage one file's current
/// content, or drop the path from the index.
pub fn update_index(repo: &Repository, path: &Path, add: bool, remove: bool) -> Result<()> {
    repo.require_worktree()?;

    let rel = workdir::normalize_pathspec(repo, path)?;
    let mut index = Index::load(repo)?;

    if remove {
        index.write_rm(&rel)?;
        index.save(repo)?;
        return Ok(());
    }

    let abs = repo.root.join(&rel);
    if !abs.exists() {
        bail!("error: {rel}: does not exist\nfatal: unable to process path {rel}");
    }
    if abs.is_dir() {
        bail!("error: {rel}: is a directory - add files inside instead\nfatal: unable to process path {rel}");
    }
    if !add && !index.has_entry(&rel, 0) {
        bail!("error: {rel}: cannot add to the index - missing --add option?\nfatal: unable to process path {rel}");
    }

    let hash = repo.write_blob(&workdir::read_file(repo, &rel)?)?;
    index.write_add(&rel, hash);
    index.save(repo)?;
    Ok(())
}

/// `write-tree`: materialize the index's stage-0 view as tree objects and
/// print the root hash.
pub fn write_tree(repo: &Repository) -> Result<String> {
    repo.require_worktree()?;

    let index = Index::load(repo)?;
    let hash = index.write_tree(repo)?;
    Ok(hash_to_hex(&hash))
}

/// `update-ref <ref> <to>`: point the terminal ref of `<ref>` at the
/// commit `<to>` resolves to.
pub fn update_ref(repo: &Repository, ref_name: &str, to: &str) -> Result<()> {
    if !refs::is_ref(ref_name) {
        bail!("fatal: invalid ref name: {ref_name}");
    }

    let hash = repo.resolve_commit(to)?;
    refs::write_hash(repo, &refs::terminal(repo, ref_name)?, &hash)
}
