use crate::error::Error;
use crate::refs;
use crate::repository::Repository;

use anyhow::{bail, Result};

/// All local branches, current one marked with *.
pub fn list(repo: &Repository) -> Result<String> {
    let current = refs::current_branch_name(repo)?;

    let mut out = String::new();
    for branch in refs::local_heads(repo)?.keys() {
        let marker = if current.as_deref() == Some(branch) { "* " } else { "  " };
        out.push_str(&format!("{marker}{branch}\n"));
    }
    Ok(out)
}

/// Create a new local branch at HEAD's commit.
pub fn create(repo: &Repository, name: &str) -> Result<()> {
    validate_branch_name(name)?;

    if repo.gitlet_file(&refs::to_local_ref(name)).exists() {
        return Err(Error::BranchExists(name.to_owned()).into());
    }

    let Some(head) = repo.head_hash()? else {
        return Err(Error::RefNotFound("HEAD".to_owned()).into());
    };

    refs::write_hash(repo, &refs::to_local_ref(name), &head)
}

/// `branch -u <remote>/<branch>`: record the current branch's upstream
/// remote in config.
pub fn set_upstream(repo: &mut Repository, upstream: &str) -> Result<String> {
    let Some(current) = refs::current_branch_name(repo)? else {
        return Err(Error::Unsupported("setting upstream from a detached HEAD").into());
    };

    let Some((remote, _branch)) = upstream.split_once('/') else {
        bail!("fatal: malformed upstream '{upstream}', expected <remote>/<branch>");
    };

    repo.config.set_branch_remote(&current, remote);
    repo.save_config()?;

    Ok(format!("branch '{current}' set up to track '{upstream}'"))
}

// Reject names that would break the filesystem or confuse ref parsing.
fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("fatal: branch name cannot be empty");
    }
    if name.contains('/') {
        bail!("fatal: branch name cannot contain '/' (namespaced branches not supported)");
    }
    if name.contains(' ') || name.contains('\t') {
        bail!("fatal: branch name cannot contain whitespace");
    }
    if name.contains("..") {
        bail!("fatal: branch name cannot contain '..'");
    }
    if name.starts_with('-') {
        bail!("fatal: branch name cannot start with '-'");
    }
    if name == "HEAD" {
        bail!("fatal: 'HEAD' is not a valid branch name");
    }
    Ok(())
}
