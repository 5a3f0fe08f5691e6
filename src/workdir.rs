//! Working-copy I/O: enumerate tracked candidates, read and write file
//! content, and realize a file-level diff plan on disk.

use crate::diff::{FileDelta, FileStatus};
use crate::hash::Hash;
use crate::index::Toc;
use crate::object::blob_hash;
use crate::repository::{Repository, REPO_DIR};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use walkdir::WalkDir;

/// Every file under the worktree, repo-relative with `/` separators.
/// The repo dir itself is never a candidate.
pub fn ls_files(repo: &Repository) -> Result<Vec<String>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(&repo.root)
        .into_iter()
        .filter_entry(|e| !e.path().ends_with(REPO_DIR))
    {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(&repo.root) else { continue };
        files.push(rel_to_string(rel));
    }

    files.sort_unstable();
    Ok(files)
}

/// Normalize a user-supplied pathspec to a repo-relative `/`-separated
/// path. Relative pathspecs are resolved against the process working
/// directory, which must sit inside the repo.
pub fn normalize_pathspec(repo: &Repository, pathspec: &Path) -> Result<String> {
    let abs = if pathspec.is_absolute() {
        pathspec.to_path_buf()
    } else {
        std::env::current_dir()?.join(pathspec)
    };

    // Normalize `.` and `..` components without requiring existence.
    let mut normalized = PathBuf::new();
    for component in abs.components() {
        match component {
            std::path::Component::ParentDir => {
                normalized.pop();
            }
            std::path::Component::CurDir => {}
            other => normalized.push(other),
        }
    }

    match normalized.strip_prefix(&repo.root) {
        Ok(rel) => Ok(rel_to_string(rel)),
        Err(_) => bail!("path '{}' is outside the repository", pathspec.display()),
    }
}

/// Expand a repo-relative pathspec to the working-copy files it names:
/// the file itself, or every file under it when it is a directory. The
/// empty spec means the whole worktree.
pub fn resolve_pathspec(repo: &Repository, rel: &str) -> Result<Vec<String>> {
    if rel.is_empty() {
        return ls_files(repo);
    }

    let abs = repo.root.join(rel);
    if abs.is_file() {
        return Ok(vec![rel.to_owned()]);
    }
    if abs.is_dir() {
        let prefix = format!("{rel}/");
        return Ok(ls_files(repo)?
            .into_iter()
            .filter(|p| p.starts_with(&prefix))
            .collect());
    }
    Ok(Vec::new())
}

pub fn read_file(repo: &Repository, rel: &str) -> Result<Vec<u8>> {
    Ok(fs::read(repo.root.join(rel))?)
}

pub fn write_file(repo: &Repository, rel: &str, data: &[u8]) -> Result<()> {
    let abs = repo.root.join(rel);
    if let Some(parent) = abs.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(abs, data)?;
    Ok(())
}

/// Remove a file and prune any directories the removal emptied.
pub fn delete_file(repo: &Repository, rel: &str) -> Result<()> {
    let abs = repo.root.join(rel);
    if abs.exists() {
        fs::remove_file(&abs)?;
    }

    let mut dir = abs.parent().map(Path::to_path_buf);
    while let Some(d) = dir {
        if d == repo.root || fs::read_dir(&d)?.next().is_some() {
            break;
        }
        fs::remove_dir(&d)?;
        dir = d.parent().map(Path::to_path_buf);
    }
    Ok(())
}

/// TOC of the working copy restricted to `paths`, hashing each file that
/// exists with the blob encoding so entries compare against stored blobs.
pub fn working_toc(repo: &Repository, paths: &[String]) -> Result<Toc> {
    let mut toc = Toc::new();
    for path in paths {
        let abs = repo.root.join(path);
        if abs.is_file() {
            toc.insert(path.clone(), blob_hash(&fs::read(abs)?));
        }
    }
    Ok(toc)
}

/// Realize a diff plan: write the giver side of adds and modifies, delete
/// the deletions. SAME entries are untouched.
pub fn apply_diff(repo: &Repository, changes: &BTreeMap<String, FileDelta>) -> Result<()> {
    for (path, delta) in changes {
        match delta.status {
            FileStatus::Add | FileStatus::Modify => {
                let hash = delta.giver.as_ref().expect("add/modify carries a giver hash");
                write_blob_to(repo, path, hash)?;
            }
            FileStatus::Delete => delete_file(repo, path)?,
            FileStatus::Same | FileStatus::Conflict => {}
        }
    }
    Ok(())
}

pub fn write_blob_to(repo: &Repository, rel: &str, hash: &Hash) -> Result<()> {
    let data = repo.read_blob(hash)?;
    write_file(repo, rel, &data)
}

fn rel_to_string(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
