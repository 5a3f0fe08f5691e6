//! Name-status diffing over TOCs: two-way for checkout plans and status,
//! three-way for merge classification. Content (line-level) diffing is
//! deliberately not offered.

use crate::error::Error;
use crate::hash::Hash;
use crate::index::{Index, Toc};
use crate::repository::Repository;
use crate::workdir;

use std::collections::BTreeMap;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Add,
    Modify,
    Delete,
    Same,
    Conflict,
}

impl FileStatus {
    #[inline]
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Add => 'A',
            Self::Modify => 'M',
            Self::Delete => 'D',
            Self::Same => 'S',
            Self::Conflict => 'C',
        }
    }
}

/// Per-path hashes feeding the working copy and the merge engine. For a
/// two-way diff `base` mirrors `receiver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileDelta {
    pub status: FileStatus,
    pub receiver: Option<Hash>,
    pub base: Option<Hash>,
    pub giver: Option<Hash>,
}

/// Two-way: how `b` differs from `a`, per path.
#[must_use]
pub fn name_status(a: &Toc, b: &Toc) -> BTreeMap<String, FileStatus> {
    diff(a, b).into_iter().map(|(path, delta)| (path, delta.status)).collect()
}

/// Two-way file-level plan from `a` (receiver) to `b` (giver).
#[must_use]
pub fn diff(a: &Toc, b: &Toc) -> BTreeMap<String, FileDelta> {
    three_way(a, b, a)
}

/// Three-way classification of every path in the union. The status is the
/// receiver-to-merged transition: Conflict iff both sides changed vs base
/// and disagree with each other (a deleted side counts as changed); a path
/// only the receiver changed stays Same.
#[must_use]
pub fn three_way(receiver: &Toc, giver: &Toc, base: &Toc) -> BTreeMap<String, FileDelta> {
    let mut paths: Vec<&String> = receiver.keys().chain(giver.keys()).chain(base.keys()).collect();
    paths.sort_unstable();
    paths.dedup();

    let mut out = BTreeMap::new();
    for path in paths {
        let r = receiver.get(path).copied();
        let g = giver.get(path).copied();
        let b = base.get(path).copied();

        out.insert(
            path.clone(),
            FileDelta { status: classify(r, b, g), receiver: r, base: b, giver: g },
        );
    }
    out
}

fn classify(receiver: Option<Hash>, base: Option<Hash>, giver: Option<Hash>) -> FileStatus {
    if receiver == giver {
        return FileStatus::Same;
    }
    if base != receiver && base != giver {
        // Both sides changed and disagree.
        return FileStatus::Conflict;
    }
    if base == giver {
        // Only the receiver changed; it stays as-is.
        return FileStatus::Same;
    }
    // Only the giver changed: take it.
    match (receiver, giver) {
        (_, None) => FileStatus::Delete,
        (None, Some(_)) => FileStatus::Add,
        (Some(_), Some(_)) => FileStatus::Modify,
    }
}

/// Paths whose working content differs from HEAD's TOC and from the target
/// commit's TOC. Checkout and merge refuse to run while any exist, because
/// applying the target would silently destroy those edits.
pub fn changed_files_commit_would_overwrite(
    repo: &Repository,
    index: &Index,
    target_commit: &Hash,
) -> Result<Vec<String>> {
    let head_toc = repo.head_toc()?;
    let target_toc = repo.read_commit_toc(target_commit)?;
    let working = workdir::working_toc(repo, &index.tracked_paths())?;

    let vs_head = name_status(&head_toc, &working);
    let vs_target = name_status(&target_toc, &working);

    let mut paths: Vec<String> = vs_head
        .iter()
        .filter(|(path, status)| {
            **status != FileStatus::Same
                && vs_target.get(*path).is_some_and(|s| *s != FileStatus::Same)
        })
        .map(|(path, _)| path.clone())
        .collect();
    paths.sort_unstable();
    Ok(paths)
}

//
//
// The diff command
//
//

/// `diff [h1] [h2] --name-status`. Both refs: tree vs tree. One: tree vs
/// index. Neither: index vs working copy.
pub fn read_diff(
    repo: &Repository,
    h1: Option<&str>,
    h2: Option<&str>,
    name_status_flag: bool,
) -> Result<String> {
    if !name_status_flag {
        return Err(Error::Unsupported("diff without --name-status").into());
    }

    let (a, b) = match (h1, h2) {
        (Some(h1), Some(h2)) => {
            let a = repo.read_commit_toc(&repo.resolve_commit(h1)?)?;
            let b = repo.read_commit_toc(&repo.resolve_commit(h2)?)?;
            (a, b)
        }
        (Some(h1), None) => {
            let a = repo.read_commit_toc(&repo.resolve_commit(h1)?)?;
            let index = Index::load(repo)?;
            (a, index.read_toc())
        }
        _ => {
            repo.require_worktree()?;
            let index = Index::load(repo)?;
            let working = workdir::working_toc(repo, &index.tracked_paths())?;
            (index.read_toc(), working)
        }
    };

    let mut out = String::new();
    for (path, status) in name_status(&a, &b) {
        if status == FileStatus::Same {
            continue;
        }
        out.push_str(&format!("{} {path}\n", status.code()));
    }
    Ok(out)
}
