//! Three-way merge: fast-forward detection, in-index conflict recording,
//! and the MERGE_HEAD/MERGE_MSG lifecycle that `commit` later concludes.

use crate::diff::{self, FileStatus};
use crate::error::Error;
use crate::graph;
use crate::hash::Hash;
use crate::index::Index;
use crate::refs;
use crate::repository::Repository;
use crate::workdir;

use std::fs;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// No MERGE_HEAD, no conflict stages.
    Clean,
    /// MERGE_HEAD present, all paths resolved; awaiting `commit`.
    InProgressClean,
    /// MERGE_HEAD present and conflict stages remain.
    InProgressConflicted,
}

pub fn merge_head(repo: &Repository) -> Result<Option<Hash>> {
    refs::hash_of(repo, "MERGE_HEAD")
}

pub fn in_progress(repo: &Repository) -> bool {
    repo.gitlet_file("MERGE_HEAD").exists()
}

pub fn merge_msg(repo: &Repository) -> Result<Option<String>> {
    let path = repo.gitlet_file("MERGE_MSG");
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(fs::read_to_string(path)?.trim_end().to_owned()))
}

/// Remove MERGE_HEAD and MERGE_MSG; called by the commit that concludes
/// the merge.
pub fn clear_state(repo: &Repository) -> Result<()> {
    for name in ["MERGE_HEAD", "MERGE_MSG"] {
        let path = repo.gitlet_file(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

#[must_use]
pub fn state(repo: &Repository, index: &Index) -> MergeState {
    if !in_progress(repo) {
        MergeState::Clean
    } else if index.conflicted_paths().is_empty() {
        MergeState::InProgressClean
    } else {
        MergeState::InProgressConflicted
    }
}

/// Merge `target` (the giver) into HEAD's commit (the receiver).
pub fn merge(repo: &Repository, target: &str) -> Result<String> {
    repo.require_worktree()?;

    if refs::head_is_detached(repo)? {
        return Err(Error::Unsupported("merging into a detached HEAD").into());
    }
    let receiver = repo.head_hash()?;
    let giver = repo.resolve_commit(target)?;

    if let Some(receiver) = &receiver {
        if graph::is_ancestor(repo, &giver, receiver)? {
            return Ok("Already up-to-date".to_owned());
        }
    }

    let mut index = Index::load(repo)?;

    // Nothing moves while local edits would be clobbered.
    let blocked = diff::changed_files_commit_would_overwrite(repo, &index, &giver)?;
    if !blocked.is_empty() {
        return Err(Error::UncommittedChanges { action: "merge", paths: blocked }.into());
    }

    let receiver_toc = repo.head_toc()?;
    let giver_toc = repo.read_commit_toc(&giver)?;

    // An unborn branch fast-forwards trivially.
    let fast_forward = match &receiver {
        Some(receiver) => graph::is_ancestor(repo, receiver, &giver)?,
        None => true,
    };

    if fast_forward {
        // Fast-forward: the receiver has nothing of its own, so HEAD's
        // branch just moves up to the giver.
        log::debug!("merge {target}: fast-forward");
        workdir::apply_diff(repo, &diff::diff(&receiver_toc, &giver_toc))?;
        index.replace_with_toc(&giver_toc);
        index.save(repo)?;
        refs::write_hash(repo, &refs::terminal(repo, "HEAD")?, &giver)?;
        return Ok("Fast-forward".to_owned());
    }

    //
    //
    // Real three-way merge
    //
    //

    let receiver = receiver.expect("a non-fast-forward merge has a receiver commit");
    let base = graph::common_ancestor(repo, &receiver, &giver)?;
    log::debug!(
        "merge {target}: base {}",
        crate::hash::hash_to_hex(&base)
    );
    let base_toc = repo.read_commit_toc(&base)?;
    let deltas = diff::three_way(&receiver_toc, &giver_toc, &base_toc);

    // Mutation order: conflict-marker blobs first (content-addressed, safe
    // to abandon), then the index, then MERGE_HEAD.
    index.replace_with_toc(&receiver_toc);

    let mut conflicts = Vec::new();
    for (path, delta) in &deltas {
        match delta.status {
            FileStatus::Conflict => {
                let ours = match &delta.receiver {
                    Some(hash) => repo.read_blob(hash)?,
                    None => Vec::new(),
                };
                let theirs = match &delta.giver {
                    Some(hash) => repo.read_blob(hash)?,
                    None => Vec::new(),
                };
                let content = compose_conflict(&ours, &theirs, target);
                repo.write_blob(&content)?;
                workdir::write_file(repo, path, &content)?;
                index.write_conflict(path, delta.base, delta.receiver, delta.giver);
                conflicts.push(path.clone());
            }
            FileStatus::Add | FileStatus::Modify => {
                index.write_add(path, delta.giver.expect("add/modify carries a giver hash"));
            }
            FileStatus::Delete => index.write_rm(path)?,
            FileStatus::Same => {}
        }
    }

    workdir::apply_diff(repo, &deltas)?;
    index.save(repo)?;

    let branch = refs::current_branch_name(repo)?.unwrap_or_else(|| "HEAD".to_owned());
    refs::write_hash(repo, "MERGE_HEAD", &giver)?;
    fs::write(repo.gitlet_file("MERGE_MSG"), format!("Merge {target} into {branch}\n"))?;

    if conflicts.is_empty() {
        Ok("Automatic merge went well; run 'gitlet commit' to conclude the merge".to_owned())
    } else {
        let mut out = String::new();
        for path in &conflicts {
            out.push_str(&format!("CONFLICT (content): Merge conflict in {path}\n"));
        }
        out.push_str("Automatic merge failed; fix conflicts and then commit the result.");
        Ok(out)
    }
}

/// Receiver and giver content between marker lines. An absent side renders
/// empty rather than being skipped, so the surviving side is still visible
/// in context.
fn compose_conflict(ours: &[u8], theirs: &[u8], target: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"<<<<<<< HEAD\n");
    out.extend_from_slice(ours);
    if !ours.is_empty() && !ours.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(b"=======\n");
    out.extend_from_slice(theirs);
    if !theirs.is_empty() && !theirs.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(format!(">>>>>>> {target}\n").as_bytes());
    out
}
