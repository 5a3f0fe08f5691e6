use crate::error::Error;
use crate::hash::hash_to_hex;
use crate::index::Index;
use crate::merge;
use crate::object::{Commit, Object};
use crate::refs;
use crate::repository::Repository;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use smallvec::SmallVec;

/// Record the staged tree as a commit and advance HEAD's terminal ref.
/// Mid-merge, MERGE_MSG wins over `-m` and MERGE_HEAD becomes the second
/// parent; a successful commit concludes the merge.
pub fn commit(repo: &Repository, message: &str, author: &str) -> Result<String> {
    repo.require_worktree()?;

    let index = Index::load(repo)?;

    // The unmerged check runs before anything is written so a refused
    // commit never leaves objects behind.
    let conflicted = index.conflicted_paths();
    if !conflicted.is_empty() {
        return Err(Error::UnmergedFiles(conflicted).into());
    }

    let merging = merge::in_progress(repo);
    let head = repo.head_hash()?;

    if index.is_empty() && head.is_none() {
        return Err(Error::NothingToCommit.into());
    }

    let tree = index.write_tree(repo)?;
    if let Some(head) = &head {
        if !merging && repo.read_commit(head)?.tree == tree {
            return Err(Error::NothingToCommit.into());
        }
    }

    let message = match merge::merge_msg(repo)? {
        Some(msg) if merging => msg,
        _ => message.to_owned(),
    };

    let mut parents = SmallVec::new();
    if let Some(head) = head {
        parents.push(head);
    }
    if merging {
        let merge_head = merge::merge_head(repo)?
            .ok_or_else(|| Error::RefNotFound("MERGE_HEAD".to_owned()))?;
        parents.push(merge_head);
    }

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

    let hash = repo.write_object(&Object::Commit(Commit {
        tree,
        parents,
        timestamp,
        author: author.to_owned(),
        message: message.clone(),
    }))?;

    refs::write_hash(repo, &refs::terminal(repo, "HEAD")?, &hash)?;

    if merging {
        merge::clear_state(repo)?;
    }

    let branch = refs::current_branch_name(repo)?.unwrap_or_else(|| "detached HEAD".to_owned());
    let subject = message.lines().next().unwrap_or_default();
    Ok(format!("[{branch} {}] {subject}", &hash_to_hex(&hash)[..7]))
}
