use crate::graph;
use crate::hash::Hash;
use crate::merge;
use crate::refs;
use crate::repository::Repository;
use crate::util::Xxh3HashSet;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Copy every missing object from the peer named by
/// `remote.<name>.url` (a local filesystem path, opened as an explicit
/// repository handle), update the remote-tracking branches, and write
/// FETCH_HEAD. Idempotent: a second run moves nothing.
pub fn fetch(repo: &Repository, remote: &str) -> Result<String> {
    let Some(url) = repo.config.remote_url(remote) else {
        bail!("fatal: {remote} does not appear to be a gitlet repository");
    };
    let url = url.to_owned();

    let peer = Repository::open(Path::new(&url))
        .with_context(|| format!("fatal: unable to read remote repository {url}"))?;

    //
    //
    // Objects: content-addressed, so copying is a plain union.
    //
    //

    let local: Xxh3HashSet<Hash> = repo.storage.list_all()?.into_iter().collect();

    let mut new_objects = 0usize;
    for hash in peer.storage.list_all()? {
        if local.contains(&hash) {
            continue;
        }
        repo.storage.write(&hash, &peer.storage.read(&hash)?)?;
        new_objects += 1;
    }
    log::info!("fetch {remote}: {new_objects} new object(s)");

    //
    //
    // Remote-tracking refs
    //
    //

    let peer_heads = refs::local_heads(&peer)?;

    let mut lines = vec![format!("From {url}")];
    for (branch, hash) in &peer_heads {
        let remote_ref = refs::to_remote_ref(remote, branch);
        let prev = refs::hash_of(repo, &remote_ref)?;

        if prev == Some(*hash) {
            continue;
        }

        // Forced iff the new tip does not descend from what we had.
        let forced = match prev {
            Some(prev) => !graph::is_ancestor(repo, &prev, hash)?,
            None => false,
        };

        refs::write_hash(repo, &remote_ref, hash)?;
        let marker = if forced { " (forced)" } else { "" };
        lines.push(format!("  {branch} -> {remote}/{branch}{marker}"));
    }

    // The peer branch matching the current local branch is the one a
    // subsequent pull merges.
    let for_merge = refs::current_branch_name(repo)?;
    let fetch_head = refs::compose_fetch_head(&peer_heads, for_merge.as_deref(), &url);
    fs::write(repo.gitlet_file("FETCH_HEAD"), fetch_head)?;

    lines.push(format!("Count {new_objects}"));
    Ok(lines.join("\n"))
}

/// `fetch` then `merge FETCH_HEAD`, strictly in that order.
pub fn pull(repo: &Repository, remote: &str) -> Result<String> {
    repo.require_worktree()?;

    let fetched = fetch(repo, remote)?;
    let merged = merge::merge(repo, "FETCH_HEAD")?;
    Ok(format!("{fetched}\n{merged}"))
}
