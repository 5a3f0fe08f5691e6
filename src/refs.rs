//! Named pointers into the commit DAG. A ref is either direct (its file
//! holds a 40-hex hash) or symbolic (`ref: <other-ref>`). HEAD is symbolic
//! while attached to a branch and direct when detached.

use crate::hash::{hash_to_hex, hex_to_hash, is_hash, Hash};
use crate::repository::Repository;

use std::collections::BTreeMap;
use std::fs;

use anyhow::{bail, Result};

/// Symbolic chains are short in practice (HEAD -> branch); anything deeper
/// than this is a corrupt repo, not a legitimate layout.
const MAX_SYMREF_DEPTH: usize = 16;

const SYMREF_PREFIX: &str = "ref: ";

/// The recognized ref families. Anything else is not a ref name.
#[must_use]
pub fn is_ref(name: &str) -> bool {
    if matches!(name, "HEAD" | "FETCH_HEAD" | "MERGE_HEAD") {
        return true;
    }
    if let Some(branch) = name.strip_prefix("refs/heads/") {
        return !branch.is_empty() && !branch.contains('/');
    }
    if let Some(rest) = name.strip_prefix("refs/remotes/") {
        return matches!(rest.split('/').collect::<Vec<_>>().as_slice(),
            [remote, branch] if !remote.is_empty() && !branch.is_empty());
    }
    false
}

#[inline]
#[must_use]
pub fn to_local_ref(name: &str) -> String {
    format!("refs/heads/{name}")
}

#[inline]
#[must_use]
pub fn to_remote_ref(remote: &str, name: &str) -> String {
    format!("refs/remotes/{remote}/{name}")
}

/// Trimmed contents of a ref file, or None when absent.
pub fn read_ref_file(repo: &Repository, name: &str) -> Result<Option<String>> {
    let path = repo.gitlet_file(name);
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(fs::read_to_string(path)?.trim().to_owned()))
}

/// Store a literal ref value: a 40-hex hash or `ref: <name>`.
pub fn write(repo: &Repository, name: &str, value: &str) -> Result<()> {
    if !is_ref(name) {
        bail!("invalid ref name: {name}");
    }
    if let Some(target) = value.strip_prefix(SYMREF_PREFIX) {
        if !is_ref(target.trim()) {
            bail!("invalid symbolic ref target: {value}");
        }
    } else if !is_hash(value) {
        bail!("invalid ref value: {value}");
    }

    let path = repo.gitlet_file(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{value}\n"))?;
    Ok(())
}

pub fn write_hash(repo: &Repository, name: &str, hash: &Hash) -> Result<()> {
    write(repo, name, &hash_to_hex(hash))
}

/// Follow the symbolic chain from `name` to the NAME of the final direct
/// ref. A missing file ends the chain: an unborn branch is still a direct
/// ref, it just has no value yet.
pub fn terminal(repo: &Repository, name: &str) -> Result<String> {
    let mut current = name.to_owned();

    for _ in 0..MAX_SYMREF_DEPTH {
        match read_ref_file(repo, &current)? {
            Some(content) if content.starts_with(SYMREF_PREFIX) => {
                current = content[SYMREF_PREFIX.len()..].trim().to_owned();
            }
            _ => return Ok(current),
        }
    }

    bail!("symbolic ref chain starting at {name} is too deep");
}

/// Resolve a ref name or 40-hex string to a commit hash. A full hex digest
/// passes through untouched; FETCH_HEAD resolves to its for-merge line;
/// a bare branch name counts as `refs/heads/<name>`. None when the final
/// direct ref does not exist yet.
pub fn hash_of(repo: &Repository, ref_or_hash: &str) -> Result<Option<Hash>> {
    if is_hash(ref_or_hash) {
        return Ok(Some(hex_to_hash(ref_or_hash)?));
    }

    if ref_or_hash == "FETCH_HEAD" {
        return match read_ref_file(repo, "FETCH_HEAD")? {
            Some(content) => fetch_head_for_merge(&content),
            None => Ok(None),
        };
    }

    let name = if is_ref(ref_or_hash) {
        ref_or_hash.to_owned()
    } else {
        to_local_ref(ref_or_hash)
    };

    match read_ref_file(repo, &terminal(repo, &name)?)? {
        Some(content) if is_hash(&content) => Ok(Some(hex_to_hash(&content)?)),
        Some(content) => bail!("malformed ref {name}: {content}"),
        None => Ok(None),
    }
}

//
//
// HEAD
//
//

pub fn head_is_detached(repo: &Repository) -> Result<bool> {
    match read_ref_file(repo, "HEAD")? {
        Some(content) => Ok(!content.starts_with(SYMREF_PREFIX)),
        None => bail!("HEAD is missing"),
    }
}

/// The branch HEAD is attached to, or None when detached.
pub fn current_branch_name(repo: &Repository) -> Result<Option<String>> {
    let terminal = terminal(repo, "HEAD")?;
    Ok(terminal.strip_prefix("refs/heads/").map(ToOwned::to_owned))
}

pub fn attach_head(repo: &Repository, branch: &str) -> Result<()> {
    write(repo, "HEAD", &format!("{SYMREF_PREFIX}{}", to_local_ref(branch)))
}

pub fn detach_head(repo: &Repository, hash: &Hash) -> Result<()> {
    write(repo, "HEAD", &hash_to_hex(hash))
}

//
//
// Branch namespaces
//
//

fn heads_in(repo: &Repository, dir: &str) -> Result<BTreeMap<String, Hash>> {
    let mut heads = BTreeMap::new();
    let path = repo.gitlet_file(dir);
    if !path.exists() {
        return Ok(heads);
    }

    for entry in fs::read_dir(&path)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else { continue };
        if let Some(hash) = hash_of(repo, &format!("{dir}/{name}"))? {
            heads.insert(name, hash);
        }
    }
    Ok(heads)
}

pub fn local_heads(repo: &Repository) -> Result<BTreeMap<String, Hash>> {
    heads_in(repo, "refs/heads")
}

pub fn remote_heads(repo: &Repository, remote: &str) -> Result<BTreeMap<String, Hash>> {
    heads_in(repo, &format!("refs/remotes/{remote}"))
}

//
//
// FETCH_HEAD
//
//

/// One line per fetched branch. Exactly the `for_merge` branch (when the
/// peer has it) is left unmarked; that line is what `pull` merges.
#[must_use]
pub fn compose_fetch_head(
    heads: &BTreeMap<String, Hash>,
    for_merge: Option<&str>,
    remote_url: &str,
) -> String {
    let mut out = String::new();
    for (branch, hash) in heads {
        let marker = if for_merge == Some(branch.as_str()) { "" } else { "not-for-merge " };
        out.push_str(&format!(
            "{} {marker}branch '{branch}' of {remote_url}\n",
            hash_to_hex(hash),
        ));
    }
    out
}

/// The hash on the single FETCH_HEAD line lacking `not-for-merge`.
pub fn fetch_head_for_merge(content: &str) -> Result<Option<Hash>> {
    for line in content.lines() {
        if line.contains("not-for-merge") {
            continue;
        }
        let Some((hex, _)) = line.split_once(' ') else { continue };
        return Ok(Some(hex_to_hash(hex)?));
    }
    Ok(None)
}
