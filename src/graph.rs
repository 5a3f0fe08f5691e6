//! Ancestry queries over the commit DAG. The graph is acyclic by
//! construction (parents are older objects), so traversals only carry a
//! defensive bound, not a cycle check.

use crate::hash::{hash_to_hex, Hash};
use crate::repository::Repository;
use crate::util::Xxh3HashSet;

use std::collections::VecDeque;

use anyhow::{bail, Result};
use smallvec::SmallVec;

/// Hard cap on visited commits per traversal.
const MAX_TRAVERSAL: usize = 1 << 20;

pub fn parents(repo: &Repository, commit: &Hash) -> Result<SmallVec<[Hash; 2]>> {
    Ok(repo.read_commit(commit)?.parents)
}

/// Every commit reachable from `start` following parents, `start` included.
pub fn ancestors(repo: &Repository, start: &Hash) -> Result<Xxh3HashSet<Hash>> {
    let mut visited = Xxh3HashSet::default();
    let mut stack = vec![*start];

    while let Some(hash) = stack.pop() {
        if !visited.insert(hash) {
            continue;
        }
        if visited.len() > MAX_TRAVERSAL {
            bail!("commit graph traversal exceeded {MAX_TRAVERSAL} commits");
        }
        stack.extend(parents(repo, &hash)?);
    }

    Ok(visited)
}

/// True iff `ancestor` is reachable from `descendent` (or equal to it).
pub fn is_ancestor(repo: &Repository, ancestor: &Hash, descendent: &Hash) -> Result<bool> {
    if ancestor == descendent {
        return Ok(true);
    }

    let mut visited = Xxh3HashSet::default();
    let mut queue = VecDeque::from([*descendent]);

    while let Some(hash) = queue.pop_front() {
        if !visited.insert(hash) {
            continue;
        }
        if visited.len() > MAX_TRAVERSAL {
            bail!("commit graph traversal exceeded {MAX_TRAVERSAL} commits");
        }
        for parent in parents(repo, &hash)? {
            if parent == *ancestor {
                return Ok(true);
            }
            queue.push_back(parent);
        }
    }

    Ok(false)
}

/// Lowest common ancestor used as the base of a three-way merge: collect
/// the full ancestor set of `a`, then walk breadth-first from `b` and
/// return the first member hit. FIFO order over parent order keeps the
/// tie-break deterministic across runs.
pub fn common_ancestor(repo: &Repository, a: &Hash, b: &Hash) -> Result<Hash> {
    let from_a = ancestors(repo, a)?;

    let mut visited = Xxh3HashSet::default();
    let mut queue = VecDeque::from([*b]);

    while let Some(hash) = queue.pop_front() {
        if from_a.contains(&hash) {
            return Ok(hash);
        }
        if !visited.insert(hash) {
            continue;
        }
        if visited.len() > MAX_TRAVERSAL {
            bail!("commit graph traversal exceeded {MAX_TRAVERSAL} commits");
        }
        queue.extend(parents(repo, &hash)?);
    }

    bail!("no common ancestor between {} and {}", hash_to_hex(a), hash_to_hex(b));
}
