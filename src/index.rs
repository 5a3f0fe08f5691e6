use crate::error::Error;
use crate::hash::{hash_to_hex, hex_to_hash, Hash};
use crate::object::{EntryKind, Object, Tree, TreeEntry};
use crate::repository::Repository;

use std::collections::BTreeMap;
use std::fs;

use anyhow::{bail, Result};

/// Flattened `path -> blob hash` view of a tree or of the index at stage 0.
/// The working unit of diff and merge.
pub type Toc = BTreeMap<String, Hash>;

pub const STAGE_NORMAL: u8 = 0;
pub const STAGE_BASE: u8 = 1;
pub const STAGE_OURS: u8 = 2;
pub const STAGE_THEIRS: u8 = 3;

// On-disk: one entry per line, sorted by (path, stage):
//
//   <path> <stage>\t<40-hex>
//
// Stages 1..=3 appear only while a merge conflict is unresolved, and a
// conflicted path never also has a stage-0 entry.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<(String, u8), Hash>,
}

impl Index {
    pub fn load(repo: &Repository) -> Result<Self> {
        let path = repo.gitlet_file("index");
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::decode(&fs::read_to_string(path)?)
    }

    /// Rewrite the index file in one rename so a crash never leaves a
    /// half-written table behind.
    pub fn save(&self, repo: &Repository) -> Result<()> {
        let path = repo.gitlet_file("index");
        let tmp = repo.gitlet_file("index.tmp");
        fs::write(&tmp, self.encode())?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn encode(&self) -> String {
        let mut out = String::new();
        for ((path, stage), hash) in &self.entries {
            out.push_str(&format!("{path} {stage}\t{}\n", hash_to_hex(hash)));
        }
        out
    }

    fn decode(text: &str) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for line in text.lines() {
            if line.is_empty() {
                continue;
            }
            let Some((left, hex)) = line.rsplit_once('\t') else {
                bail!("malformed index line: {line}");
            };
            let Some((path, stage)) = left.rsplit_once(' ') else {
                bail!("malformed index line: {line}");
            };
            let stage: u8 = stage.parse()?;
            if stage > STAGE_THEIRS {
                bail!("invalid index stage {stage}");
            }
            entries.insert((path.to_owned(), stage), hex_to_hash(hex)?);
        }

        Ok(Self { entries })
    }

    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8, &Hash)> {
        self.entries.iter().map(|((path, stage), hash)| (path.as_str(), *stage, hash))
    }

    #[inline]
    #[must_use]
    pub fn has_entry(&self, path: &str, stage: u8) -> bool {
        self.entries.contains_key(&(path.to_owned(), stage))
    }

    #[must_use]
    pub fn get(&self, path: &str, stage: u8) -> Option<&Hash> {
        self.entries.get(&(path.to_owned(), stage))
    }

    /// True iff any conflict stage exists for the path.
    #[must_use]
    pub fn file_in_conflict(&self, path: &str) -> bool {
        (STAGE_BASE..=STAGE_THEIRS).any(|stage| self.has_entry(path, stage))
    }

    #[must_use]
    pub fn conflicted_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .entries
            .keys()
            .filter(|(_, stage)| *stage != STAGE_NORMAL)
            .map(|(path, _)| path.clone())
            .collect();
        paths.dedup();
        paths
    }

    /// Every distinct path in the table, any stage.
    #[must_use]
    pub fn tracked_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries.keys().map(|(path, _)| path.clone()).collect();
        paths.dedup();
        paths
    }

    /// Stage-0 view.
    #[must_use]
    pub fn read_toc(&self) -> Toc {
        self.entries
            .iter()
            .filter(|((_, stage), _)| *stage == STAGE_NORMAL)
            .map(|((path, _), hash)| (path.clone(), *hash))
            .collect()
    }

    /// Record normal staged content, clearing any conflict stages so the
    /// path ends with exactly one stage-0 entry. This is how conflicts are
    /// marked resolved.
    pub fn write_add(&mut self, path: &str, hash: Hash) {
        for stage in STAGE_BASE..=STAGE_THEIRS {
            self.entries.remove(&(path.to_owned(), stage));
        }
        self.entries.insert((path.to_owned(), STAGE_NORMAL), hash);
    }

    /// Drop every stage for the path. Removing a conflicted path is
    /// intentionally refused.
    pub fn write_rm(&mut self, path: &str) -> Result<()> {
        if self.file_in_conflict(path) {
            return Err(Error::Unsupported("removing a conflicted path").into());
        }
        for stage in STAGE_NORMAL..=STAGE_THEIRS {
            self.entries.remove(&(path.to_owned(), stage));
        }
        Ok(())
    }

    /// Replace the path's entries with the present conflict stages.
    pub fn write_conflict(
        &mut self,
        path: &str,
        base: Option<Hash>,
        ours: Option<Hash>,
        theirs: Option<Hash>,
    ) {
        for stage in STAGE_NORMAL..=STAGE_THEIRS {
            self.entries.remove(&(path.to_owned(), stage));
        }
        if let Some(hash) = base {
            self.entries.insert((path.to_owned(), STAGE_BASE), hash);
        }
        if let Some(hash) = ours {
            self.entries.insert((path.to_owned(), STAGE_OURS), hash);
        }
        if let Some(hash) = theirs {
            self.entries.insert((path.to_owned(), STAGE_THEIRS), hash);
        }
    }

    /// Replace the whole table with a stage-0 mirror of a TOC (checkout).
    pub fn replace_with_toc(&mut self, toc: &Toc) {
        self.entries = toc
            .iter()
            .map(|(path, hash)| ((path.clone(), STAGE_NORMAL), *hash))
            .collect();
    }

    /// Paths equal to `pathspec` or inside it as a directory. `.` and ""
    /// match everything.
    #[must_use]
    pub fn matching_paths(&self, pathspec: &str) -> Vec<String> {
        let prefix = format!("{pathspec}/");
        self.tracked_paths()
            .into_iter()
            .filter(|p| {
                pathspec.is_empty() || pathspec == "." || p == pathspec || p.starts_with(&prefix)
            })
            .collect()
    }

    /// Build and write tree objects from the stage-0 entries, bottom-up,
    /// returning the root tree hash.
    pub fn write_tree(&self, repo: &Repository) -> Result<Hash> {
        let toc = self.read_toc();
        write_tree_from_toc(repo, &toc)
    }
}

/// Write the nested trees for a flat TOC. Consumes a contiguous run of the
/// sorted paths per directory (implemented iteratively, no recursion).
pub fn write_tree_from_toc(repo: &Repository, toc: &Toc) -> Result<Hash> {
    let paths: Vec<&str> = toc.keys().map(String::as_str).collect();
    let hashes: Vec<Hash> = toc.values().copied().collect();

    struct Frame<'a> {
        /// Directory prefix (repo-relative, no leading slash). Root is "".
        dir: &'a str,
        /// Name to use when adding this directory to its parent. Root has None.
        name_in_parent: Option<&'a str>,
        entries: Vec<TreeEntry>,
    }

    let mut stack: Vec<Frame<'_>> = vec![Frame {
        dir: "",
        name_in_parent: None,
        entries: Vec::new(),
    }];

    let mut i = 0;

    loop {
        let (cur_dir, cur_dir_len) = {
            let f = stack.last().expect("non-empty stack");
            (f.dir, f.dir.len())
        };

        // Finish the current frame if the next path is outside it (or we've
        // run out of paths).
        let finish_now = if i >= paths.len() {
            true
        } else if cur_dir.is_empty() {
            false
        } else {
            !(paths[i].starts_with(cur_dir) && paths[i].as_bytes().get(cur_dir_len) == Some(&b'/'))
        };

        if finish_now {
            let done = stack.pop().expect("non-empty stack");
            let hash = repo.write_object(&Object::Tree(Tree { entries: done.entries }))?;

            if let Some(parent) = stack.last_mut() {
                let name = done.name_in_parent.expect("non-root frame must have a name");
                parent.entries.push(TreeEntry {
                    kind: EntryKind::Tree,
                    hash,
                    name: name.to_owned(),
                });
                continue;
            }

            return Ok(hash);
        }

        let rel = if cur_dir.is_empty() {
            paths[i]
        } else {
            &paths[i][cur_dir_len + 1..] // skip "dir/"
        };

        if rel.is_empty() {
            i += 1;
            continue;
        }

        match rel.find('/') {
            None => {
                // Direct file child - add blob entry
                let top = stack.last_mut().expect("non-empty stack");
                top.entries.push(TreeEntry {
                    kind: EntryKind::Blob,
                    hash: hashes[i],
                    name: rel.to_owned(),
                });
                i += 1;
            }
            Some(slash) => {
                // Subdirectory - push a new frame and build it first (post-order)
                let subdir_name = &rel[..slash];
                if subdir_name.is_empty() {
                    // Defensive: avoid looping on repeated slashes.
                    i += 1;
                    continue;
                }

                let subdir_full = if cur_dir.is_empty() {
                    &paths[i][..slash]
                } else {
                    &paths[i][..cur_dir_len + 1 + slash]
                };

                stack.push(Frame {
                    dir: subdir_full,
                    name_in_parent: Some(subdir_name),
                    entries: Vec::new(),
                });
            }
        }
    }
}
