use crate::hash::{hash_bytes, Hash};
use crate::wire::{Decode, Encode, ReadCursor, WriteCursor};

use anyhow::{Result, bail};
use smallvec::SmallVec;

pub const MAGIC: &[u8; 4] = b"GLT1";

const TAG_BLOB: u8 = 0x1;
const TAG_TREE: u8 = 0x2;
const TAG_COMMIT: u8 = 0x3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    #[inline]
    fn as_byte(self) -> u8 {
        match self {
            Self::Blob => TAG_BLOB,
            Self::Tree => TAG_TREE,
            Self::Commit => TAG_COMMIT,
        }
    }

    #[inline]
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            TAG_BLOB => Some(Self::Blob),
            TAG_TREE => Some(Self::Tree),
            TAG_COMMIT => Some(Self::Commit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    #[inline]
    pub fn try_as_commit(&self) -> Result<&Commit> {
        match self {
            Self::Commit(c) => Ok(c),
            _ => bail!("not a commit!"),
        }
    }

    #[inline]
    pub fn try_as_tree(&self) -> Result<&Tree> {
        match self {
            Self::Tree(t) => Ok(t),
            _ => bail!("not a tree!"),
        }
    }

    #[inline]
    pub fn try_as_blob(&self) -> Result<&Blob> {
        match self {
            Self::Blob(b) => Ok(b),
            _ => bail!("not a blob!"),
        }
    }

    #[inline]
    pub fn try_into_commit(self) -> Result<Commit> {
        match self {
            Self::Commit(c) => Ok(c),
            _ => bail!("not a commit!"),
        }
    }

    #[inline]
    pub fn try_into_tree(self) -> Result<Tree> {
        match self {
            Self::Tree(t) => Ok(t),
            _ => bail!("not a tree!"),
        }
    }

    #[inline]
    pub fn try_into_blob(self) -> Result<Blob> {
        match self {
            Self::Blob(b) => Ok(b),
            _ => bail!("not a blob!"),
        }
    }

    #[inline]
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.push(self.kind().as_byte());

        let mut w = WriteCursor::new(&mut buf);
        match self {
            Object::Blob(blob) => blob.encode(&mut w),
            Object::Tree(tree) => tree.encode(&mut w),
            Object::Commit(commit) => commit.encode(&mut w),
        }

        buf
    }

    #[inline]
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 5 {
            bail!("data too short");
        }

        if &data[0..4] != MAGIC {
            bail!("invalid magic");
        }

        let mut r = ReadCursor::new(&data[5..]);
        match ObjectKind::from_byte(data[4]) {
            Some(ObjectKind::Blob) => Ok(Object::Blob(Blob::decode(&mut r)?)),
            Some(ObjectKind::Tree) => Ok(Object::Tree(Tree::decode(&mut r)?)),
            Some(ObjectKind::Commit) => Ok(Object::Commit(Commit::decode(&mut r)?)),
            None => bail!("unknown object type"),
        }
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> Hash {
        hash_bytes(&self.encode())
    }
}

/// Encode raw file content as a blob without going through `Object`.
/// `add` hashes candidate files with this before deciding to store them.
#[inline]
pub fn encode_blob_into(data: &[u8], buf: &mut Vec<u8>) {
    buf.extend_from_slice(MAGIC);
    buf.push(TAG_BLOB);
    buf.extend_from_slice(&(data.len() as u64).to_le_bytes());
    buf.extend_from_slice(data);
}

#[inline]
#[must_use]
pub fn blob_hash(data: &[u8]) -> Hash {
    let mut buf = Vec::with_capacity(13 + data.len());
    encode_blob_into(data, &mut buf);
    hash_bytes(&buf)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Encode for Blob {
    fn encode(&self, w: &mut WriteCursor<'_>) {
        w.write_u64(self.data.len() as u64);
        w.write_slice(&self.data);
    }
}

impl Decode for Blob {
    fn decode(r: &mut ReadCursor<'_>) -> Result<Self> {
        let len = r.read_u64()? as usize;
        let data = r.read_bytes(len)?.to_vec();
        Ok(Blob { data })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub kind: EntryKind,
    pub hash: Hash,
    pub name: String,
}

/// One directory level. Each entry maps a single path segment to a child
/// blob or tree; nesting carries the rest of the path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    // Find a named entry in a tree
    #[inline]
    pub fn find<'a>(&'a self, name: &str) -> Option<&'a TreeEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

impl Encode for Tree {
    fn encode(&self, w: &mut WriteCursor<'_>) {
        // Canonical order: identical contents must hash identically.
        let mut order = (0..self.entries.len()).collect::<Vec<_>>();
        order.sort_unstable_by_key(|&i| self.entries[i].name.as_str());

        w.write_u32(self.entries.len() as u32);
        for i in order {
            let entry = &self.entries[i];
            let tag = match entry.kind {
                EntryKind::Blob => TAG_BLOB,
                EntryKind::Tree => TAG_TREE,
            };
            w.write_u8(tag);
            w.write_hash(&entry.hash);
            w.write_len_prefixed_str(&entry.name);
        }
    }
}

impl Decode for Tree {
    fn decode(r: &mut ReadCursor<'_>) -> Result<Self> {
        let count = r.read_u32()? as usize;

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let kind = match r.read_u8()? {
                TAG_BLOB => EntryKind::Blob,
                TAG_TREE => EntryKind::Tree,
                b => bail!("unknown tree entry tag {b}"),
            };
            let hash = r.read_hash()?;
            let name = r.read_len_prefixed_str()?.to_owned();
            entries.push(TreeEntry { kind, hash, name });
        }

        Ok(Tree { entries })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: Hash,
    /// 0 for a root commit, 1 normally, 2 after a merge.
    pub parents: SmallVec<[Hash; 2]>,
    pub timestamp: i64,
    pub author: String,
    pub message: String,
}

impl Encode for Commit {
    fn encode(&self, w: &mut WriteCursor<'_>) {
        w.write_hash(&self.tree);

        w.write_u32(self.parents.len() as u32);
        for parent in &self.parents {
            w.write_hash(parent);
        }

        w.write_i64(self.timestamp);
        w.write_len_prefixed_str(&self.author);
        w.write_len_prefixed_str(&self.message);
    }
}

impl Decode for Commit {
    fn decode(r: &mut ReadCursor<'_>) -> Result<Self> {
        let tree = r.read_hash()?;

        let parent_count = r.read_u32()? as usize;
        let mut parents = SmallVec::with_capacity(parent_count);
        for _ in 0..parent_count {
            parents.push(r.read_hash()?);
        }

        let timestamp = r.read_i64()?;
        let author = r.read_len_prefixed_str()?.to_owned();
        let message = r.read_len_prefixed_str()?.to_owned();

        Ok(Commit { tree, parents, timestamp, author, message })
    }
}
