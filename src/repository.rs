use crate::config::Config;
use crate::error::Error;
use crate::hash::Hash;
use crate::index::Toc;
use crate::object::{Commit, Object, ObjectKind};
use crate::storage::Storage;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

pub const REPO_DIR: &str = ".gitlet";
pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug)]
pub struct Repository {
    /// Working-tree root. Equal to `repo_dir` for a bare repo.
    pub root: PathBuf,
    /// The `.gitlet` directory, or the root itself when bare.
    pub repo_dir: PathBuf,
    pub config: Config,
    pub storage: Storage,
}

impl Repository {
    /// Create the repository layout at `path`. A repo is never nested
    /// inside an existing one: when `path` already sits in a repository
    /// (itself included), that repository is opened and returned untouched.
    pub fn init(path: &Path, bare: bool) -> Result<Self> {
        if let Some(existing) = Self::find(path)? {
            return Ok(existing);
        }

        fs::create_dir_all(path)?;
        let root = path.canonicalize()?;
        let repo_dir = if bare { root.clone() } else { root.join(REPO_DIR) };

        fs::create_dir_all(repo_dir.join("objects"))?;
        fs::create_dir_all(repo_dir.join("refs/heads"))?;
        fs::create_dir_all(repo_dir.join("refs/remotes"))?;

        let head = repo_dir.join("HEAD");
        if !head.exists() {
            fs::write(head, format!("ref: refs/heads/{DEFAULT_BRANCH}\n"))?;
        }

        let config_path = repo_dir.join("config");
        let config = if config_path.exists() {
            Config::load(&config_path)?
        } else {
            let config = Config::new(bare);
            config.save(&config_path)?;
            config
        };

        Ok(Self {
            storage: Storage::new(&repo_dir)?,
            root,
            repo_dir,
            config,
        })
    }

    /// Open the repository containing `start`, walking parent directories
    /// upward until a repo layout is found.
    pub fn open(start: &Path) -> Result<Self> {
        match Self::discover(start)? {
            Some((root, repo_dir)) => Self::open_layout(root, repo_dir),
            None => Err(Error::NotInRepo.into()),
        }
    }

    /// Like `open`, but returns None instead of an error when `start` is
    /// not inside a repository. `start` does not have to exist yet; the
    /// walk begins at its nearest existing ancestor.
    pub fn find(start: &Path) -> Result<Option<Self>> {
        let abs = if start.is_absolute() {
            start.to_path_buf()
        } else {
            std::env::current_dir()?.join(start)
        };

        let mut dir = abs.as_path();
        let base = loop {
            if dir.exists() {
                break dir;
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Ok(None),
            }
        };

        match Self::discover(base)? {
            Some((root, repo_dir)) => Ok(Some(Self::open_layout(root, repo_dir)?)),
            None => Ok(None),
        }
    }

    /// The upward walk shared by `open`, `find` and `init`: the worktree
    /// root and repo dir of the repository containing `start`, if any.
    fn discover(start: &Path) -> Result<Option<(PathBuf, PathBuf)>> {
        let Ok(start) = start.canonicalize() else { return Ok(None) };
        let mut dir = start.as_path();

        loop {
            let dotted = dir.join(REPO_DIR);
            if dotted.join("HEAD").exists() {
                return Ok(Some((dir.to_path_buf(), dotted)));
            }

            // A bare repo carries the layout directly at its root.
            if dir.join("HEAD").exists() && dir.join("config").exists() {
                let config = Config::load(&dir.join("config"))?;
                if config.is_bare() {
                    return Ok(Some((dir.to_path_buf(), dir.to_path_buf())));
                }
            }

            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Ok(None),
            }
        }
    }

    fn open_layout(root: PathBuf, repo_dir: PathBuf) -> Result<Self> {
        let config = Config::load(&repo_dir.join("config"))?;
        Ok(Self {
            storage: Storage::new(&repo_dir)?,
            root,
            repo_dir,
            config,
        })
    }

    #[inline]
    #[must_use]
    pub fn is_bare(&self) -> bool {
        self.config.is_bare()
    }

    /// Working-copy-touching commands call this first.
    pub fn require_worktree(&self) -> Result<()> {
        if self.is_bare() {
            return Err(Error::BareRepo.into());
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn gitlet_file(&self, name: &str) -> PathBuf {
        self.repo_dir.join(name)
    }

    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.gitlet_file("config"))
    }

    //
    //
    // Object plumbing
    //
    //

    pub fn read_object(&self, hash: &Hash) -> Result<Object> {
        let data = self.storage.read(hash)?;
        Object::decode(&data)
    }

    pub fn object_kind(&self, hash: &Hash) -> Result<ObjectKind> {
        Ok(self.read_object(hash)?.kind())
    }

    /// Serialize, hash, store. Idempotent: rewriting an existing hash is a no-op.
    pub fn write_object(&self, object: &Object) -> Result<Hash> {
        let encoded = object.encode();
        let hash = crate::hash::hash_bytes(&encoded);
        self.storage.write(&hash, &encoded)?;
        Ok(hash)
    }

    pub fn write_blob(&self, data: &[u8]) -> Result<Hash> {
        let mut encoded = Vec::with_capacity(13 + data.len());
        crate::object::encode_blob_into(data, &mut encoded);
        let hash = crate::hash::hash_bytes(&encoded);
        self.storage.write(&hash, &encoded)?;
        Ok(hash)
    }

    pub fn read_blob(&self, hash: &Hash) -> Result<Vec<u8>> {
        Ok(self.read_object(hash)?.try_into_blob()?.data)
    }

    pub fn read_commit(&self, hash: &Hash) -> Result<Commit> {
        self.read_object(hash)?.try_into_commit()
    }

    /// Flatten a commit's root tree into `path -> blob hash`.
    pub fn read_commit_toc(&self, commit_hash: &Hash) -> Result<Toc> {
        let commit = self.read_commit(commit_hash)?;
        let mut toc = Toc::new();
        self.flatten_tree(&commit.tree, "", &mut toc)?;
        Ok(toc)
    }

    fn flatten_tree(&self, tree_hash: &Hash, prefix: &str, toc: &mut Toc) -> Result<()> {
        let tree = self.read_object(tree_hash)?.try_into_tree()?;

        for entry in &tree.entries {
            let path = if prefix.is_empty() {
                entry.name.clone()
            } else {
                let mut path = String::with_capacity(prefix.len() + 1 + entry.name.len());
                path.push_str(prefix);
                path.push('/');
                path.push_str(&entry.name);
                path
            };

            match entry.kind {
                crate::object::EntryKind::Blob => {
                    toc.insert(path, entry.hash);
                }
                crate::object::EntryKind::Tree => {
                    self.flatten_tree(&entry.hash, &path, toc)?;
                }
            }
        }

        Ok(())
    }

    /// The commit HEAD currently points to, if any.
    pub fn head_hash(&self) -> Result<Option<Hash>> {
        crate::refs::hash_of(self, "HEAD")
    }

    /// HEAD's TOC, or an empty one before the first commit.
    pub fn head_toc(&self) -> Result<Toc> {
        match self.head_hash()? {
            Some(hash) => self.read_commit_toc(&hash),
            None => Ok(Toc::new()),
        }
    }

    /// Resolve a user-supplied ref or hash to an existing commit hash.
    pub fn resolve_commit(&self, target: &str) -> Result<Hash> {
        let Some(hash) = crate::refs::hash_of(self, target)? else {
            return Err(Error::RefNotFound(target.to_owned()).into());
        };
        if !self.storage.exists(&hash) {
            return Err(Error::RefNotFound(target.to_owned()).into());
        }
        match self.object_kind(&hash)? {
            ObjectKind::Commit => Ok(hash),
            _ => Err(Error::NotACommit(target.to_owned()).into()),
        }
    }
}
