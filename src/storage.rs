use crate::hash::{hash_to_hex, hex_to_hash, Hash};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// One file per object under `objects/`, named by the 40-hex digest of its
/// contents. Objects are immutable; a write for an existing hash is a no-op.
#[derive(Debug)]
pub struct Storage {
    objects_dir: PathBuf,
}

impl Storage {
    pub fn new(repo_dir: &Path) -> Result<Self> {
        let objects_dir = repo_dir.join("objects");
        fs::create_dir_all(&objects_dir)
            .with_context(|| format!("cannot create {}", objects_dir.display()))?;
        Ok(Self { objects_dir })
    }

    #[inline]
    fn object_path(&self, hash: &Hash) -> PathBuf {
        self.objects_dir.join(hash_to_hex(hash))
    }

    #[inline]
    #[must_use]
    pub fn exists(&self, hash: &Hash) -> bool {
        self.object_path(hash).exists()
    }

    /// Read encoded object bytes by hash.
    pub fn read(&self, hash: &Hash) -> Result<Vec<u8>> {
        let path = self.object_path(hash);
        if !path.exists() {
            bail!("object {} not found", hash_to_hex(hash));
        }
        Ok(fs::read(path)?)
    }

    /// Store encoded bytes under their hash; caller hashes.
    pub fn write(&self, hash: &Hash, data: &[u8]) -> Result<()> {
        let path = self.object_path(hash);
        if path.exists() {
            return Ok(()); // content-addressed, already present
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// Every stored hash, sorted. Fetch walks this to copy a peer's store.
    pub fn list_all(&self) -> Result<Vec<Hash>> {
        let mut hashes = Vec::new();
        for entry in fs::read_dir(&self.objects_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Ok(hash) = hex_to_hash(name) {
                hashes.push(hash);
            }
        }
        hashes.sort_unstable();
        Ok(hashes)
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.list_all().map_or(0, |v| v.len())
    }
}
