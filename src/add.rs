use crate::error::Error;
use crate::hash::{hash_bytes, Hash};
use crate::index::Index;
use crate::object::encode_blob_into;
use crate::repository::Repository;
use crate::workdir;

use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;

/// Stage files. Directory pathspecs resolve recursively; a spec matching
/// nothing is an error before anything is written.
pub fn add(repo: &Repository, pathspecs: &[PathBuf]) -> Result<()> {
    repo.require_worktree()?;

    let mut index = Index::load(repo)?;

    //
    //
    // Resolve pathspecs to candidate files.
    //
    //

    let mut files = Vec::new();
    for spec in pathspecs {
        let rel = workdir::normalize_pathspec(repo, spec)?;
        let matched = workdir::resolve_pathspec(repo, &rel)?;
        if matched.is_empty() {
            return Err(Error::PathspecMismatch(spec.display().to_string()).into());
        }
        files.extend(matched);
    }

    files.sort_unstable();
    files.dedup();

    //
    //
    // Read, encode, and hash in parallel; store and stage sequentially.
    //
    //

    let processed = files
        .par_iter()
        .map(|path| -> Result<(Vec<u8>, Hash)> {
            let data = workdir::read_file(repo, path)?;
            let mut encoded = Vec::with_capacity(13 + data.len());
            encode_blob_into(&data, &mut encoded);
            let hash = hash_bytes(&encoded);
            Ok((encoded, hash))
        })
        .collect::<Result<Vec<_>>>()?;

    for (path, (encoded, hash)) in files.iter().zip(&processed) {
        repo.storage.write(hash, encoded)?;
        index.write_add(path, *hash);
    }

    index.save(repo)?;
    log::info!("staged {} file(s)", files.len());

    Ok(())
}
