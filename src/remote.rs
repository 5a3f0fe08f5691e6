use crate::error::Error;
use crate::repository::Repository;

use anyhow::Result;

/// `remote add <name> <url>`: record a peer repository path in config.
pub fn add(repo: &mut Repository, name: &str, url: &str) -> Result<()> {
    if repo.config.has_remote(name) {
        return Err(Error::RemoteExists(name.to_owned()).into());
    }

    repo.config.set_remote(name, url);
    repo.save_config()
}
