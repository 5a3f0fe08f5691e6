use anyhow::Result;
use sha1::{Digest, Sha1};

pub type Hash = [u8; 20];

#[must_use]
pub fn hash_bytes(data: &[u8]) -> Hash {
    Sha1::digest(data).into()
}

#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

pub fn hex_to_hash(s: &str) -> Result<Hash> {
    let bytes = hex::decode(s)?;
    bytes.try_into().map_err(|_| anyhow::anyhow!("invalid hash length"))
}

/// True for a full 40-char hex digest. Anything else is a ref name.
#[must_use]
pub fn is_hash(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
