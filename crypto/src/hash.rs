//! Blake2b-256 hashing for block identities.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use lattice_types::BlockHash;

type Blake2b256 = Blake2b<U32>;

/// Blake2b-256 over a single buffer.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Blake2b-256 over the concatenation of `parts`, fed to the hasher in order.
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let digest = parts
        .iter()
        .fold(Blake2b256::new(), |hasher, part| hasher.chain_update(part))
        .finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Hash a block's hashable fields, given in their canonical order.
pub fn hash_block(parts: &[&[u8]]) -> BlockHash {
    BlockHash::new(blake2b_256_multi(parts))
}
