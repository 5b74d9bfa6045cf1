//! Legacy receive block: pockets a pending send into an existing chain.

use lattice_crypto::{hash_block, sign_hash};
use lattice_types::{BlockHash, PrivateKey, Root, Signature};

use crate::codec::{BlockDecodeError, Reader};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveBlock {
    previous: BlockHash,
    source: BlockHash,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl ReceiveBlock {
    /// previous(32) + source(32) + signature(64) + work(8)
    pub const SERIALIZED_SIZE: usize = 136;

    pub fn new(previous: BlockHash, source: BlockHash, key: &PrivateKey, work: u64) -> Self {
        let hash = Self::compute_hash(&previous, &source);
        Self {
            previous,
            source,
            signature: sign_hash(&hash, key),
            work,
            hash,
        }
    }

    fn compute_hash(previous: &BlockHash, source: &BlockHash) -> BlockHash {
        hash_block(&[previous.as_bytes(), source.as_bytes()])
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn previous(&self) -> BlockHash {
        self.previous
    }

    pub fn source(&self) -> BlockHash {
        self.source
    }

    pub fn root(&self) -> Root {
        self.previous.into()
    }

    pub(crate) fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.previous.as_bytes());
        out.extend_from_slice(self.source.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, BlockDecodeError> {
        let previous = r.hash()?;
        let source = r.hash()?;
        let signature = r.signature()?;
        let work = r.u64_le()?;
        Ok(Self {
            hash: Self::compute_hash(&previous, &source),
            previous,
            source,
            signature,
            work,
        })
    }
}
