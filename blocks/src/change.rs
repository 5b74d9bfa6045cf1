//! Legacy change block: moves the chain's delegated weight to a new representative.

use lattice_crypto::{hash_block, sign_hash};
use lattice_types::{Account, BlockHash, PrivateKey, Root, Signature};

use crate::codec::{BlockDecodeError, Reader};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeBlock {
    previous: BlockHash,
    representative: Account,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl ChangeBlock {
    /// previous(32) + representative(32) + signature(64) + work(8)
    pub const SERIALIZED_SIZE: usize = 136;

    pub fn new(previous: BlockHash, representative: Account, key: &PrivateKey, work: u64) -> Self {
        let hash = Self::compute_hash(&previous, &representative);
        Self {
            previous,
            representative,
            signature: sign_hash(&hash, key),
            work,
            hash,
        }
    }

    fn compute_hash(previous: &BlockHash, representative: &Account) -> BlockHash {
        hash_block(&[previous.as_bytes(), representative.as_bytes()])
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn previous(&self) -> BlockHash {
        self.previous
    }

    pub fn representative(&self) -> Account {
        self.representative
    }

    pub fn root(&self) -> Root {
        self.previous.into()
    }

    pub(crate) fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.previous.as_bytes());
        out.extend_from_slice(self.representative.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, BlockDecodeError> {
        let previous = r.hash()?;
        let representative = r.account()?;
        let signature = r.signature()?;
        let work = r.u64_le()?;
        Ok(Self {
            hash: Self::compute_hash(&previous, &representative),
            previous,
            representative,
            signature,
            work,
        })
    }
}
