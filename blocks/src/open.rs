//! Legacy open block: first block of a chain, receiving its first send.

use lattice_crypto::{hash_block, sign_hash};
use lattice_types::{Account, BlockHash, PrivateKey, Root, Signature};

use crate::codec::{BlockDecodeError, Reader};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenBlock {
    source: BlockHash,
    representative: Account,
    account: Account,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl OpenBlock {
    /// source(32) + representative(32) + account(32) + signature(64) + work(8)
    pub const SERIALIZED_SIZE: usize = 168;

    pub fn new(
        source: BlockHash,
        representative: Account,
        account: Account,
        key: &PrivateKey,
        work: u64,
    ) -> Self {
        let hash = Self::compute_hash(&source, &representative, &account);
        Self {
            source,
            representative,
            account,
            signature: sign_hash(&hash, key),
            work,
            hash,
        }
    }

    fn compute_hash(source: &BlockHash, representative: &Account, account: &Account) -> BlockHash {
        hash_block(&[source.as_bytes(), representative.as_bytes(), account.as_bytes()])
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn source(&self) -> BlockHash {
        self.source
    }

    pub fn representative(&self) -> Account {
        self.representative
    }

    pub fn account(&self) -> Account {
        self.account
    }

    /// An open block is rooted on its own account.
    pub fn root(&self) -> Root {
        self.account.into()
    }

    pub(crate) fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.source.as_bytes());
        out.extend_from_slice(self.representative.as_bytes());
        out.extend_from_slice(self.account.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, BlockDecodeError> {
        let source = r.hash()?;
        let representative = r.account()?;
        let account = r.account()?;
        let signature = r.signature()?;
        let work = r.u64_le()?;
        Ok(Self {
            hash: Self::compute_hash(&source, &representative, &account),
            source,
            representative,
            account,
            signature,
            work,
        })
    }
}
