//! Legacy send block: debits the chain and names a destination account.

use lattice_crypto::{hash_block, sign_hash};
use lattice_types::{Account, Amount, BlockHash, PrivateKey, Root, Signature};

use crate::codec::{BlockDecodeError, Reader};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendBlock {
    previous: BlockHash,
    destination: Account,
    balance: Amount,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl SendBlock {
    /// previous(32) + destination(32) + balance(16) + signature(64) + work(8)
    pub const SERIALIZED_SIZE: usize = 152;

    /// Build and sign a send. `balance` is the chain balance after the send.
    pub fn new(
        previous: BlockHash,
        destination: Account,
        balance: Amount,
        key: &PrivateKey,
        work: u64,
    ) -> Self {
        let hash = Self::compute_hash(&previous, &destination, balance);
        Self {
            previous,
            destination,
            balance,
            signature: sign_hash(&hash, key),
            work,
            hash,
        }
    }

    fn compute_hash(previous: &BlockHash, destination: &Account, balance: Amount) -> BlockHash {
        hash_block(&[
            previous.as_bytes(),
            destination.as_bytes(),
            &balance.to_be_bytes(),
        ])
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn previous(&self) -> BlockHash {
        self.previous
    }

    pub fn destination(&self) -> Account {
        self.destination
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn root(&self) -> Root {
        self.previous.into()
    }

    pub(crate) fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.previous.as_bytes());
        out.extend_from_slice(self.destination.as_bytes());
        out.extend_from_slice(&self.balance.to_be_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, BlockDecodeError> {
        let previous = r.hash()?;
        let destination = r.account()?;
        let balance = r.amount()?;
        let signature = r.signature()?;
        let work = r.u64_le()?;
        Ok(Self {
            hash: Self::compute_hash(&previous, &destination, balance),
            previous,
            destination,
            balance,
            signature,
            work,
        })
    }
}
