//! Unified state block carrying the full account state after the block.
//!
//! The meaning of `link` depends on how the balance moved: a destination
//! account for a send, a source block hash for a receive, an epoch marker for
//! an upgrade, and zero for a pure representative change.

use lattice_crypto::{hash_block, sign_hash};
use lattice_types::{Account, Amount, BlockHash, Link, PrivateKey, Root, Signature};

use crate::block::BlockType;
use crate::codec::{BlockDecodeError, Reader};

/// Hash domain separator: 32 bytes, the last one being the state type tag.
const PREAMBLE: [u8; 32] = {
    let mut p = [0u8; 32];
    p[31] = BlockType::State as u8;
    p
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBlock {
    account: Account,
    previous: BlockHash,
    representative: Account,
    balance: Amount,
    link: Link,
    pub signature: Signature,
    pub work: u64,
    hash: BlockHash,
}

impl StateBlock {
    /// account(32) + previous(32) + representative(32) + balance(16) + link(32)
    /// + signature(64) + work(8)
    pub const SERIALIZED_SIZE: usize = 216;

    /// Build and sign a state block. `key` is the account key, or the epoch
    /// signer's key for an epoch upgrade.
    pub fn new(
        account: Account,
        previous: BlockHash,
        representative: Account,
        balance: Amount,
        link: Link,
        key: &PrivateKey,
        work: u64,
    ) -> Self {
        let hash = Self::compute_hash(&account, &previous, &representative, balance, &link);
        Self {
            account,
            previous,
            representative,
            balance,
            link,
            signature: sign_hash(&hash, key),
            work,
            hash,
        }
    }

    fn compute_hash(
        account: &Account,
        previous: &BlockHash,
        representative: &Account,
        balance: Amount,
        link: &Link,
    ) -> BlockHash {
        hash_block(&[
            &PREAMBLE,
            account.as_bytes(),
            previous.as_bytes(),
            representative.as_bytes(),
            &balance.to_be_bytes(),
            link.as_bytes(),
        ])
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn account(&self) -> Account {
        self.account
    }

    pub fn previous(&self) -> BlockHash {
        self.previous
    }

    pub fn representative(&self) -> Account {
        self.representative
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn link(&self) -> Link {
        self.link
    }

    /// The previous block, or the account itself for the first block.
    pub fn root(&self) -> Root {
        if self.previous.is_zero() {
            self.account.into()
        } else {
            self.previous.into()
        }
    }

    pub(crate) fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.account.as_bytes());
        out.extend_from_slice(self.previous.as_bytes());
        out.extend_from_slice(self.representative.as_bytes());
        out.extend_from_slice(&self.balance.to_be_bytes());
        out.extend_from_slice(self.link.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_be_bytes());
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, BlockDecodeError> {
        let account = r.account()?;
        let previous = r.hash()?;
        let representative = r.account()?;
        let balance = r.amount()?;
        let link = r.link()?;
        let signature = r.signature()?;
        let work = r.u64_be()?;
        Ok(Self {
            hash: Self::compute_hash(&account, &previous, &representative, balance, &link),
            account,
            previous,
            representative,
            balance,
            link,
            signature,
            work,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::{blake2b_256_multi, generate_keypair, verify_hash};

    #[test]
    fn hash_covers_preamble_and_fields() {
        let key = generate_keypair();
        let account = key.account();
        let block = StateBlock::new(
            account,
            BlockHash::new([1; 32]),
            account,
            Amount::raw(42),
            Link::new([2; 32]),
            &key.private,
            7,
        );
        let mut preamble = [0u8; 32];
        preamble[31] = 6;
        let expected = blake2b_256_multi(&[
            &preamble,
            account.as_bytes(),
            &[1; 32],
            account.as_bytes(),
            &42u128.to_be_bytes(),
            &[2; 32],
        ]);
        assert_eq!(block.hash(), BlockHash::new(expected));
        assert!(verify_hash(&block.hash(), &block.signature, &key.public));
    }

    #[test]
    fn first_block_is_rooted_on_account() {
        let key = generate_keypair();
        let open = StateBlock::new(
            key.account(),
            BlockHash::ZERO,
            key.account(),
            Amount::ZERO,
            Link::ZERO,
            &key.private,
            0,
        );
        assert_eq!(open.root(), Root::from(key.account()));
    }
}
