//! Pending (receivable) entries.

use lattice_types::{Account, Amount, BlockHash, Epoch};
use serde::{Deserialize, Serialize};

/// Key of a pending entry: the destination account and the send block hash.
///
/// Ordering is by account first, so all entries of one account are contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PendingKey {
    pub account: Account,
    pub hash: BlockHash,
}

impl PendingKey {
    pub const SERIALIZED_SIZE: usize = 64;

    pub fn new(account: Account, hash: BlockHash) -> Self {
        Self { account, hash }
    }

    /// `account ++ hash`, so byte order matches [`Ord`].
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(self.account.as_bytes());
        out[32..].copy_from_slice(self.hash.as_bytes());
        out
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::SERIALIZED_SIZE {
            return None;
        }
        Some(Self {
            account: Account::from_slice(&bytes[..32])?,
            hash: BlockHash::from_slice(&bytes[32..])?,
        })
    }
}

/// An unclaimed credit created by a send.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInfo {
    /// Account that sent the funds.
    pub source: Account,
    pub amount: Amount,
    /// Epoch of the sending account when the send was made.
    pub epoch: Epoch,
}

impl PendingInfo {
    pub fn new(source: Account, amount: Amount, epoch: Epoch) -> Self {
        Self {
            source,
            amount,
            epoch,
        }
    }
}
