//! Per-account chain tip records.

use lattice_types::{Account, Amount, BlockHash, Epoch, Timestamp};
use serde::{Deserialize, Serialize};

/// Tip of an account's chain, updated on every admitted or rolled-back block.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Hash of the latest block in this account's chain.
    pub head: BlockHash,
    pub representative: Account,
    pub open_block: BlockHash,
    pub balance: Amount,
    /// Wall-clock time of the last change.
    pub modified: Timestamp,
    /// Number of blocks in the chain; equals the head's height.
    pub block_count: u64,
    pub epoch: Epoch,
}

/// Finality floor for an account: blocks at or below `height` are cemented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationHeightInfo {
    pub height: u64,
    pub frontier: BlockHash,
}

impl ConfirmationHeightInfo {
    pub fn new(height: u64, frontier: BlockHash) -> Self {
        Self { height, frontier }
    }
}
