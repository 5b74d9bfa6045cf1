//! Storage contract for the block-lattice ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The ledger depends only on the traits and runs each `process` or
//! `rollback` call inside one write transaction supplied by the caller.
//!
//! Absent keys are reported as `Ok(None)`; `Err` is reserved for backend
//! failures and corrupt records.

pub mod account;
pub mod block;
pub mod error;
pub mod pending;

pub use account::{AccountInfo, ConfirmationHeightInfo};
pub use block::decode_saved_block;
pub use error::StoreError;
pub use pending::{PendingInfo, PendingKey};

use lattice_blocks::SavedBlock;
use lattice_types::{Account, Amount, BlockHash};

/// A storage engine handing out read snapshots and exclusive write transactions.
pub trait Store: Send + Sync {
    type Read<'a>: ReadTxn
    where
        Self: 'a;
    type Write<'a>: WriteTxn
    where
        Self: 'a;

    fn begin_read(&self) -> Result<Self::Read<'_>, StoreError>;

    /// Blocks until no other write transaction is open.
    fn begin_write(&self) -> Result<Self::Write<'_>, StoreError>;
}

/// Read operations, available on both read and write transactions.
pub trait ReadTxn {
    // ── Blocks ──────────────────────────────────────────────────────────

    fn block_get(&self, hash: &BlockHash) -> Result<Option<SavedBlock>, StoreError>;

    fn block_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.block_get(hash)?.is_some())
    }

    /// Successor recorded in the block's sideband; `None` when the block is
    /// missing or is the head of its chain.
    fn block_successor(&self, hash: &BlockHash) -> Result<Option<BlockHash>, StoreError> {
        Ok(self
            .block_get(hash)?
            .map(|b| b.successor())
            .filter(|s| !s.is_zero()))
    }

    fn block_count(&self) -> Result<u64, StoreError>;

    // ── Accounts ────────────────────────────────────────────────────────

    fn account_get(&self, account: &Account) -> Result<Option<AccountInfo>, StoreError>;

    fn account_count(&self) -> Result<u64, StoreError>;

    /// All accounts in key order.
    fn account_iter(&self) -> Result<Vec<(Account, AccountInfo)>, StoreError>;

    // ── Pending ─────────────────────────────────────────────────────────

    fn pending_get(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError>;

    fn pending_exists(&self, key: &PendingKey) -> Result<bool, StoreError> {
        Ok(self.pending_get(key)?.is_some())
    }

    /// All pending entries addressed to `account`, ordered by send hash.
    fn pending_range(&self, account: &Account)
        -> Result<Vec<(PendingKey, PendingInfo)>, StoreError>;

    fn pending_any(&self, account: &Account) -> Result<bool, StoreError> {
        Ok(!self.pending_range(account)?.is_empty())
    }

    // ── Confirmation height ─────────────────────────────────────────────

    fn confirmation_height_get(
        &self,
        account: &Account,
    ) -> Result<Option<ConfirmationHeightInfo>, StoreError>;

    // ── Representation ──────────────────────────────────────────────────

    /// Persisted weight of a representative; zero when absent.
    fn representation_get(&self, representative: &Account) -> Result<Amount, StoreError>;

    fn representation_iter(&self) -> Result<Vec<(Account, Amount)>, StoreError>;

    // ── Legacy frontiers ────────────────────────────────────────────────

    /// Account whose legacy chain head is `hash`.
    fn frontier_get(&self, hash: &BlockHash) -> Result<Option<Account>, StoreError>;
}

/// Write operations. Nothing is visible to other transactions until `commit`;
/// dropping an uncommitted transaction discards its changes.
pub trait WriteTxn: ReadTxn {
    fn block_put(&mut self, block: &SavedBlock) -> Result<(), StoreError>;

    fn block_del(&mut self, hash: &BlockHash) -> Result<(), StoreError>;

    fn block_successor_set(
        &mut self,
        hash: &BlockHash,
        successor: &BlockHash,
    ) -> Result<(), StoreError> {
        let mut block = self
            .block_get(hash)?
            .ok_or_else(|| StoreError::NotFound(format!("block {hash}")))?;
        block.sideband.successor = *successor;
        self.block_put(&block)
    }

    fn block_successor_clear(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.block_successor_set(hash, &BlockHash::ZERO)
    }

    fn account_put(&mut self, account: &Account, info: &AccountInfo) -> Result<(), StoreError>;

    fn account_del(&mut self, account: &Account) -> Result<(), StoreError>;

    fn pending_put(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError>;

    fn pending_del(&mut self, key: &PendingKey) -> Result<(), StoreError>;

    fn confirmation_height_put(
        &mut self,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) -> Result<(), StoreError>;

    fn confirmation_height_del(&mut self, account: &Account) -> Result<(), StoreError>;

    /// Persist a representative's weight. A zero weight removes the entry.
    fn representation_put(
        &mut self,
        representative: &Account,
        weight: Amount,
    ) -> Result<(), StoreError>;

    fn frontier_put(&mut self, hash: &BlockHash, account: &Account) -> Result<(), StoreError>;

    fn frontier_del(&mut self, hash: &BlockHash) -> Result<(), StoreError>;

    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;
}
