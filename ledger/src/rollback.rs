//! Rollback: remove blocks from the top of an account chain, undoing every
//! side effect admission applied.
//!
//! Rolling back a send whose funds were already received first rolls back the
//! receiving account. The walk keeps an explicit stack of blocks still to be
//! removed so arbitrarily long dependency chains never grow the call stack.

use lattice_blocks::{Block, SavedBlock};
use lattice_store::{AccountInfo, PendingInfo, PendingKey, WriteTxn};
use lattice_types::{Account, Amount, BlockHash, Epoch};
use tracing::{trace, warn};

use crate::{Ledger, LedgerError, LedgerStat};

/// Result of trying to remove an account's head block.
enum Undo {
    Removed,
    /// A send's funds were received; this block must go first.
    Blocked(BlockHash),
}

impl Ledger {
    /// Roll back `hash` and every block built on it, returning the removed
    /// blocks in removal order.
    ///
    /// On `RollbackBelowConfirmation` the blocks already removed stay removed
    /// in `txn`; the caller decides whether to commit.
    pub fn rollback<T: WriteTxn + ?Sized>(
        &self,
        txn: &mut T,
        hash: &BlockHash,
    ) -> Result<Vec<SavedBlock>, LedgerError> {
        if !txn.block_exists(hash)? {
            return Err(LedgerError::BlockNotFound(*hash));
        }

        let mut removed = Vec::new();
        let mut stack = vec![*hash];
        while let Some(&target) = stack.last() {
            let Some(target_block) = txn.block_get(&target)? else {
                stack.pop();
                continue;
            };
            let account = target_block.account();
            let confirmed = self.confirmed_height(&*txn, &account)?;
            if target_block.height() <= confirmed {
                warn!(
                    account = %account,
                    hash = %target,
                    height = target_block.height(),
                    confirmed,
                    "rollback refused below confirmation height"
                );
                return Err(LedgerError::RollbackBelowConfirmation {
                    account,
                    height: target_block.height(),
                    confirmed,
                });
            }

            let info = txn
                .account_get(&account)?
                .ok_or(LedgerError::AccountNotFound(account))?;
            let head = txn
                .block_get(&info.head)?
                .ok_or(LedgerError::BlockNotFound(info.head))?;
            match self.undo_head(txn, &head, info)? {
                Undo::Removed => {
                    trace!(hash = %head.hash(), account = %account, "block rolled back");
                    self.cache.dec_block_count();
                    self.stats.increment(LedgerStat::Rollback);
                    removed.push(head);
                }
                Undo::Blocked(dependent) => stack.push(dependent),
            }
        }
        Ok(removed)
    }

    fn undo_head<T: WriteTxn + ?Sized>(
        &self,
        txn: &mut T,
        head: &SavedBlock,
        info: AccountInfo,
    ) -> Result<Undo, LedgerError> {
        let account = head.account();
        let hash = head.hash();
        let previous = head.block.previous();

        match &head.block {
            Block::Send(send) => {
                let key = PendingKey::new(send.destination(), hash);
                let Some(pending) = txn.pending_get(&key)? else {
                    return Ok(Undo::Blocked(self.head_of(&*txn, &send.destination())?));
                };
                txn.pending_del(&key)?;
                self.rep_weights
                    .apply(txn, &info.representative, pending.amount)?;
                self.restore_legacy_predecessor(txn, account, info, previous, None)?;
            }
            Block::Receive(receive) => {
                let amount = self.restore_source(txn, account, receive.source(), &info, previous)?;
                self.rep_weights.apply(
                    txn,
                    &info.representative,
                    Amount::ZERO.wrapping_sub(amount),
                )?;
                self.restore_legacy_predecessor(txn, account, info, previous, None)?;
            }
            Block::Open(open) => {
                let amount = info.balance;
                let source_account = self.account_of(&*txn, &open.source())?;
                txn.pending_put(
                    &PendingKey::new(account, open.source()),
                    &PendingInfo::new(source_account, amount, Epoch::Epoch0),
                )?;
                self.rep_weights.apply(
                    txn,
                    &info.representative,
                    Amount::ZERO.wrapping_sub(amount),
                )?;
                txn.account_del(&account)?;
                self.cache.dec_account_count();
            }
            Block::Change(_) => {
                let representative = self.representative_at(&*txn, &previous)?;
                self.rep_weights.apply_dual(
                    txn,
                    &info.representative,
                    Amount::ZERO.wrapping_sub(info.balance),
                    &representative,
                    info.balance,
                )?;
                self.restore_legacy_predecessor(
                    txn,
                    account,
                    info,
                    previous,
                    Some(representative),
                )?;
            }
            Block::State(state) => {
                let link = state.link();
                if head.is_send() {
                    let key = PendingKey::new(link.as_account(), hash);
                    if !txn.pending_exists(&key)? {
                        return Ok(Undo::Blocked(self.head_of(&*txn, &link.as_account())?));
                    }
                    txn.pending_del(&key)?;
                }

                let predecessor = if previous.is_zero() {
                    None
                } else {
                    Some(
                        txn.block_get(&previous)?
                            .ok_or(LedgerError::BlockNotFound(previous))?,
                    )
                };
                let previous_balance = predecessor
                    .as_ref()
                    .map(|p| p.balance())
                    .unwrap_or_default();
                let previous_representative = match &predecessor {
                    Some(_) => self.representative_at(&*txn, &previous)?,
                    None => Account::ZERO,
                };

                match &predecessor {
                    Some(_) => self.rep_weights.apply_dual(
                        txn,
                        &state.representative(),
                        Amount::ZERO.wrapping_sub(state.balance()),
                        &previous_representative,
                        previous_balance,
                    )?,
                    None => self.rep_weights.apply(
                        txn,
                        &state.representative(),
                        Amount::ZERO.wrapping_sub(state.balance()),
                    )?,
                }

                if head.is_receive() {
                    let source = link.as_block_hash();
                    let source_account = self.account_of(&*txn, &source)?;
                    txn.pending_put(
                        &PendingKey::new(account, source),
                        &PendingInfo::new(
                            source_account,
                            state.balance().wrapping_sub(previous_balance),
                            head.sideband.source_epoch,
                        ),
                    )?;
                }

                match predecessor {
                    Some(predecessor) => {
                        txn.account_put(
                            &account,
                            &AccountInfo {
                                head: previous,
                                representative: previous_representative,
                                balance: previous_balance,
                                modified: predecessor.timestamp(),
                                block_count: info.block_count - 1,
                                epoch: predecessor.epoch(),
                                ..info
                            },
                        )?;
                        if predecessor.block.is_legacy() {
                            txn.frontier_put(&previous, &account)?;
                        }
                        txn.block_successor_clear(&previous)?;
                    }
                    None => {
                        txn.account_del(&account)?;
                        self.cache.dec_account_count();
                    }
                }
            }
        }

        txn.block_del(&hash)?;
        txn.frontier_del(&hash)?;
        Ok(Undo::Removed)
    }

    /// Point a legacy chain back at `previous`, which becomes the legacy head.
    fn restore_legacy_predecessor<T: WriteTxn + ?Sized>(
        &self,
        txn: &mut T,
        account: Account,
        info: AccountInfo,
        previous: BlockHash,
        representative: Option<Account>,
    ) -> Result<(), LedgerError> {
        let predecessor = txn
            .block_get(&previous)?
            .ok_or(LedgerError::BlockNotFound(previous))?;
        txn.account_put(
            &account,
            &AccountInfo {
                head: previous,
                representative: representative.unwrap_or(info.representative),
                balance: predecessor.balance(),
                modified: predecessor.timestamp(),
                block_count: info.block_count - 1,
                epoch: Epoch::Epoch0,
                ..info
            },
        )?;
        txn.frontier_put(&previous, &account)?;
        txn.block_successor_clear(&previous)?;
        Ok(())
    }

    /// Recreate the pending entry a legacy receive consumed. Returns the
    /// received amount.
    fn restore_source<T: WriteTxn + ?Sized>(
        &self,
        txn: &mut T,
        account: Account,
        source: BlockHash,
        info: &AccountInfo,
        previous: BlockHash,
    ) -> Result<Amount, LedgerError> {
        let previous_balance = txn
            .block_get(&previous)?
            .ok_or(LedgerError::BlockNotFound(previous))?
            .balance();
        let amount = info.balance.wrapping_sub(previous_balance);
        let source_account = self.account_of(&*txn, &source)?;
        txn.pending_put(
            &PendingKey::new(account, source),
            &PendingInfo::new(source_account, amount, Epoch::Epoch0),
        )?;
        Ok(amount)
    }

    fn account_of<T: WriteTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Account, LedgerError> {
        self.account(txn, hash)?
            .ok_or(LedgerError::BlockNotFound(*hash))
    }

    fn head_of<T: WriteTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<BlockHash, LedgerError> {
        self.latest(txn, account)?
            .ok_or(LedgerError::AccountNotFound(*account))
    }

    fn representative_at<T: WriteTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Account, LedgerError> {
        self.representative(txn, hash)?
            .ok_or(LedgerError::BlockNotFound(*hash))
    }
}
