//! Block admission.
//!
//! Every candidate block runs through a fixed sequence of checks
//! (duplicate, predecessor, position, signature, fork, semantics). The first
//! failing check decides the [`ProcessResult`] and nothing is written. Only
//! once every check has passed does the processor touch the transaction.

use std::fmt;

use lattice_blocks::{
    Block, BlockDetails, BlockSideband, ChangeBlock, OpenBlock, ReceiveBlock, SavedBlock,
    SendBlock, StateBlock,
};
use lattice_crypto::verify_by_account;
use lattice_store::{AccountInfo, PendingInfo, PendingKey, WriteTxn};
use lattice_types::{Account, Amount, BlockHash, Epoch, Signature};
use tracing::debug;

use crate::{Ledger, LedgerError, LedgerStat};

/// Outcome of processing one block. Returned, never raised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProcessResult {
    /// Admitted.
    Progress,
    /// Already in the ledger.
    Old,
    BadSignature,
    /// A send that would increase the balance.
    NegativeSpend,
    /// Another block already occupies this chain position.
    Fork,
    /// The pending entry does not exist or cannot be received by this block.
    Unreceivable,
    GapPrevious,
    GapSource,
    /// Epoch open for an account with nothing pending.
    GapEpochOpenPending,
    OpenedBurnAccount,
    BalanceMismatch,
    /// The block may not follow its predecessor.
    BlockPosition,
    RepresentativeMismatch,
}

impl ProcessResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Old => "old",
            Self::BadSignature => "bad_signature",
            Self::NegativeSpend => "negative_spend",
            Self::Fork => "fork",
            Self::Unreceivable => "unreceivable",
            Self::GapPrevious => "gap_previous",
            Self::GapSource => "gap_source",
            Self::GapEpochOpenPending => "gap_epoch_open_pending",
            Self::OpenedBurnAccount => "opened_burn_account",
            Self::BalanceMismatch => "balance_mismatch",
            Self::BlockPosition => "block_position",
            Self::RepresentativeMismatch => "representative_mismatch",
        }
    }
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller already knows about the block's signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SignatureVerification {
    #[default]
    Unknown,
    /// A previous check failed. The signature is verified again.
    Invalid,
    /// Verified against the account key.
    Valid,
    /// Verified against the epoch signer.
    ValidEpoch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessReturn {
    pub code: ProcessResult,
    pub verified: SignatureVerification,
    /// Balance of the chain before this block; zero for a first block.
    pub previous_balance: Amount,
    pub account: Account,
    /// Amount moved by the block; zero for changes and epoch upgrades.
    pub amount: Amount,
    /// Destination of a send, or the sender of a received entry.
    pub pending_account: Account,
    /// Set for state blocks.
    pub state_is_send: Option<bool>,
}

impl ProcessReturn {
    fn new(verified: SignatureVerification) -> Self {
        Self {
            code: ProcessResult::Progress,
            verified,
            previous_balance: Amount::ZERO,
            account: Account::ZERO,
            amount: Amount::ZERO,
            pending_account: Account::ZERO,
            state_is_send: None,
        }
    }
}

/// Runs one block through admission against a write transaction.
pub(crate) struct LedgerProcessor<'a, T: WriteTxn + ?Sized> {
    ledger: &'a Ledger,
    txn: &'a mut T,
    result: ProcessReturn,
}

impl<'a, T: WriteTxn + ?Sized> LedgerProcessor<'a, T> {
    pub(crate) fn new(
        ledger: &'a Ledger,
        txn: &'a mut T,
        verification: SignatureVerification,
    ) -> Self {
        Self {
            ledger,
            txn,
            result: ProcessReturn::new(verification),
        }
    }

    pub(crate) fn process(mut self, block: &Block) -> Result<ProcessReturn, LedgerError> {
        let hash = block.hash();
        let code = if self.txn.block_exists(&hash)? {
            ProcessResult::Old
        } else {
            match block {
                Block::Send(send) => self.send_block(block, send)?,
                Block::Receive(receive) => self.receive_block(block, receive)?,
                Block::Open(open) => self.open_block(block, open)?,
                Block::Change(change) => self.change_block(block, change)?,
                Block::State(state) => self.state_block(block, state)?,
            }
        };
        self.result.code = code;
        debug!(
            hash = %hash,
            block_type = %block.block_type(),
            account = %self.result.account,
            code = %code,
            "block processed"
        );
        Ok(self.result)
    }

    // ── Shared checks ───────────────────────────────────────────────────

    /// Verify against `signer` unless the caller already vouched for the
    /// account signature.
    fn verify(&mut self, hash: &BlockHash, signature: &Signature, signer: &Account) -> bool {
        if self.result.verified == SignatureVerification::Valid {
            return true;
        }
        let valid = verify_by_account(hash, signature, signer);
        self.result.verified = if valid {
            SignatureVerification::Valid
        } else {
            SignatureVerification::Invalid
        };
        valid
    }

    /// Checks shared by legacy send, receive and change: the predecessor is
    /// stored, may be followed by this block, and is its account's legacy
    /// head. Yields the owning account and its info.
    fn legacy_head(
        &mut self,
        block: &Block,
        signature: &Signature,
    ) -> Result<Result<(Account, AccountInfo), ProcessResult>, LedgerError> {
        let previous = block.previous();
        let Some(previous_block) = self.txn.block_get(&previous)? else {
            return Ok(Err(ProcessResult::GapPrevious));
        };
        if !block.valid_predecessor(previous_block.block.block_type()) {
            return Ok(Err(ProcessResult::BlockPosition));
        }
        let Some(account) = self.txn.frontier_get(&previous)? else {
            return Ok(Err(ProcessResult::Fork));
        };
        if !self.verify(&block.hash(), signature, &account) {
            return Ok(Err(ProcessResult::BadSignature));
        }
        let info = self
            .txn
            .account_get(&account)?
            .ok_or(LedgerError::AccountNotFound(account))?;
        Ok(Ok((account, info)))
    }

    fn sideband(
        &self,
        account: Account,
        balance: Amount,
        height: u64,
        details: BlockDetails,
        source_epoch: Epoch,
    ) -> BlockSideband {
        BlockSideband {
            successor: BlockHash::ZERO,
            account,
            balance,
            height,
            timestamp: self.ledger.clock.now(),
            details,
            source_epoch,
        }
    }

    /// Write the block and link it from its predecessor.
    fn store_block(&mut self, block: &Block, sideband: BlockSideband) -> Result<(), LedgerError> {
        let hash = block.hash();
        self.txn.block_put(&SavedBlock::new(block.clone(), sideband))?;
        let previous = block.previous();
        if !previous.is_zero() {
            self.txn.block_successor_set(&previous, &hash)?;
        }
        self.ledger.cache.inc_block_count();
        Ok(())
    }

    /// Move the legacy frontier entry from the predecessor to the new head.
    fn swap_frontier(
        &mut self,
        previous: &BlockHash,
        hash: &BlockHash,
        account: &Account,
    ) -> Result<(), LedgerError> {
        self.txn.frontier_del(previous)?;
        self.txn.frontier_put(hash, account)?;
        Ok(())
    }

    /// Consume a legacy receive's pending entry, which must exist and come
    /// from an epoch 0 send.
    fn legacy_pending(
        &mut self,
        account: Account,
        source: BlockHash,
    ) -> Result<Option<(PendingKey, PendingInfo)>, LedgerError> {
        let key = PendingKey::new(account, source);
        Ok(self
            .txn
            .pending_get(&key)?
            .filter(|pending| pending.epoch == Epoch::Epoch0)
            .map(|pending| (key, pending)))
    }

    // ── Legacy blocks ───────────────────────────────────────────────────

    fn send_block(&mut self, block: &Block, send: &SendBlock) -> Result<ProcessResult, LedgerError> {
        let (account, info) = match self.legacy_head(block, &send.signature)? {
            Ok(head) => head,
            Err(code) => return Ok(code),
        };
        self.result.previous_balance = info.balance;
        if send.balance() > info.balance {
            return Ok(ProcessResult::NegativeSpend);
        }

        let hash = send.hash();
        let amount = info.balance - send.balance();
        let height = info.block_count + 1;
        self.ledger.rep_weights.apply(
            self.txn,
            &info.representative,
            Amount::ZERO.wrapping_sub(amount),
        )?;
        let sideband = self.sideband(
            account,
            send.balance(),
            height,
            BlockDetails::new(Epoch::Epoch0, false, false, false),
            Epoch::Epoch0,
        );
        self.store_block(block, sideband)?;
        self.txn.account_put(
            &account,
            &AccountInfo {
                head: hash,
                balance: send.balance(),
                modified: sideband.timestamp,
                block_count: height,
                epoch: Epoch::Epoch0,
                ..info
            },
        )?;
        self.txn.pending_put(
            &PendingKey::new(send.destination(), hash),
            &PendingInfo::new(account, amount, Epoch::Epoch0),
        )?;
        self.swap_frontier(&send.previous(), &hash, &account)?;
        self.ledger.stats.increment(LedgerStat::Send);

        self.result.account = account;
        self.result.amount = amount;
        self.result.pending_account = send.destination();
        Ok(ProcessResult::Progress)
    }

    fn receive_block(
        &mut self,
        block: &Block,
        receive: &ReceiveBlock,
    ) -> Result<ProcessResult, LedgerError> {
        let (account, info) = match self.legacy_head(block, &receive.signature)? {
            Ok(head) => head,
            Err(code) => return Ok(code),
        };
        self.result.previous_balance = info.balance;
        if !self.txn.block_exists(&receive.source())? {
            return Ok(ProcessResult::GapSource);
        }
        let Some((key, pending)) = self.legacy_pending(account, receive.source())? else {
            return Ok(ProcessResult::Unreceivable);
        };

        let hash = receive.hash();
        let balance = info.balance.wrapping_add(pending.amount);
        let height = info.block_count + 1;
        self.txn.pending_del(&key)?;
        self.ledger
            .rep_weights
            .apply(self.txn, &info.representative, pending.amount)?;
        let sideband = self.sideband(
            account,
            balance,
            height,
            BlockDetails::new(Epoch::Epoch0, false, false, false),
            Epoch::Epoch0,
        );
        self.store_block(block, sideband)?;
        self.txn.account_put(
            &account,
            &AccountInfo {
                head: hash,
                balance,
                modified: sideband.timestamp,
                block_count: height,
                epoch: Epoch::Epoch0,
                ..info
            },
        )?;
        self.swap_frontier(&receive.previous(), &hash, &account)?;
        self.ledger.stats.increment(LedgerStat::Receive);

        self.result.account = account;
        self.result.amount = pending.amount;
        self.result.pending_account = pending.source;
        Ok(ProcessResult::Progress)
    }

    fn open_block(&mut self, block: &Block, open: &OpenBlock) -> Result<ProcessResult, LedgerError> {
        let account = open.account();
        if !self.txn.block_exists(&open.source())? {
            return Ok(ProcessResult::GapSource);
        }
        if !self.verify(&open.hash(), &open.signature, &account) {
            return Ok(ProcessResult::BadSignature);
        }
        if self.txn.account_get(&account)?.is_some() {
            return Ok(ProcessResult::Fork);
        }
        if account == self.ledger.constants.burn_account {
            return Ok(ProcessResult::OpenedBurnAccount);
        }
        let Some((key, pending)) = self.legacy_pending(account, open.source())? else {
            return Ok(ProcessResult::Unreceivable);
        };

        let hash = open.hash();
        self.txn.pending_del(&key)?;
        self.ledger
            .rep_weights
            .apply(self.txn, &open.representative(), pending.amount)?;
        let sideband = self.sideband(
            account,
            pending.amount,
            1,
            BlockDetails::new(Epoch::Epoch0, false, false, false),
            Epoch::Epoch0,
        );
        self.store_block(block, sideband)?;
        self.txn.account_put(
            &account,
            &AccountInfo {
                head: hash,
                representative: open.representative(),
                open_block: hash,
                balance: pending.amount,
                modified: sideband.timestamp,
                block_count: 1,
                epoch: Epoch::Epoch0,
            },
        )?;
        self.txn.frontier_put(&hash, &account)?;
        self.ledger.cache.inc_account_count();
        self.ledger.stats.increment(LedgerStat::Open);

        self.result.account = account;
        self.result.amount = pending.amount;
        self.result.pending_account = pending.source;
        Ok(ProcessResult::Progress)
    }

    fn change_block(
        &mut self,
        block: &Block,
        change: &ChangeBlock,
    ) -> Result<ProcessResult, LedgerError> {
        let (account, info) = match self.legacy_head(block, &change.signature)? {
            Ok(head) => head,
            Err(code) => return Ok(code),
        };
        self.result.previous_balance = info.balance;

        let hash = change.hash();
        let height = info.block_count + 1;
        self.ledger.rep_weights.apply_dual(
            self.txn,
            &info.representative,
            Amount::ZERO.wrapping_sub(info.balance),
            &change.representative(),
            info.balance,
        )?;
        let sideband = self.sideband(
            account,
            info.balance,
            height,
            BlockDetails::new(Epoch::Epoch0, false, false, false),
            Epoch::Epoch0,
        );
        self.store_block(block, sideband)?;
        self.txn.account_put(
            &account,
            &AccountInfo {
                head: hash,
                representative: change.representative(),
                modified: sideband.timestamp,
                block_count: height,
                epoch: Epoch::Epoch0,
                ..info
            },
        )?;
        self.swap_frontier(&change.previous(), &hash, &account)?;
        self.ledger.stats.increment(LedgerStat::Change);

        self.result.account = account;
        Ok(ProcessResult::Progress)
    }

    // ── State blocks ────────────────────────────────────────────────────

    fn state_block(
        &mut self,
        block: &Block,
        state: &StateBlock,
    ) -> Result<ProcessResult, LedgerError> {
        let previous = state.previous();
        let previous_balance = if previous.is_zero() {
            Amount::ZERO
        } else {
            match self.txn.block_get(&previous)? {
                Some(previous_block) => previous_block.balance(),
                None => return Ok(ProcessResult::GapPrevious),
            }
        };
        self.result.previous_balance = previous_balance;

        match self.epoch_upgrade(state) {
            Some(epoch) => self.epoch_block(block, state, epoch),
            None => self.regular_state_block(block, state),
        }
    }

    /// The epoch a state block upgrades to, when its link is an epoch link
    /// and it is signed by that epoch's signer. Balance and representative
    /// are checked afterwards by `epoch_block`, so a malformed upgrade is
    /// rejected as an epoch block rather than as a bad account signature.
    ///
    /// Classification happens before the account signature is checked. A
    /// block that fails the epoch signer falls through to the regular path
    /// and is verified a second time, against the account.
    fn epoch_upgrade(&mut self, state: &StateBlock) -> Option<Epoch> {
        let epochs = &self.ledger.constants.epochs;
        let epoch = epochs.epoch(&state.link())?;
        match self.result.verified {
            SignatureVerification::ValidEpoch => Some(epoch),
            SignatureVerification::Valid => None,
            SignatureVerification::Unknown | SignatureVerification::Invalid => {
                let signer = epochs.signer(epoch)?;
                if verify_by_account(&state.hash(), &state.signature, &signer) {
                    self.result.verified = SignatureVerification::ValidEpoch;
                    Some(epoch)
                } else {
                    None
                }
            }
        }
    }

    fn regular_state_block(
        &mut self,
        block: &Block,
        state: &StateBlock,
    ) -> Result<ProcessResult, LedgerError> {
        let account = state.account();
        let previous = state.previous();
        let link = state.link();
        if !self.verify(&state.hash(), &state.signature, &account) {
            return Ok(ProcessResult::BadSignature);
        }
        if account == self.ledger.constants.burn_account {
            return Ok(ProcessResult::OpenedBurnAccount);
        }

        let existing = self.txn.account_get(&account)?;
        let (is_send, is_receive) = match &existing {
            Some(info) => {
                if previous.is_zero() || info.head != previous {
                    return Ok(ProcessResult::Fork);
                }
                let is_send = state.balance() < info.balance;
                (is_send, !is_send && !link.is_zero())
            }
            None => {
                if !previous.is_zero() {
                    return Ok(ProcessResult::GapPrevious);
                }
                if link.is_zero() {
                    return Ok(ProcessResult::GapSource);
                }
                (false, true)
            }
        };

        let old_balance = existing.as_ref().map(|i| i.balance).unwrap_or_default();
        let amount = if is_send {
            old_balance - state.balance()
        } else {
            state.balance().wrapping_sub(old_balance)
        };
        let mut epoch = existing.as_ref().map(|i| i.epoch).unwrap_or_default();
        let mut source_epoch = Epoch::Epoch0;
        let mut received = None;

        if is_receive {
            let source = link.as_block_hash();
            if !self.txn.block_exists(&source)? {
                return Ok(ProcessResult::GapSource);
            }
            let key = PendingKey::new(account, source);
            let Some(pending) = self.txn.pending_get(&key)? else {
                return Ok(ProcessResult::Unreceivable);
            };
            if amount != pending.amount {
                return Ok(ProcessResult::BalanceMismatch);
            }
            epoch = epoch.max(pending.epoch);
            source_epoch = pending.epoch;
            received = Some((key, pending));
        } else if link.is_zero() && !amount.is_zero() {
            return Ok(ProcessResult::BalanceMismatch);
        }

        let hash = state.hash();
        let height = existing.as_ref().map(|i| i.block_count).unwrap_or(0) + 1;
        let sideband = self.sideband(
            account,
            state.balance(),
            height,
            BlockDetails::new(epoch, is_send, is_receive, false),
            source_epoch,
        );
        self.store_block(block, sideband)?;

        match &existing {
            Some(info) => self.ledger.rep_weights.apply_dual(
                self.txn,
                &info.representative,
                Amount::ZERO.wrapping_sub(info.balance),
                &state.representative(),
                state.balance(),
            )?,
            None => self
                .ledger
                .rep_weights
                .apply(self.txn, &state.representative(), state.balance())?,
        }

        if is_send {
            self.txn.pending_put(
                &PendingKey::new(link.as_account(), hash),
                &PendingInfo::new(account, amount, epoch),
            )?;
            self.result.pending_account = link.as_account();
        } else if let Some((key, pending)) = received {
            self.txn.pending_del(&key)?;
            self.result.pending_account = pending.source;
        }

        self.txn.account_put(
            &account,
            &AccountInfo {
                head: hash,
                representative: state.representative(),
                open_block: existing.as_ref().map(|i| i.open_block).unwrap_or(hash),
                balance: state.balance(),
                modified: sideband.timestamp,
                block_count: height,
                epoch,
            },
        )?;
        self.retire_legacy_head(existing.as_ref())?;
        self.ledger.stats.increment(LedgerStat::StateBlock);

        self.result.account = account;
        self.result.amount = amount;
        self.result.state_is_send = Some(is_send);
        Ok(ProcessResult::Progress)
    }

    fn epoch_block(
        &mut self,
        block: &Block,
        state: &StateBlock,
        epoch: Epoch,
    ) -> Result<ProcessResult, LedgerError> {
        let account = state.account();
        let previous = state.previous();
        if account == self.ledger.constants.burn_account {
            return Ok(ProcessResult::OpenedBurnAccount);
        }

        let existing = self.txn.account_get(&account)?;
        match &existing {
            Some(info) => {
                if previous.is_zero() || info.head != previous {
                    return Ok(ProcessResult::Fork);
                }
                if state.representative() != info.representative {
                    return Ok(ProcessResult::RepresentativeMismatch);
                }
                if !Epoch::is_sequential(info.epoch, epoch) {
                    return Ok(ProcessResult::BlockPosition);
                }
            }
            None => {
                if !previous.is_zero() {
                    return Ok(ProcessResult::GapPrevious);
                }
                if !state.representative().is_zero() {
                    return Ok(ProcessResult::RepresentativeMismatch);
                }
                if !Epoch::is_sequential(Epoch::Epoch0, epoch) {
                    return Ok(ProcessResult::BlockPosition);
                }
                if !self.txn.pending_any(&account)? {
                    return Ok(ProcessResult::GapEpochOpenPending);
                }
            }
        }
        let old_balance = existing.as_ref().map(|i| i.balance).unwrap_or_default();
        if state.balance() != old_balance {
            return Ok(ProcessResult::BalanceMismatch);
        }

        let hash = state.hash();
        let height = existing.as_ref().map(|i| i.block_count).unwrap_or(0) + 1;
        let sideband = self.sideband(
            account,
            state.balance(),
            height,
            BlockDetails::new(epoch, false, false, true),
            Epoch::Epoch0,
        );
        self.store_block(block, sideband)?;
        self.txn.account_put(
            &account,
            &AccountInfo {
                head: hash,
                representative: state.representative(),
                open_block: existing.as_ref().map(|i| i.open_block).unwrap_or(hash),
                balance: state.balance(),
                modified: sideband.timestamp,
                block_count: height,
                epoch,
            },
        )?;
        self.retire_legacy_head(existing.as_ref())?;
        self.ledger.stats.increment(LedgerStat::EpochBlock);

        self.result.account = account;
        self.result.state_is_send = Some(false);
        Ok(ProcessResult::Progress)
    }

    /// A state block on top of a legacy head ends the account's legacy chain.
    /// A brand new account bumps the account count instead.
    fn retire_legacy_head(&mut self, existing: Option<&AccountInfo>) -> Result<(), LedgerError> {
        match existing {
            Some(info) => {
                if self.txn.frontier_get(&info.head)?.is_some() {
                    self.txn.frontier_del(&info.head)?;
                }
            }
            None => self.ledger.cache.inc_account_count(),
        }
        Ok(())
    }
}
