//! The ledger: genesis initialisation, block admission, rollback entry point
//! and read-only queries over any transaction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use lattice_blocks::{Block, BlockDetails, BlockSideband, SavedBlock};
use lattice_store::{
    AccountInfo, ConfirmationHeightInfo, PendingInfo, PendingKey, ReadTxn, Store, WriteTxn,
};
use lattice_types::{
    Account, Amount, BlockHash, Clock, Epoch, Link, QualifiedRoot, Root, SystemClock,
};
use tracing::info;

use crate::processor::LedgerProcessor;
use crate::stats::LedgerStats;
use crate::{
    LedgerCache, LedgerConfig, LedgerConstants, LedgerError, ProcessReturn, RepWeights,
    SignatureVerification,
};

/// Block-lattice ledger over a [`Store`].
///
/// The ledger holds no transaction itself: every mutation runs inside a
/// write transaction the caller opens, and every query reads through a
/// transaction the caller supplies. Representative weights and counters are
/// kept in memory alongside.
pub struct Ledger {
    pub(crate) constants: LedgerConstants,
    pub(crate) rep_weights: RepWeights,
    pub(crate) cache: LedgerCache,
    pub(crate) stats: LedgerStats,
    pub(crate) clock: Arc<dyn Clock>,
    bootstrap_weights: HashMap<Account, Amount>,
    bootstrap_weight_max_blocks: u64,
    check_bootstrap_weights: AtomicBool,
}

impl Ledger {
    pub fn new<S: Store>(
        store: &S,
        constants: LedgerConstants,
        config: &LedgerConfig,
    ) -> Result<Self, LedgerError> {
        Self::with_clock(store, constants, config, Arc::new(SystemClock))
    }

    /// Open the ledger, inserting the genesis block into an empty store and
    /// loading weights and counters from storage.
    pub fn with_clock<S: Store>(
        store: &S,
        constants: LedgerConstants,
        config: &LedgerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let ledger = Self {
            constants,
            rep_weights: RepWeights::new(),
            cache: LedgerCache::default(),
            stats: LedgerStats::new(),
            clock,
            bootstrap_weights: config.parse_bootstrap_weights()?,
            bootstrap_weight_max_blocks: config.bootstrap_weight_max_blocks,
            check_bootstrap_weights: AtomicBool::new(true),
        };

        let mut txn = store.begin_write()?;
        if txn.account_count()? == 0 {
            ledger.insert_genesis(&mut txn)?;
            txn.commit()?;
        } else {
            drop(txn);
        }

        let txn = store.begin_read()?;
        ledger.reload(&txn)?;
        Ok(ledger)
    }

    fn insert_genesis<T: WriteTxn + ?Sized>(&self, txn: &mut T) -> Result<(), LedgerError> {
        let genesis = &self.constants.genesis;
        let hash = genesis.hash();
        let account = self.constants.genesis_account;
        let amount = self.constants.genesis_amount;
        let now = self.clock.now();

        txn.block_put(&SavedBlock::new(
            genesis.clone(),
            BlockSideband {
                successor: BlockHash::ZERO,
                account,
                balance: amount,
                height: 1,
                timestamp: now,
                details: BlockDetails::new(Epoch::Epoch0, false, false, false),
                source_epoch: Epoch::Epoch0,
            },
        ))?;
        txn.account_put(
            &account,
            &AccountInfo {
                head: hash,
                representative: account,
                open_block: hash,
                balance: amount,
                modified: now,
                block_count: 1,
                epoch: Epoch::Epoch0,
            },
        )?;
        txn.confirmation_height_put(&account, &ConfirmationHeightInfo::new(1, hash))?;
        txn.frontier_put(&hash, &account)?;
        txn.representation_put(&account, amount)?;
        info!(hash = %hash, account = %account, "genesis block inserted");
        Ok(())
    }

    /// Rebuild representative weights and counters from storage.
    ///
    /// Call after aborting a write transaction that processed or rolled back
    /// blocks, so the in-memory state matches what was committed.
    pub fn reload<T: ReadTxn + ?Sized>(&self, txn: &T) -> Result<(), LedgerError> {
        let accounts = txn.account_iter()?;
        self.rep_weights.rebuild(
            accounts
                .iter()
                .map(|(_, info)| (info.representative, info.balance)),
        );
        let mut cemented = 0;
        for (account, _) in &accounts {
            cemented += self.confirmed_height(txn, account)?;
        }
        self.cache
            .reset(txn.block_count()?, accounts.len() as u64, cemented);
        info!(
            blocks = self.cache.block_count(),
            accounts = self.cache.account_count(),
            cemented,
            representatives = self.rep_weights.rep_count(),
            "ledger state loaded"
        );
        Ok(())
    }

    /// Admit `block` if every check passes. Storage failures are returned as
    /// `Err`; the caller should then abort `txn`.
    pub fn process<T: WriteTxn + ?Sized>(
        &self,
        txn: &mut T,
        block: &Block,
        verification: SignatureVerification,
    ) -> Result<ProcessReturn, LedgerError> {
        LedgerProcessor::new(self, txn, verification).process(block)
    }

    /// Raise the confirmation height of the block's account to the block's
    /// height. Returns the number of newly cemented blocks.
    pub fn confirm<T: WriteTxn + ?Sized>(
        &self,
        txn: &mut T,
        hash: &BlockHash,
    ) -> Result<u64, LedgerError> {
        let block = txn
            .block_get(hash)?
            .ok_or(LedgerError::BlockNotFound(*hash))?;
        let account = block.account();
        let confirmed = self.confirmed_height(&*txn, &account)?;
        if block.height() <= confirmed {
            return Ok(0);
        }
        txn.confirmation_height_put(
            &account,
            &ConfirmationHeightInfo::new(block.height(), *hash),
        )?;
        let cemented = block.height() - confirmed;
        self.cache.add_cemented_count(cemented);
        Ok(cemented)
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn constants(&self) -> &LedgerConstants {
        &self.constants
    }

    pub fn cache(&self) -> &LedgerCache {
        &self.cache
    }

    pub fn rep_weights(&self) -> &RepWeights {
        &self.rep_weights
    }

    pub fn stats(&self) -> &LedgerStats {
        &self.stats
    }

    pub fn block_count(&self) -> u64 {
        self.cache.block_count()
    }

    pub fn account_count(&self) -> u64 {
        self.cache.account_count()
    }

    pub fn cemented_count(&self) -> u64 {
        self.cache.cemented_count()
    }

    // ── Block queries ───────────────────────────────────────────────────

    pub fn block_exists<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<bool, LedgerError> {
        Ok(txn.block_exists(hash)?)
    }

    pub fn get_block<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<SavedBlock>, LedgerError> {
        Ok(txn.block_get(hash)?)
    }

    /// Chain balance after the block.
    pub fn balance<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Amount>, LedgerError> {
        Ok(txn.block_get(hash)?.map(|b| b.balance()))
    }

    /// Amount moved by the block: the difference between its balance and its
    /// predecessor's. A first block moves its whole balance.
    pub fn amount<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Amount>, LedgerError> {
        let Some(block) = txn.block_get(hash)? else {
            return Ok(None);
        };
        let previous = block.block.previous();
        if previous.is_zero() {
            return Ok(Some(block.balance()));
        }
        Ok(txn.block_get(&previous)?.map(|p| {
            let (high, low) = if p.balance() > block.balance() {
                (p.balance(), block.balance())
            } else {
                (block.balance(), p.balance())
            };
            high - low
        }))
    }

    pub fn account<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(txn.block_get(hash)?.map(|b| b.account()))
    }

    pub fn height<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<u64>, LedgerError> {
        Ok(txn.block_get(hash)?.map(|b| b.height()))
    }

    /// Hash of the nearest block at or before `hash` that names a
    /// representative.
    pub fn representative_block<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<BlockHash>, LedgerError> {
        let mut current = *hash;
        loop {
            let Some(block) = txn.block_get(&current)? else {
                return Ok(None);
            };
            if block.block.representative_field().is_some() {
                return Ok(Some(current));
            }
            current = block.block.previous();
        }
    }

    /// Representative in effect after the block.
    pub fn representative<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<Option<Account>, LedgerError> {
        let Some(rep_block) = self.representative_block(txn, hash)? else {
            return Ok(None);
        };
        Ok(txn
            .block_get(&rep_block)?
            .and_then(|b| b.block.representative_field()))
    }

    /// Whether the block's height is at or below its account's confirmation
    /// height.
    pub fn block_confirmed<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        hash: &BlockHash,
    ) -> Result<bool, LedgerError> {
        let Some(block) = txn.block_get(hash)? else {
            return Ok(false);
        };
        Ok(block.height() <= self.confirmed_height(txn, &block.account())?)
    }

    /// The block occupying `root`'s slot: the account's open block for a
    /// first-block root, otherwise the successor of `root.previous`.
    pub fn successor<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        root: &QualifiedRoot,
    ) -> Result<Option<SavedBlock>, LedgerError> {
        let hash = if root.previous.is_zero() {
            txn.account_get(&root.root.as_account())?
                .map(|info| info.open_block)
        } else {
            txn.block_successor(&root.previous)?
        };
        match hash {
            Some(hash) => Ok(txn.block_get(&hash)?),
            None => Ok(None),
        }
    }

    /// The stored block competing with `candidate` for the same slot.
    pub fn forked_block<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        candidate: &Block,
    ) -> Result<Option<SavedBlock>, LedgerError> {
        let hash = candidate.hash();
        Ok(self
            .successor(txn, &candidate.qualified_root())?
            .filter(|existing| existing.hash() != hash))
    }

    /// Whether a state block moves funds out of its account.
    fn is_send<T: ReadTxn + ?Sized>(&self, txn: &T, block: &Block) -> Result<bool, LedgerError> {
        if let Some(saved) = txn.block_get(&block.hash())? {
            return Ok(saved.is_send());
        }
        let previous = block.previous();
        if previous.is_zero() {
            return Ok(false);
        }
        let (Some(balance), Some(previous_balance)) =
            (block.balance_field(), self.balance(txn, &previous)?)
        else {
            return Ok(false);
        };
        Ok(balance < previous_balance)
    }

    /// Hashes the block depends on: its predecessor and its source. Zero
    /// entries mean no dependency.
    pub fn dependent_blocks<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        block: &Block,
    ) -> Result<[BlockHash; 2], LedgerError> {
        let previous = block.previous();
        let source = match block {
            Block::Send(_) | Block::Change(_) => BlockHash::ZERO,
            Block::Receive(receive) => receive.source(),
            Block::Open(open) => {
                if block.hash() == self.constants.genesis_hash() {
                    BlockHash::ZERO
                } else {
                    open.source()
                }
            }
            Block::State(state) => {
                let link = state.link();
                if self.is_epoch_link(&link) || self.is_send(txn, block)? {
                    BlockHash::ZERO
                } else {
                    link.as_block_hash()
                }
            }
        };
        Ok([previous, source])
    }

    /// Whether every block `block` depends on is already stored.
    pub fn could_fit<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        block: &Block,
    ) -> Result<bool, LedgerError> {
        for hash in self.dependent_blocks(txn, block)? {
            if !hash.is_zero() && !txn.block_exists(&hash)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ── Account queries ─────────────────────────────────────────────────

    pub fn account_info<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Option<AccountInfo>, LedgerError> {
        Ok(txn.account_get(account)?)
    }

    pub fn account_balance<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Amount, LedgerError> {
        Ok(txn
            .account_get(account)?
            .map(|info| info.balance)
            .unwrap_or_default())
    }

    /// Sum of all pending entries addressed to `account`.
    pub fn account_receivable<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Amount, LedgerError> {
        Ok(txn
            .pending_range(account)?
            .into_iter()
            .fold(Amount::ZERO, |sum, (_, pending)| {
                sum.wrapping_add(pending.amount)
            }))
    }

    /// Alias of [`Ledger::account_receivable`].
    pub fn account_pending<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Amount, LedgerError> {
        self.account_receivable(txn, account)
    }

    pub fn receivable_any<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<bool, LedgerError> {
        Ok(txn.pending_any(account)?)
    }

    pub fn pending_info<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        key: &PendingKey,
    ) -> Result<Option<PendingInfo>, LedgerError> {
        Ok(txn.pending_get(key)?)
    }

    /// Head block of the account chain.
    pub fn latest<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Option<BlockHash>, LedgerError> {
        Ok(txn.account_get(account)?.map(|info| info.head))
    }

    /// Root the next block of `account` must build on: the head, or the
    /// account itself when unopened.
    pub fn latest_root<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<Root, LedgerError> {
        Ok(match txn.account_get(account)? {
            Some(info) => Root::from(info.head),
            None => Root::from(*account),
        })
    }

    pub fn confirmed_height<T: ReadTxn + ?Sized>(
        &self,
        txn: &T,
        account: &Account,
    ) -> Result<u64, LedgerError> {
        Ok(txn
            .confirmation_height_get(account)?
            .map(|info| info.height)
            .unwrap_or(0))
    }

    /// Voting weight of a representative. While the ledger is below the
    /// bootstrap threshold, configured weights take precedence.
    pub fn weight(&self, representative: &Account) -> Amount {
        if self.check_bootstrap_weights.load(Ordering::Relaxed) {
            if self.cache.block_count() < self.bootstrap_weight_max_blocks {
                if let Some(weight) = self.bootstrap_weights.get(representative) {
                    return *weight;
                }
            } else {
                self.check_bootstrap_weights.store(false, Ordering::Relaxed);
            }
        }
        self.rep_weights.representation_get(representative)
    }

    // ── Epochs ──────────────────────────────────────────────────────────

    pub fn is_epoch_link(&self, link: &Link) -> bool {
        self.constants.epochs.is_epoch_link(link)
    }

    /// Account allowed to sign the epoch upgrade marked by `link`.
    pub fn epoch_signer(&self, link: &Link) -> Option<Account> {
        let epoch = self.constants.epochs.epoch(link)?;
        self.constants.epochs.signer(epoch)
    }

    pub fn epoch_link(&self, epoch: Epoch) -> Option<Link> {
        self.constants.epochs.link(epoch)
    }
}
