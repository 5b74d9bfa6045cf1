//! Shared helpers for ledger integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use lattice_blocks::{Block, ChangeBlock, OpenBlock, ReceiveBlock, SavedBlock, SendBlock, StateBlock};
use lattice_crypto::keypair_from_seed;
use lattice_ledger::{
    genesis_key, Ledger, LedgerConfig, LedgerConstants, LedgerError, ProcessResult,
    ProcessReturn, SignatureVerification,
};
use lattice_nullables::{NullClock, NullStore};
use lattice_store::{Store, WriteTxn};
use lattice_store_lmdb::{LmdbConfig, LmdbStore};
use lattice_types::{Account, Amount, BlockHash, Epoch, KeyPair, Link, NetworkId};

pub const START_TIME: u64 = 1_700_000_000;

/// A ledger plus the store it runs on, with a controllable clock.
pub struct TestLedger<S: Store> {
    pub store: S,
    pub ledger: Ledger,
    pub clock: Arc<NullClock>,
    pub genesis: KeyPair,
    _dir: Option<tempfile::TempDir>,
}

impl TestLedger<NullStore> {
    pub fn new() -> Self {
        Self::with_config(&LedgerConfig::default())
    }

    pub fn with_config(config: &LedgerConfig) -> Self {
        Self::build(NullStore::new(), config, None)
    }
}

impl TestLedger<LmdbStore> {
    pub fn lmdb() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = LmdbStore::open(&LmdbConfig::with_path(dir.path())).expect("open lmdb");
        Self::build(store, &LedgerConfig::default(), Some(dir))
    }
}

impl<S: Store> TestLedger<S> {
    fn build(store: S, config: &LedgerConfig, dir: Option<tempfile::TempDir>) -> Self {
        config.init_logging();
        let genesis = genesis_key(NetworkId::Dev);
        let clock = Arc::new(NullClock::new(START_TIME));
        let ledger = Ledger::with_clock(
            &store,
            LedgerConstants::dev(&genesis),
            config,
            clock.clone(),
        )
        .expect("ledger init");
        Self {
            store,
            ledger,
            clock,
            genesis,
            _dir: dir,
        }
    }

    pub fn genesis_account(&self) -> Account {
        self.genesis.account()
    }

    pub fn genesis_hash(&self) -> BlockHash {
        self.ledger.constants().genesis_hash()
    }

    pub fn epoch_link(&self, epoch: Epoch) -> Link {
        self.ledger.epoch_link(epoch).expect("epoch configured")
    }

    /// Process in its own transaction, committing on `Progress`.
    pub fn process(&self, block: &Block) -> ProcessReturn {
        self.process_with(block, SignatureVerification::Unknown)
    }

    pub fn process_with(&self, block: &Block, verification: SignatureVerification) -> ProcessReturn {
        self.clock.advance(1);
        let mut txn = self.store.begin_write().expect("begin write");
        let result = self
            .ledger
            .process(&mut txn, block, verification)
            .expect("process");
        if result.code == ProcessResult::Progress {
            txn.commit().expect("commit");
        }
        result
    }

    /// Process and assert admission.
    pub fn admit(&self, block: &Block) -> ProcessReturn {
        let result = self.process(block);
        assert_eq!(result.code, ProcessResult::Progress, "block {}", block.hash());
        result
    }

    /// Roll back in its own transaction, committing on success.
    pub fn rollback(&self, hash: &BlockHash) -> Result<Vec<SavedBlock>, LedgerError> {
        let mut txn = self.store.begin_write().expect("begin write");
        let removed = self.ledger.rollback(&mut txn, hash)?;
        txn.commit().expect("commit");
        Ok(removed)
    }

    pub fn confirm(&self, hash: &BlockHash) -> u64 {
        let mut txn = self.store.begin_write().expect("begin write");
        let cemented = self.ledger.confirm(&mut txn, hash).expect("confirm");
        txn.commit().expect("commit");
        cemented
    }

    pub fn read(&self) -> S::Read<'_> {
        self.store.begin_read().expect("begin read")
    }

    pub fn head(&self, account: &Account) -> BlockHash {
        self.ledger
            .latest(&self.read(), account)
            .expect("latest")
            .expect("account exists")
    }

    pub fn balance_of(&self, account: &Account) -> Amount {
        self.ledger
            .account_balance(&self.read(), account)
            .expect("balance")
    }

    /// Legacy send of `amount` from the genesis head to `destination`.
    pub fn genesis_send(&self, destination: Account, amount: u128) -> Block {
        let head = self.head(&self.genesis_account());
        let balance = self.balance_of(&self.genesis_account());
        send(&self.genesis, head, destination, balance - Amount::raw(amount))
    }

    /// State send of `amount` from the genesis head to `destination`.
    pub fn genesis_state_send(&self, destination: Account, amount: u128) -> Block {
        let head = self.head(&self.genesis_account());
        let balance = self.balance_of(&self.genesis_account());
        state(
            &self.genesis,
            head,
            self.genesis_account(),
            balance - Amount::raw(amount),
            Link::from(destination),
        )
    }

    /// Fund a new legacy account with `amount` and return its key and open
    /// block hash.
    pub fn open_account(&self, seed: u8, amount: u128) -> (KeyPair, BlockHash) {
        let key = key(seed);
        let send = self.genesis_send(key.account(), amount);
        self.admit(&send);
        let open = open(&key, send.hash(), key.account());
        self.admit(&open);
        (key, open.hash())
    }
}

pub fn key(seed: u8) -> KeyPair {
    keypair_from_seed(&[seed; 32])
}

pub fn send(key: &KeyPair, previous: BlockHash, destination: Account, balance: Amount) -> Block {
    SendBlock::new(previous, destination, balance, &key.private, 0).into()
}

pub fn receive(key: &KeyPair, previous: BlockHash, source: BlockHash) -> Block {
    ReceiveBlock::new(previous, source, &key.private, 0).into()
}

pub fn open(key: &KeyPair, source: BlockHash, representative: Account) -> Block {
    OpenBlock::new(source, representative, key.account(), &key.private, 0).into()
}

pub fn change(key: &KeyPair, previous: BlockHash, representative: Account) -> Block {
    ChangeBlock::new(previous, representative, &key.private, 0).into()
}

/// State block for `key`'s own account, signed by that key.
pub fn state(
    key: &KeyPair,
    previous: BlockHash,
    representative: Account,
    balance: Amount,
    link: Link,
) -> Block {
    StateBlock::new(
        key.account(),
        previous,
        representative,
        balance,
        link,
        &key.private,
        0,
    )
    .into()
}

/// Epoch upgrade of `account`, signed by `signer`.
pub fn epoch_block(
    signer: &KeyPair,
    account: Account,
    previous: BlockHash,
    representative: Account,
    balance: Amount,
    link: Link,
) -> Block {
    StateBlock::new(
        account,
        previous,
        representative,
        balance,
        link,
        &signer.private,
        0,
    )
    .into()
}
