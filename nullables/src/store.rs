//! Thread-safe in-memory store for tests.
//!
//! Committed state is an immutable snapshot behind an `Arc`. Readers clone
//! the `Arc`; the single writer works on a private copy and swaps it in on
//! commit, so an uncommitted or dropped write transaction leaves no trace.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use lattice_blocks::SavedBlock;
use lattice_store::{
    AccountInfo, ConfirmationHeightInfo, PendingInfo, PendingKey, ReadTxn, Store, StoreError,
    WriteTxn,
};
use lattice_types::{Account, Amount, BlockHash};

#[derive(Clone, Debug, Default)]
struct Tables {
    blocks: HashMap<BlockHash, SavedBlock>,
    accounts: BTreeMap<Account, AccountInfo>,
    pending: BTreeMap<PendingKey, PendingInfo>,
    confirmation_height: HashMap<Account, ConfirmationHeightInfo>,
    representation: BTreeMap<Account, Amount>,
    frontiers: HashMap<BlockHash, Account>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("null store lock poisoned".into())
}

impl Tables {
    fn block_get(&self, hash: &BlockHash) -> Option<SavedBlock> {
        self.blocks.get(hash).cloned()
    }

    fn pending_range(&self, account: &Account) -> Vec<(PendingKey, PendingInfo)> {
        let start = PendingKey::new(*account, BlockHash::ZERO);
        let end = PendingKey::new(*account, BlockHash::new([0xff; 32]));
        self.pending
            .range(start..=end)
            .map(|(k, v)| (*k, *v))
            .collect()
    }
}

/// An in-memory store for testing.
#[derive(Debug, Default)]
pub struct NullStore {
    committed: RwLock<Arc<Tables>>,
    writer: Mutex<()>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<Arc<Tables>, StoreError> {
        Ok(Arc::clone(&*self.committed.read().map_err(poisoned)?))
    }
}

impl Store for NullStore {
    type Read<'a> = NullReadTxn;
    type Write<'a> = NullWriteTxn<'a>;

    fn begin_read(&self) -> Result<NullReadTxn, StoreError> {
        Ok(NullReadTxn {
            tables: self.snapshot()?,
        })
    }

    fn begin_write(&self) -> Result<NullWriteTxn<'_>, StoreError> {
        let guard = self.writer.lock().map_err(poisoned)?;
        let tables = (*self.snapshot()?).clone();
        Ok(NullWriteTxn {
            store: self,
            _guard: guard,
            tables,
        })
    }
}

/// Read snapshot of the committed tables.
pub struct NullReadTxn {
    tables: Arc<Tables>,
}

/// Exclusive write transaction over a private copy of the tables.
pub struct NullWriteTxn<'a> {
    store: &'a NullStore,
    _guard: MutexGuard<'a, ()>,
    tables: Tables,
}

macro_rules! impl_read_txn {
    ($ty:ty) => {
        impl ReadTxn for $ty {
            fn block_get(&self, hash: &BlockHash) -> Result<Option<SavedBlock>, StoreError> {
                Ok(self.tables.block_get(hash))
            }

            fn block_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
                Ok(self.tables.blocks.contains_key(hash))
            }

            fn block_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables.blocks.len() as u64)
            }

            fn account_get(&self, account: &Account) -> Result<Option<AccountInfo>, StoreError> {
                Ok(self.tables.accounts.get(account).cloned())
            }

            fn account_count(&self) -> Result<u64, StoreError> {
                Ok(self.tables.accounts.len() as u64)
            }

            fn account_iter(&self) -> Result<Vec<(Account, AccountInfo)>, StoreError> {
                Ok(self
                    .tables
                    .accounts
                    .iter()
                    .map(|(a, i)| (*a, i.clone()))
                    .collect())
            }

            fn pending_get(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError> {
                Ok(self.tables.pending.get(key).copied())
            }

            fn pending_range(
                &self,
                account: &Account,
            ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
                Ok(self.tables.pending_range(account))
            }

            fn confirmation_height_get(
                &self,
                account: &Account,
            ) -> Result<Option<ConfirmationHeightInfo>, StoreError> {
                Ok(self.tables.confirmation_height.get(account).copied())
            }

            fn representation_get(&self, representative: &Account) -> Result<Amount, StoreError> {
                Ok(self
                    .tables
                    .representation
                    .get(representative)
                    .copied()
                    .unwrap_or_default())
            }

            fn representation_iter(&self) -> Result<Vec<(Account, Amount)>, StoreError> {
                Ok(self
                    .tables
                    .representation
                    .iter()
                    .map(|(a, w)| (*a, *w))
                    .collect())
            }

            fn frontier_get(&self, hash: &BlockHash) -> Result<Option<Account>, StoreError> {
                Ok(self.tables.frontiers.get(hash).copied())
            }
        }
    };
}

impl_read_txn!(NullReadTxn);
impl_read_txn!(NullWriteTxn<'_>);

impl WriteTxn for NullWriteTxn<'_> {
    fn block_put(&mut self, block: &SavedBlock) -> Result<(), StoreError> {
        self.tables.blocks.insert(block.hash(), block.clone());
        Ok(())
    }

    fn block_del(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.tables.blocks.remove(hash);
        Ok(())
    }

    fn block_successor_set(
        &mut self,
        hash: &BlockHash,
        successor: &BlockHash,
    ) -> Result<(), StoreError> {
        let block = self
            .tables
            .blocks
            .get_mut(hash)
            .ok_or_else(|| StoreError::NotFound(format!("block {hash}")))?;
        block.sideband.successor = *successor;
        Ok(())
    }

    fn account_put(&mut self, account: &Account, info: &AccountInfo) -> Result<(), StoreError> {
        self.tables.accounts.insert(*account, info.clone());
        Ok(())
    }

    fn account_del(&mut self, account: &Account) -> Result<(), StoreError> {
        self.tables.accounts.remove(account);
        Ok(())
    }

    fn pending_put(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError> {
        self.tables.pending.insert(*key, *info);
        Ok(())
    }

    fn pending_del(&mut self, key: &PendingKey) -> Result<(), StoreError> {
        self.tables.pending.remove(key);
        Ok(())
    }

    fn confirmation_height_put(
        &mut self,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) -> Result<(), StoreError> {
        self.tables.confirmation_height.insert(*account, *info);
        Ok(())
    }

    fn confirmation_height_del(&mut self, account: &Account) -> Result<(), StoreError> {
        self.tables.confirmation_height.remove(account);
        Ok(())
    }

    fn representation_put(
        &mut self,
        representative: &Account,
        weight: Amount,
    ) -> Result<(), StoreError> {
        if weight.is_zero() {
            self.tables.representation.remove(representative);
        } else {
            self.tables.representation.insert(*representative, weight);
        }
        Ok(())
    }

    fn frontier_put(&mut self, hash: &BlockHash, account: &Account) -> Result<(), StoreError> {
        self.tables.frontiers.insert(*hash, *account);
        Ok(())
    }

    fn frontier_del(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.tables.frontiers.remove(hash);
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let mut committed = self.store.committed.write().map_err(poisoned)?;
        *committed = Arc::new(self.tables);
        Ok(())
    }
}
