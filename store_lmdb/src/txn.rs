//! Read and write transactions implementing the storage contract.
//!
//! Key formats:
//! - blocks: `hash` (32) → `tag ++ block ++ sideband`
//! - accounts, confirmation_height: `account` (32) → bincode record
//! - pending: `account ++ send hash` (64) → bincode record, so one account's
//!   entries form a contiguous key range
//! - representation: `account` (32) → weight as 16 big-endian bytes
//! - frontiers: `hash` (32) → `account` (32)

use std::ops::Bound;

use heed::{RoTxn, RwTxn};

use lattice_blocks::SavedBlock;
use lattice_store::{
    decode_saved_block, AccountInfo, ConfirmationHeightInfo, PendingInfo, PendingKey, ReadTxn,
    StoreError, WriteTxn,
};
use lattice_types::{Account, Amount, BlockHash};

use crate::environment::Databases;
use crate::LmdbError;

pub struct LmdbReadTxn<'e> {
    txn: RoTxn<'e>,
    dbs: Databases,
}

impl<'e> LmdbReadTxn<'e> {
    pub(crate) fn new(txn: RoTxn<'e>, dbs: Databases) -> Self {
        Self { txn, dbs }
    }
}

pub struct LmdbWriteTxn<'e> {
    txn: RwTxn<'e>,
    dbs: Databases,
}

impl<'e> LmdbWriteTxn<'e> {
    pub(crate) fn new(txn: RwTxn<'e>, dbs: Databases) -> Self {
        Self { txn, dbs }
    }
}

fn decode_account(bytes: &[u8]) -> Result<Account, LmdbError> {
    Account::from_slice(bytes)
        .ok_or_else(|| LmdbError::Corruption(format!("account key of {} bytes", bytes.len())))
}

fn decode_weight(bytes: &[u8]) -> Result<Amount, LmdbError> {
    let arr: [u8; 16] = bytes
        .try_into()
        .map_err(|_| LmdbError::Corruption("invalid weight bytes length".into()))?;
    Ok(Amount::from_be_bytes(arr))
}

fn block_get(txn: &RoTxn, dbs: &Databases, hash: &BlockHash) -> Result<Option<SavedBlock>, StoreError> {
    match dbs.blocks.get(txn, hash.as_bytes()).map_err(LmdbError::from)? {
        Some(bytes) => Ok(Some(decode_saved_block(bytes)?)),
        None => Ok(None),
    }
}

fn block_exists(txn: &RoTxn, dbs: &Databases, hash: &BlockHash) -> Result<bool, StoreError> {
    Ok(dbs
        .blocks
        .get(txn, hash.as_bytes())
        .map_err(LmdbError::from)?
        .is_some())
}

fn account_get(
    txn: &RoTxn,
    dbs: &Databases,
    account: &Account,
) -> Result<Option<AccountInfo>, StoreError> {
    match dbs.accounts.get(txn, account.as_bytes()).map_err(LmdbError::from)? {
        Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
        None => Ok(None),
    }
}

fn account_iter(txn: &RoTxn, dbs: &Databases) -> Result<Vec<(Account, AccountInfo)>, StoreError> {
    let iter = dbs.accounts.iter(txn).map_err(LmdbError::from)?;
    let mut results = Vec::new();
    for entry in iter {
        let (key, val) = entry.map_err(LmdbError::from)?;
        let info: AccountInfo = bincode::deserialize(val).map_err(LmdbError::from)?;
        results.push((decode_account(key)?, info));
    }
    Ok(results)
}

fn pending_get(
    txn: &RoTxn,
    dbs: &Databases,
    key: &PendingKey,
) -> Result<Option<PendingInfo>, StoreError> {
    match dbs.pending.get(txn, &key.to_bytes()).map_err(LmdbError::from)? {
        Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
        None => Ok(None),
    }
}

fn pending_range(
    txn: &RoTxn,
    dbs: &Databases,
    account: &Account,
) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
    let lower = PendingKey::new(*account, BlockHash::ZERO).to_bytes();
    let upper = PendingKey::new(*account, BlockHash::new([0xff; 32])).to_bytes();
    let bounds = (
        Bound::Included(lower.as_slice()),
        Bound::Included(upper.as_slice()),
    );
    let iter = dbs.pending.range(txn, &bounds).map_err(LmdbError::from)?;
    let mut results = Vec::new();
    for entry in iter {
        let (key, val) = entry.map_err(LmdbError::from)?;
        let key = PendingKey::from_slice(key)
            .ok_or_else(|| LmdbError::Corruption("invalid pending key length".into()))?;
        let info: PendingInfo = bincode::deserialize(val).map_err(LmdbError::from)?;
        results.push((key, info));
    }
    Ok(results)
}

fn confirmation_height_get(
    txn: &RoTxn,
    dbs: &Databases,
    account: &Account,
) -> Result<Option<ConfirmationHeightInfo>, StoreError> {
    match dbs
        .confirmation_height
        .get(txn, account.as_bytes())
        .map_err(LmdbError::from)?
    {
        Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
        None => Ok(None),
    }
}

fn representation_get(
    txn: &RoTxn,
    dbs: &Databases,
    representative: &Account,
) -> Result<Amount, StoreError> {
    match dbs
        .representation
        .get(txn, representative.as_bytes())
        .map_err(LmdbError::from)?
    {
        Some(bytes) => Ok(decode_weight(bytes)?),
        None => Ok(Amount::ZERO),
    }
}

fn representation_iter(txn: &RoTxn, dbs: &Databases) -> Result<Vec<(Account, Amount)>, StoreError> {
    let iter = dbs.representation.iter(txn).map_err(LmdbError::from)?;
    let mut results = Vec::new();
    for entry in iter {
        let (key, val) = entry.map_err(LmdbError::from)?;
        results.push((decode_account(key)?, decode_weight(val)?));
    }
    Ok(results)
}

fn frontier_get(txn: &RoTxn, dbs: &Databases, hash: &BlockHash) -> Result<Option<Account>, StoreError> {
    match dbs.frontiers.get(txn, hash.as_bytes()).map_err(LmdbError::from)? {
        Some(bytes) => Ok(Some(decode_account(bytes)?)),
        None => Ok(None),
    }
}

macro_rules! impl_read_txn {
    ($ty:ty) => {
        impl ReadTxn for $ty {
            fn block_get(&self, hash: &BlockHash) -> Result<Option<SavedBlock>, StoreError> {
                block_get(&self.txn, &self.dbs, hash)
            }

            fn block_exists(&self, hash: &BlockHash) -> Result<bool, StoreError> {
                block_exists(&self.txn, &self.dbs, hash)
            }

            fn block_count(&self) -> Result<u64, StoreError> {
                Ok(self.dbs.blocks.len(&self.txn).map_err(LmdbError::from)?)
            }

            fn account_get(&self, account: &Account) -> Result<Option<AccountInfo>, StoreError> {
                account_get(&self.txn, &self.dbs, account)
            }

            fn account_count(&self) -> Result<u64, StoreError> {
                Ok(self.dbs.accounts.len(&self.txn).map_err(LmdbError::from)?)
            }

            fn account_iter(&self) -> Result<Vec<(Account, AccountInfo)>, StoreError> {
                account_iter(&self.txn, &self.dbs)
            }

            fn pending_get(&self, key: &PendingKey) -> Result<Option<PendingInfo>, StoreError> {
                pending_get(&self.txn, &self.dbs, key)
            }

            fn pending_range(
                &self,
                account: &Account,
            ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
                pending_range(&self.txn, &self.dbs, account)
            }

            fn confirmation_height_get(
                &self,
                account: &Account,
            ) -> Result<Option<ConfirmationHeightInfo>, StoreError> {
                confirmation_height_get(&self.txn, &self.dbs, account)
            }

            fn representation_get(&self, representative: &Account) -> Result<Amount, StoreError> {
                representation_get(&self.txn, &self.dbs, representative)
            }

            fn representation_iter(&self) -> Result<Vec<(Account, Amount)>, StoreError> {
                representation_iter(&self.txn, &self.dbs)
            }

            fn frontier_get(&self, hash: &BlockHash) -> Result<Option<Account>, StoreError> {
                frontier_get(&self.txn, &self.dbs, hash)
            }
        }
    };
}

impl_read_txn!(LmdbReadTxn<'_>);
impl_read_txn!(LmdbWriteTxn<'_>);

impl WriteTxn for LmdbWriteTxn<'_> {
    fn block_put(&mut self, block: &SavedBlock) -> Result<(), StoreError> {
        self.dbs
            .blocks
            .put(&mut self.txn, block.hash().as_bytes(), &block.to_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn block_del(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.dbs
            .blocks
            .delete(&mut self.txn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn account_put(&mut self, account: &Account, info: &AccountInfo) -> Result<(), StoreError> {
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        self.dbs
            .accounts
            .put(&mut self.txn, account.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn account_del(&mut self, account: &Account) -> Result<(), StoreError> {
        self.dbs
            .accounts
            .delete(&mut self.txn, account.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn pending_put(&mut self, key: &PendingKey, info: &PendingInfo) -> Result<(), StoreError> {
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        self.dbs
            .pending
            .put(&mut self.txn, &key.to_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn pending_del(&mut self, key: &PendingKey) -> Result<(), StoreError> {
        self.dbs
            .pending
            .delete(&mut self.txn, &key.to_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn confirmation_height_put(
        &mut self,
        account: &Account,
        info: &ConfirmationHeightInfo,
    ) -> Result<(), StoreError> {
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        self.dbs
            .confirmation_height
            .put(&mut self.txn, account.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn confirmation_height_del(&mut self, account: &Account) -> Result<(), StoreError> {
        self.dbs
            .confirmation_height
            .delete(&mut self.txn, account.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn representation_put(
        &mut self,
        representative: &Account,
        weight: Amount,
    ) -> Result<(), StoreError> {
        if weight.is_zero() {
            self.dbs
                .representation
                .delete(&mut self.txn, representative.as_bytes())
                .map_err(LmdbError::from)?;
        } else {
            self.dbs
                .representation
                .put(&mut self.txn, representative.as_bytes(), &weight.to_be_bytes())
                .map_err(LmdbError::from)?;
        }
        Ok(())
    }

    fn frontier_put(&mut self, hash: &BlockHash, account: &Account) -> Result<(), StoreError> {
        self.dbs
            .frontiers
            .put(&mut self.txn, hash.as_bytes(), account.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn frontier_del(&mut self, hash: &BlockHash) -> Result<(), StoreError> {
        self.dbs
            .frontiers
            .delete(&mut self.txn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
