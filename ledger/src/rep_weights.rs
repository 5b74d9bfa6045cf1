//! Representative weights, updated incrementally on every admitted or
//! rolled-back block.
//!
//! Avoids scanning all accounts to compute a representative's total delegated
//! weight. The table is rebuilt once at startup from the full account set,
//! then maintained incrementally. Each account's delegated weight equals its
//! balance.
//!
//! Deltas are applied with wrapping arithmetic: moving weight is a wrapping
//! subtract on one side and a wrapping add on the other, so the pair cancels
//! exactly even if an intermediate value passes through "negative".

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use lattice_store::{StoreError, WriteTxn};
use lattice_types::{Account, Amount};

/// representative → total delegated balance.
#[derive(Debug, Default)]
pub struct RepWeights {
    weights: Mutex<HashMap<Account, Amount>>,
}

impl RepWeights {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Account, Amount>> {
        // A panic while holding the lock cannot leave the map half-updated:
        // every mutation is a single insert or remove.
        self.weights
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn put_locked(weights: &mut HashMap<Account, Amount>, rep: Account, weight: Amount) {
        if weight.is_zero() {
            weights.remove(&rep);
        } else {
            weights.insert(rep, weight);
        }
    }

    /// Add `amount` to a representative (wrapping).
    pub fn representation_add(&self, rep: &Account, amount: Amount) {
        let mut weights = self.lock();
        let current = weights.get(rep).copied().unwrap_or_default();
        Self::put_locked(&mut weights, *rep, current.wrapping_add(amount));
    }

    /// Subtract `amount` from a representative (wrapping).
    pub fn representation_sub(&self, rep: &Account, amount: Amount) {
        self.representation_add(rep, Amount::ZERO.wrapping_sub(amount));
    }

    /// Apply two deltas under one lock acquisition.
    pub fn representation_add_dual(
        &self,
        rep_1: &Account,
        amount_1: Amount,
        rep_2: &Account,
        amount_2: Amount,
    ) {
        let mut weights = self.lock();
        let first = weights.get(rep_1).copied().unwrap_or_default();
        Self::put_locked(&mut weights, *rep_1, first.wrapping_add(amount_1));
        let second = weights.get(rep_2).copied().unwrap_or_default();
        Self::put_locked(&mut weights, *rep_2, second.wrapping_add(amount_2));
    }

    /// Overwrite a representative's weight.
    pub fn representation_put(&self, rep: &Account, weight: Amount) {
        Self::put_locked(&mut self.lock(), *rep, weight);
    }

    /// Get a representative's current weight. Returns zero if not found.
    pub fn representation_get(&self, rep: &Account) -> Amount {
        self.lock().get(rep).copied().unwrap_or_default()
    }

    /// Total weight across all representatives.
    pub fn total(&self) -> Amount {
        self.lock()
            .values()
            .fold(Amount::ZERO, |acc, w| acc.wrapping_add(*w))
    }

    /// Number of representatives with non-zero weight.
    pub fn rep_count(&self) -> usize {
        self.lock().len()
    }

    pub fn snapshot(&self) -> HashMap<Account, Amount> {
        self.lock().clone()
    }

    /// Rebuild from a full account iterator of `(representative, balance)`.
    ///
    /// Called once during startup.
    pub fn rebuild(&self, accounts: impl IntoIterator<Item = (Account, Amount)>) {
        let mut weights = HashMap::new();
        for (rep, balance) in accounts {
            let current = weights.get(&rep).copied().unwrap_or_default();
            Self::put_locked(&mut weights, rep, Amount::wrapping_add(current, balance));
        }
        *self.lock() = weights;
    }

    /// Apply a delta to both the persisted mirror and the in-memory table.
    ///
    /// The stored value is the base, so a table that drifted after an
    /// aborted transaction is corrected on the next update.
    pub fn apply<T: WriteTxn + ?Sized>(
        &self,
        txn: &mut T,
        rep: &Account,
        delta: Amount,
    ) -> Result<(), StoreError> {
        let updated = txn.representation_get(rep)?.wrapping_add(delta);
        txn.representation_put(rep, updated)?;
        self.representation_put(rep, updated);
        Ok(())
    }

    /// [`RepWeights::apply`] for a pair of deltas.
    pub fn apply_dual<T: WriteTxn + ?Sized>(
        &self,
        txn: &mut T,
        rep_1: &Account,
        delta_1: Amount,
        rep_2: &Account,
        delta_2: Amount,
    ) -> Result<(), StoreError> {
        self.apply(txn, rep_1, delta_1)?;
        self.apply(txn, rep_2, delta_2)
    }
}
