//! In-memory atomic counters for frequently-queried ledger statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic cache of ledger counters. Seeded from storage at startup and kept
/// in sync by incrementing/decrementing during block processing and rollback.
#[derive(Debug, Default)]
pub struct LedgerCache {
    block_count: AtomicU64,
    account_count: AtomicU64,
    cemented_count: AtomicU64,
}

impl LedgerCache {
    pub fn new(block_count: u64, account_count: u64, cemented_count: u64) -> Self {
        Self {
            block_count: AtomicU64::new(block_count),
            account_count: AtomicU64::new(account_count),
            cemented_count: AtomicU64::new(cemented_count),
        }
    }

    pub fn block_count(&self) -> u64 {
        self.block_count.load(Ordering::Relaxed)
    }

    pub fn account_count(&self) -> u64 {
        self.account_count.load(Ordering::Relaxed)
    }

    /// Sum of all accounts' confirmation heights.
    pub fn cemented_count(&self) -> u64 {
        self.cemented_count.load(Ordering::Relaxed)
    }

    pub fn reset(&self, block_count: u64, account_count: u64, cemented_count: u64) {
        self.block_count.store(block_count, Ordering::Relaxed);
        self.account_count.store(account_count, Ordering::Relaxed);
        self.cemented_count.store(cemented_count, Ordering::Relaxed);
    }

    pub fn inc_block_count(&self) {
        self.block_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec_block_count(&self) {
        self.block_count.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn inc_account_count(&self) {
        self.account_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec_account_count(&self) {
        self.account_count.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn add_cemented_count(&self, count: u64) {
        self.cemented_count.fetch_add(count, Ordering::Relaxed);
    }
}
