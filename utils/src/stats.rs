//! Fixed-key activity counters.
//!
//! Counters are keyed by a small enum implementing [`StatKey`], so the set of
//! counters is known at compile time and each one is a slot in an array.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// A closed set of counter keys.
pub trait StatKey: Copy + 'static {
    /// Every key, in slot order: `ALL[k.index()] == k`.
    const ALL: &'static [Self];

    fn index(self) -> usize;

    /// Stable name used in snapshots and logs.
    fn name(self) -> &'static str;
}

/// One relaxed atomic counter per key of `K`.
pub struct Stats<K: StatKey> {
    slots: Box<[AtomicU64]>,
    _key: PhantomData<fn() -> K>,
}

impl<K: StatKey> Stats<K> {
    pub fn new() -> Self {
        Self {
            slots: K::ALL.iter().map(|_| AtomicU64::new(0)).collect(),
            _key: PhantomData,
        }
    }

    pub fn increment(&self, key: K) {
        self.add(key, 1);
    }

    pub fn add(&self, key: K, value: u64) {
        self.slots[key.index()].fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self, key: K) -> u64 {
        self.slots[key.index()].load(Ordering::Relaxed)
    }

    /// `(name, count)` for every key, in slot order.
    pub fn snapshot(&self) -> Vec<(&'static str, u64)> {
        K::ALL.iter().map(|&key| (key.name(), self.get(key))).collect()
    }

    pub fn reset(&self) {
        for slot in self.slots.iter() {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

impl<K: StatKey> Default for Stats<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StatKey> fmt::Debug for Stats<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.snapshot()).finish()
    }
}
