//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! The ledger's external dependencies (clock, storage) are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::{NullReadTxn, NullStore, NullWriteTxn};
