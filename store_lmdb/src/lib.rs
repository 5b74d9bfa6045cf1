//! LMDB storage backend for the block-lattice ledger.
//!
//! Implements the `lattice-store` contract using the `heed` LMDB bindings.
//! Each table maps to one named LMDB database within a single environment.
//! Keys are raw fixed-width binary; records are bincode, except blocks, which
//! use the bit-exact `tag ++ block ++ sideband` layout.

pub mod config;
pub mod environment;
pub mod error;
pub mod txn;

pub use config::LmdbConfig;
pub use environment::LmdbStore;
pub use error::LmdbError;
pub use txn::{LmdbReadTxn, LmdbWriteTxn};
