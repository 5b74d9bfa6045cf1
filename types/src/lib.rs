//! Fundamental types for the block-lattice ledger.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: accounts, hashes, links, roots, amounts, epochs, keys and
//! timestamps.

pub mod account;
pub mod amount;
pub mod block;
pub mod epoch;
pub mod error;
pub mod keys;
pub mod network;
pub mod time;

pub use account::Account;
pub use amount::Amount;
pub use block::{BlockHash, Link, QualifiedRoot, Root};
pub use epoch::Epoch;
pub use error::ParseError;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use time::{Clock, SystemClock, Timestamp};
