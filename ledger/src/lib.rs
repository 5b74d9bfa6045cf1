//! Block-lattice ledger.
//!
//! Each account owns its own chain of blocks. A transfer is split in two: the
//! sender's block creates a pending entry, and the receiver's block later
//! consumes it. This crate decides which blocks are admitted, undoes blocks on
//! rollback, and keeps representative weights in step with balances.
//!
//! All state lives in a [`lattice_store::Store`]; the ledger only adds
//! in-memory caches that are rebuilt from storage at startup.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod processor;
pub mod rep_weights;
pub mod stats;
mod rollback;

pub use cache::LedgerCache;
pub use config::LedgerConfig;
pub use constants::{epoch_link_from_label, genesis_key, EpochInfo, Epochs, LedgerConstants};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use processor::{ProcessResult, ProcessReturn, SignatureVerification};
pub use rep_weights::RepWeights;
pub use stats::{LedgerStat, LedgerStats};
