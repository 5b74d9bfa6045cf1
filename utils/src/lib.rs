//! Shared utilities for the block-lattice ledger.

pub mod logging;
pub mod stats;

pub use logging::{init_tracing, init_tracing_with, LogFormat};
pub use stats::{StatKey, Stats};
