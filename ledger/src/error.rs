use lattice_store::StoreError;
use lattice_types::{Account, BlockHash};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("rollback of account {account} to height {height} would cross confirmation height {confirmed}")]
    RollbackBelowConfirmation {
        account: Account,
        height: u64,
        confirmed: u64,
    },

    #[error("block not found: {0}")]
    BlockNotFound(BlockHash),

    #[error("account not found: {0}")]
    AccountNotFound(Account),

    #[error("configuration error: {0}")]
    Config(String),
}
