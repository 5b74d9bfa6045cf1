use lattice_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(#[from] heed::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupt record: {0}")]
    Corruption(String),
}

impl From<bincode::Error> for LmdbError {
    fn from(e: bincode::Error) -> Self {
        LmdbError::Serialization(e.to_string())
    }
}

impl From<LmdbError> for StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Serialization(msg) => StoreError::Serialization(msg),
            LmdbError::Corruption(msg) => StoreError::Corruption(msg),
            other => StoreError::Backend(other.to_string()),
        }
    }
}
