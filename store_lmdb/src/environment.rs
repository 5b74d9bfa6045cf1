//! LMDB environment setup.

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use lattice_store::{Store, StoreError};

use crate::txn::{LmdbReadTxn, LmdbWriteTxn};
use crate::{LmdbConfig, LmdbError};

/// Named database handles, one per table.
#[derive(Clone, Copy)]
pub(crate) struct Databases {
    pub(crate) blocks: Database<Bytes, Bytes>,
    pub(crate) accounts: Database<Bytes, Bytes>,
    pub(crate) pending: Database<Bytes, Bytes>,
    pub(crate) confirmation_height: Database<Bytes, Bytes>,
    pub(crate) representation: Database<Bytes, Bytes>,
    pub(crate) frontiers: Database<Bytes, Bytes>,
}

/// Wraps the LMDB environment and all database handles.
pub struct LmdbStore {
    env: Env,
    dbs: Databases,
}

impl LmdbStore {
    /// Open or create an LMDB environment at `config.path`.
    pub fn open(config: &LmdbConfig) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(&config.path)?;
        // SAFETY: the environment is opened once per path by this process and
        // the memory map is only accessed through heed transactions.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(config.map_size)
                .max_dbs(config.max_dbs)
                .open(&config.path)?
        };

        let mut wtxn = env.write_txn()?;
        let dbs = Databases {
            blocks: env.create_database(&mut wtxn, Some("blocks"))?,
            accounts: env.create_database(&mut wtxn, Some("accounts"))?,
            pending: env.create_database(&mut wtxn, Some("pending"))?,
            confirmation_height: env.create_database(&mut wtxn, Some("confirmation_height"))?,
            representation: env.create_database(&mut wtxn, Some("representation"))?,
            frontiers: env.create_database(&mut wtxn, Some("frontiers"))?,
        };
        wtxn.commit()?;

        info!(path = %config.path.display(), map_size = config.map_size, "opened LMDB store");
        Ok(Self { env, dbs })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }
}

impl Store for LmdbStore {
    type Read<'a> = LmdbReadTxn<'a>;
    type Write<'a> = LmdbWriteTxn<'a>;

    fn begin_read(&self) -> Result<LmdbReadTxn<'_>, StoreError> {
        let txn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(LmdbReadTxn::new(txn, self.dbs))
    }

    fn begin_write(&self) -> Result<LmdbWriteTxn<'_>, StoreError> {
        let txn = self.env.write_txn().map_err(LmdbError::from)?;
        Ok(LmdbWriteTxn::new(txn, self.dbs))
    }
}
