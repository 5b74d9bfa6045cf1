//! LMDB environment settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LmdbConfig {
    /// Directory holding the LMDB data and lock files.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Maximum size of the memory map in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Maximum number of named databases.
    #[serde(default = "default_max_dbs")]
    pub max_dbs: u32,
}

fn default_path() -> PathBuf {
    PathBuf::from("./lattice_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_max_dbs() -> u32 {
    16
}

impl LmdbConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Default for LmdbConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            map_size: default_map_size(),
            max_dbs: default_max_dbs(),
        }
    }
}
