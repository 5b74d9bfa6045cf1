//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use lattice_crypto::decode_account;
use lattice_types::{Account, Amount};
use lattice_utils::{init_tracing_with, LogFormat};

use crate::LedgerError;

/// Configuration for a [`crate::Ledger`].
///
/// Can be loaded from a TOML file via [`LedgerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// While the ledger holds fewer blocks than this, `weight` answers from
    /// `bootstrap_weights` instead of the live representative table.
    #[serde(default)]
    pub bootstrap_weight_max_blocks: u64,

    /// Representative address (`lat_...`) → weight as a decimal raw amount.
    #[serde(default)]
    pub bootstrap_weights: BTreeMap<String, String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, LedgerError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LedgerError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber from `log_format` and
    /// `log_level`. `RUST_LOG` overrides the level.
    pub fn init_logging(&self) {
        init_tracing_with(LogFormat::parse(&self.log_format), &self.log_level);
    }

    /// Decode the bootstrap weight table.
    pub fn parse_bootstrap_weights(&self) -> Result<HashMap<Account, Amount>, LedgerError> {
        self.bootstrap_weights
            .iter()
            .map(|(address, weight)| {
                let account = decode_account(address).ok_or_else(|| {
                    LedgerError::Config(format!("invalid representative address {address:?}"))
                })?;
                let weight: Amount = weight.parse().map_err(|e| {
                    LedgerError::Config(format!("invalid weight for {address}: {e}"))
                })?;
                Ok((account, weight))
            })
            .collect()
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            bootstrap_weight_max_blocks: 0,
            bootstrap_weights: BTreeMap::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
