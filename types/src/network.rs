//! Network identifier.

use serde::{Deserialize, Serialize};

/// Identifies which network a ledger belongs to. Each network has its own
/// genesis block and epoch authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// The production network.
    Live,
    /// The public test network.
    Test,
    /// Local development network.
    Dev,
}

impl NetworkId {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Test => "test",
            Self::Dev => "dev",
        }
    }
}
