//! Account identity: an account is its Ed25519 public key.

use crate::block::bytes32_type;
use crate::keys::PublicKey;

bytes32_type!(Account);

impl Account {
    /// The burn account. Funds sent here can never be received.
    pub const BURN: Self = Self::ZERO;

    pub fn as_public_key(&self) -> PublicKey {
        PublicKey(*self.as_bytes())
    }
}

impl From<PublicKey> for Account {
    fn from(key: PublicKey) -> Self {
        Self::new(key.0)
    }
}

impl From<&PublicKey> for Account {
    fn from(key: &PublicKey) -> Self {
        Self::new(key.0)
    }
}
