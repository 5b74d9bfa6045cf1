//! Ed25519 key generation.

use ed25519_dalek::SigningKey;
use lattice_types::{KeyPair, PrivateKey, PublicKey};
use rand::rngs::OsRng;

fn keypair_from_signing_key(signing_key: &SigningKey) -> KeyPair {
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Fresh key pair from the OS random source.
pub fn generate_keypair() -> KeyPair {
    keypair_from_signing_key(&SigningKey::generate(&mut OsRng))
}

pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    PublicKey(SigningKey::from_bytes(&private.0).verifying_key().to_bytes())
}

/// Deterministic key pair from a 32-byte seed. Well-known genesis and epoch
/// authority keys are derived this way.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    keypair_from_signing_key(&SigningKey::from_bytes(seed))
}
