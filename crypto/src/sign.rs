//! Ed25519 signing and verification of block hashes.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use lattice_types::{Account, BlockHash, PrivateKey, PublicKey, Signature};

/// Sign arbitrary bytes.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    Signature(SigningKey::from_bytes(&private_key.0).sign(message).to_bytes())
}

/// Strict Ed25519 verification: malformed keys, small-order keys and
/// non-canonical signatures all fail.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    VerifyingKey::from_bytes(&public_key.0)
        .map(|key| {
            key.verify_strict(message, &ed25519_dalek::Signature::from_bytes(&signature.0))
                .is_ok()
        })
        .unwrap_or(false)
}

/// Blocks are signed over their 32-byte hash.
pub fn sign_hash(hash: &BlockHash, private_key: &PrivateKey) -> Signature {
    sign_message(hash.as_bytes(), private_key)
}

pub fn verify_hash(hash: &BlockHash, signature: &Signature, public_key: &PublicKey) -> bool {
    verify_signature(hash.as_bytes(), signature, public_key)
}

/// An account is its own public key, so account chains verify directly
/// against the account.
pub fn verify_by_account(hash: &BlockHash, signature: &Signature, account: &Account) -> bool {
    verify_hash(hash, signature, &account.as_public_key())
}
