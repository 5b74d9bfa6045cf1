//! Cryptographic primitives for the block-lattice ledger.
//!
//! - **Ed25519** for signing and verifying block hashes
//! - **Blake2b-256** for block hashing
//! - Account address encoding with `lat_` prefix and base32 encoding

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_account, encode_account, validate_account};
pub use hash::{blake2b_256, blake2b_256_multi, hash_block};
pub use keys::{generate_keypair, keypair_from_seed, public_from_private};
pub use sign::{sign_hash, sign_message, verify_by_account, verify_hash, verify_signature};
