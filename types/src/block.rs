//! 32-byte chain identifiers: block hashes, links and roots.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::Account;

/// Shared body for the fixed-width 32-byte identifiers.
macro_rules! bytes32_type {
    ($name:ident) => {
        #[derive(
            Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub struct $name([u8; 32]);

        impl $name {
            pub const ZERO: Self = Self([0u8; 32]);

            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }

            /// Parse from exactly 32 bytes.
            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                let arr: [u8; 32] = bytes.try_into().ok()?;
                Some(Self(arr))
            }

            /// Parse from a 64-character hex string (either case).
            pub fn decode_hex(s: &str) -> Result<Self, $crate::error::ParseError> {
                $crate::error::decode_hex_32(s).map(Self)
            }

            pub fn encode_hex(&self) -> String {
                hex::encode_upper(self.0)
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({}\u{2026})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.encode_hex())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::decode_hex(s)
            }
        }
    };
}

pub(crate) use bytes32_type;

bytes32_type!(BlockHash);
bytes32_type!(Link);
bytes32_type!(Root);

impl From<BlockHash> for Link {
    fn from(hash: BlockHash) -> Self {
        Self(hash.0)
    }
}

impl From<Account> for Link {
    fn from(account: Account) -> Self {
        Self(*account.as_bytes())
    }
}

impl Link {
    /// Interpret the link as the source block hash of a receive.
    pub fn as_block_hash(&self) -> BlockHash {
        BlockHash(self.0)
    }

    /// Interpret the link as the destination account of a send.
    pub fn as_account(&self) -> Account {
        Account::new(self.0)
    }
}

impl From<BlockHash> for Root {
    fn from(hash: BlockHash) -> Self {
        Self(hash.0)
    }
}

impl From<Account> for Root {
    fn from(account: Account) -> Self {
        Self(*account.as_bytes())
    }
}

impl Root {
    pub fn as_block_hash(&self) -> BlockHash {
        BlockHash(self.0)
    }

    pub fn as_account(&self) -> Account {
        Account::new(self.0)
    }
}

/// A chain slot: the root of an account chain plus the block it follows.
///
/// Two blocks with the same qualified root compete for the same position and
/// are forks of each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QualifiedRoot {
    pub root: Root,
    pub previous: BlockHash,
}

impl QualifiedRoot {
    pub fn new(root: Root, previous: BlockHash) -> Self {
        Self { root, previous }
    }
}

impl fmt::Display for QualifiedRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.previous)
    }
}
