//! Protocol-upgrade epochs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal protocol version attached to every account chain.
///
/// `Invalid` and `Unspecified` are sentinels; real chains are always at
/// `Epoch0` or later. Numeric values are part of the persisted sideband.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Epoch {
    Invalid = 0,
    Unspecified = 1,
    #[default]
    Epoch0 = 2,
    Epoch1 = 3,
    Epoch2 = 4,
}

impl Epoch {
    pub const EPOCH_BEGIN: Self = Self::Epoch0;
    pub const MAX: Self = Self::Epoch2;

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Invalid),
            1 => Some(Self::Unspecified),
            2 => Some(Self::Epoch0),
            3 => Some(Self::Epoch1),
            4 => Some(Self::Epoch2),
            _ => None,
        }
    }

    /// The epoch immediately after this one, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Epoch0 => Some(Self::Epoch1),
            Self::Epoch1 => Some(Self::Epoch2),
            _ => None,
        }
    }

    /// Whether an account at `from` may be upgraded directly to `to`.
    pub fn is_sequential(from: Self, to: Self) -> bool {
        from >= Self::Epoch0 && from.next() == Some(to)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("invalid"),
            Self::Unspecified => f.write_str("unspecified"),
            Self::Epoch0 => f.write_str("epoch_0"),
            Self::Epoch1 => f.write_str("epoch_1"),
            Self::Epoch2 => f.write_str("epoch_2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_upgrades() {
        assert!(Epoch::is_sequential(Epoch::Epoch0, Epoch::Epoch1));
        assert!(Epoch::is_sequential(Epoch::Epoch1, Epoch::Epoch2));
        assert!(!Epoch::is_sequential(Epoch::Epoch0, Epoch::Epoch2));
        assert!(!Epoch::is_sequential(Epoch::Epoch1, Epoch::Epoch0));
        assert!(!Epoch::is_sequential(Epoch::Epoch1, Epoch::Epoch1));
        assert!(!Epoch::is_sequential(Epoch::Unspecified, Epoch::Epoch0));
    }

    #[test]
    fn u8_round_trip() {
        for epoch in [
            Epoch::Invalid,
            Epoch::Unspecified,
            Epoch::Epoch0,
            Epoch::Epoch1,
            Epoch::Epoch2,
        ] {
            assert_eq!(Epoch::from_u8(epoch.as_u8()), Some(epoch));
        }
        assert_eq!(Epoch::from_u8(31), None);
    }
}
