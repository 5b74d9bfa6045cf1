//! Counters the ledger keeps for admitted and rolled-back blocks.

use lattice_utils::{StatKey, Stats};

/// One counter per admitted block kind, plus rollbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerStat {
    Send,
    Receive,
    Open,
    Change,
    StateBlock,
    EpochBlock,
    Rollback,
}

impl StatKey for LedgerStat {
    const ALL: &'static [Self] = &[
        Self::Send,
        Self::Receive,
        Self::Open,
        Self::Change,
        Self::StateBlock,
        Self::EpochBlock,
        Self::Rollback,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn name(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Open => "open",
            Self::Change => "change",
            Self::StateBlock => "state_block",
            Self::EpochBlock => "epoch_block",
            Self::Rollback => "rollback",
        }
    }
}

pub type LedgerStats = Stats<LedgerStat>;
