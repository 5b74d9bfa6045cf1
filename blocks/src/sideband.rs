//! Metadata stored alongside each admitted block but not covered by its hash.

use lattice_types::{Account, Amount, BlockHash, Epoch, Timestamp};

use crate::codec::{BlockDecodeError, Reader};

/// Epoch and subtype flags, packed into one byte on disk.
///
/// The low five bits hold the epoch; the top three are `is_send`,
/// `is_receive` and `is_epoch`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockDetails {
    pub epoch: Epoch,
    pub is_send: bool,
    pub is_receive: bool,
    pub is_epoch: bool,
}

impl BlockDetails {
    const SEND: u8 = 0x80;
    const RECEIVE: u8 = 0x40;
    const EPOCH: u8 = 0x20;
    const EPOCH_MASK: u8 = 0x1f;

    pub fn new(epoch: Epoch, is_send: bool, is_receive: bool, is_epoch: bool) -> Self {
        Self {
            epoch,
            is_send,
            is_receive,
            is_epoch,
        }
    }

    pub fn pack(&self) -> u8 {
        let mut byte = self.epoch.as_u8() & Self::EPOCH_MASK;
        if self.is_send {
            byte |= Self::SEND;
        }
        if self.is_receive {
            byte |= Self::RECEIVE;
        }
        if self.is_epoch {
            byte |= Self::EPOCH;
        }
        byte
    }

    pub fn unpack(byte: u8) -> Result<Self, BlockDecodeError> {
        let raw_epoch = byte & Self::EPOCH_MASK;
        let epoch = Epoch::from_u8(raw_epoch).ok_or(BlockDecodeError::InvalidEpoch(raw_epoch))?;
        Ok(Self {
            epoch,
            is_send: byte & Self::SEND != 0,
            is_receive: byte & Self::RECEIVE != 0,
            is_epoch: byte & Self::EPOCH != 0,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSideband {
    /// Next block in the chain; zero while this block is the head.
    pub successor: BlockHash,
    pub account: Account,
    /// Account balance after this block.
    pub balance: Amount,
    /// Position in the chain, starting at 1 for the open block.
    pub height: u64,
    pub timestamp: Timestamp,
    pub details: BlockDetails,
    /// Epoch of the send this block receives from; `Epoch0` otherwise.
    pub source_epoch: Epoch,
}

impl BlockSideband {
    /// successor(32) + account(32) + balance(16) + height(8) + timestamp(8)
    /// + details(1) + source_epoch(1)
    pub const SERIALIZED_SIZE: usize = 98;

    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.successor.as_bytes());
        out.extend_from_slice(self.account.as_bytes());
        out.extend_from_slice(&self.balance.to_be_bytes());
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&self.timestamp.as_secs().to_be_bytes());
        out.push(self.details.pack());
        out.push(self.source_epoch.as_u8());
    }

    pub(crate) fn deserialize(r: &mut Reader<'_>) -> Result<Self, BlockDecodeError> {
        let successor = r.hash()?;
        let account = r.account()?;
        let balance = r.amount()?;
        let height = r.u64_be()?;
        let timestamp = Timestamp::new(r.u64_be()?);
        let details = BlockDetails::unpack(r.u8()?)?;
        let raw_source = r.u8()?;
        let source_epoch =
            Epoch::from_u8(raw_source).ok_or(BlockDecodeError::InvalidEpoch(raw_source))?;
        Ok(Self {
            successor,
            account,
            balance,
            height,
            timestamp,
            details,
            source_epoch,
        })
    }
}
