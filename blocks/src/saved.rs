//! A block as persisted by the ledger: the block plus its sideband.

use lattice_types::{Account, Amount, BlockHash, Epoch, Timestamp};

use crate::codec::{BlockDecodeError, Reader};
use crate::{Block, BlockSideband};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedBlock {
    pub block: Block,
    pub sideband: BlockSideband,
}

impl SavedBlock {
    pub fn new(block: Block, sideband: BlockSideband) -> Self {
        Self { block, sideband }
    }

    pub fn hash(&self) -> BlockHash {
        self.block.hash()
    }

    pub fn account(&self) -> Account {
        self.sideband.account
    }

    pub fn balance(&self) -> Amount {
        self.sideband.balance
    }

    pub fn height(&self) -> u64 {
        self.sideband.height
    }

    pub fn successor(&self) -> BlockHash {
        self.sideband.successor
    }

    pub fn timestamp(&self) -> Timestamp {
        self.sideband.timestamp
    }

    pub fn epoch(&self) -> Epoch {
        self.sideband.details.epoch
    }

    pub fn is_send(&self) -> bool {
        self.sideband.details.is_send
    }

    pub fn is_receive(&self) -> bool {
        self.sideband.details.is_receive
    }

    pub fn is_epoch(&self) -> bool {
        self.sideband.details.is_epoch
    }

    /// Type tag, block body, then sideband.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(1 + self.block.serialized_size() + BlockSideband::SERIALIZED_SIZE);
        out.push(self.block.block_type() as u8);
        self.block.serialize(&mut out);
        self.sideband.serialize(&mut out);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlockDecodeError> {
        let mut r = Reader::new(bytes);
        let block = Block::read_tagged(&mut r)?;
        let sideband = BlockSideband::deserialize(&mut r)?;
        r.finish()?;
        Ok(Self { block, sideband })
    }
}
