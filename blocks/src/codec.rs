//! Byte-level reader used by the block and sideband decoders.

use lattice_types::{Account, Amount, BlockHash, Link, Signature};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockDecodeError {
    #[error("unexpected end of input: needed {needed} more bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("unknown block type tag {0}")]
    UnknownType(u8),

    #[error("invalid epoch value {0}")]
    InvalidEpoch(u8),

    #[error("{0} trailing bytes after block")]
    TrailingBytes(usize),
}

/// Sequential reader over a byte slice.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], BlockDecodeError> {
        if self.remaining() < N {
            return Err(BlockDecodeError::UnexpectedEof {
                offset: self.pos,
                needed: N - self.remaining(),
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, BlockDecodeError> {
        Ok(self.array::<1>()?[0])
    }

    pub(crate) fn u64_be(&mut self) -> Result<u64, BlockDecodeError> {
        Ok(u64::from_be_bytes(self.array()?))
    }

    pub(crate) fn u64_le(&mut self) -> Result<u64, BlockDecodeError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    pub(crate) fn hash(&mut self) -> Result<BlockHash, BlockDecodeError> {
        Ok(BlockHash::new(self.array()?))
    }

    pub(crate) fn account(&mut self) -> Result<Account, BlockDecodeError> {
        Ok(Account::new(self.array()?))
    }

    pub(crate) fn link(&mut self) -> Result<Link, BlockDecodeError> {
        Ok(Link::new(self.array()?))
    }

    pub(crate) fn amount(&mut self) -> Result<Amount, BlockDecodeError> {
        Ok(Amount::from_be_bytes(self.array()?))
    }

    pub(crate) fn signature(&mut self) -> Result<Signature, BlockDecodeError> {
        Ok(Signature(self.array()?))
    }

    pub(crate) fn finish(self) -> Result<(), BlockDecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(BlockDecodeError::TrailingBytes(n)),
        }
    }
}
