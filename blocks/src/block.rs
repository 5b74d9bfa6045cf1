//! The polymorphic block and its uniform accessor surface.

use std::fmt;

use lattice_types::{Account, Amount, BlockHash, Link, QualifiedRoot, Root, Signature};

use crate::codec::{BlockDecodeError, Reader};
use crate::{ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock};

/// Persisted type tag. Values are part of the storage format.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    Invalid = 0,
    NotABlock = 1,
    Send = 2,
    Receive = 3,
    Open = 4,
    Change = 5,
    State = 6,
}

impl BlockType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Invalid),
            1 => Some(Self::NotABlock),
            2 => Some(Self::Send),
            3 => Some(Self::Receive),
            4 => Some(Self::Open),
            5 => Some(Self::Change),
            6 => Some(Self::State),
            _ => None,
        }
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, Self::Send | Self::Receive | Self::Open | Self::Change)
    }

    /// Serialized body size, excluding the type tag.
    pub fn serialized_size(self) -> Option<usize> {
        match self {
            Self::Send => Some(SendBlock::SERIALIZED_SIZE),
            Self::Receive => Some(ReceiveBlock::SERIALIZED_SIZE),
            Self::Open => Some(OpenBlock::SERIALIZED_SIZE),
            Self::Change => Some(ChangeBlock::SERIALIZED_SIZE),
            Self::State => Some(StateBlock::SERIALIZED_SIZE),
            Self::Invalid | Self::NotABlock => None,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Invalid => "invalid",
            Self::NotABlock => "not_a_block",
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Open => "open",
            Self::Change => "change",
            Self::State => "state",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Send(_) => BlockType::Send,
            Self::Receive(_) => BlockType::Receive,
            Self::Open(_) => BlockType::Open,
            Self::Change(_) => BlockType::Change,
            Self::State(_) => BlockType::State,
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.block_type().is_legacy()
    }

    pub fn hash(&self) -> BlockHash {
        match self {
            Self::Send(b) => b.hash(),
            Self::Receive(b) => b.hash(),
            Self::Open(b) => b.hash(),
            Self::Change(b) => b.hash(),
            Self::State(b) => b.hash(),
        }
    }

    /// Predecessor hash; zero for the first block of a chain.
    pub fn previous(&self) -> BlockHash {
        match self {
            Self::Send(b) => b.previous(),
            Self::Receive(b) => b.previous(),
            Self::Open(_) => BlockHash::ZERO,
            Self::Change(b) => b.previous(),
            Self::State(b) => b.previous(),
        }
    }

    pub fn root(&self) -> Root {
        match self {
            Self::Send(b) => b.root(),
            Self::Receive(b) => b.root(),
            Self::Open(b) => b.root(),
            Self::Change(b) => b.root(),
            Self::State(b) => b.root(),
        }
    }

    pub fn qualified_root(&self) -> QualifiedRoot {
        QualifiedRoot::new(self.root(), self.previous())
    }

    /// Account named in the block body. Only open and state blocks carry one.
    pub fn account_field(&self) -> Option<Account> {
        match self {
            Self::Open(b) => Some(b.account()),
            Self::State(b) => Some(b.account()),
            _ => None,
        }
    }

    pub fn representative_field(&self) -> Option<Account> {
        match self {
            Self::Open(b) => Some(b.representative()),
            Self::Change(b) => Some(b.representative()),
            Self::State(b) => Some(b.representative()),
            _ => None,
        }
    }

    pub fn balance_field(&self) -> Option<Amount> {
        match self {
            Self::Send(b) => Some(b.balance()),
            Self::State(b) => Some(b.balance()),
            _ => None,
        }
    }

    /// Source block of a legacy receive or open.
    pub fn source_field(&self) -> Option<BlockHash> {
        match self {
            Self::Receive(b) => Some(b.source()),
            Self::Open(b) => Some(b.source()),
            _ => None,
        }
    }

    pub fn destination_field(&self) -> Option<Account> {
        match self {
            Self::Send(b) => Some(b.destination()),
            _ => None,
        }
    }

    pub fn link_field(&self) -> Option<Link> {
        match self {
            Self::State(b) => Some(b.link()),
            _ => None,
        }
    }

    pub fn signature(&self) -> &Signature {
        match self {
            Self::Send(b) => &b.signature,
            Self::Receive(b) => &b.signature,
            Self::Open(b) => &b.signature,
            Self::Change(b) => &b.signature,
            Self::State(b) => &b.signature,
        }
    }

    /// Replace the signature. The hash does not cover it, so it is unchanged.
    pub fn set_signature(&mut self, signature: Signature) {
        match self {
            Self::Send(b) => b.signature = signature,
            Self::Receive(b) => b.signature = signature,
            Self::Open(b) => b.signature = signature,
            Self::Change(b) => b.signature = signature,
            Self::State(b) => b.signature = signature,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Self::Send(b) => b.work,
            Self::Receive(b) => b.work,
            Self::Open(b) => b.work,
            Self::Change(b) => b.work,
            Self::State(b) => b.work,
        }
    }

    /// Whether a block of `previous_type` may precede this block in a chain.
    /// Legacy blocks may only follow legacy blocks; state blocks may follow anything.
    pub fn valid_predecessor(&self, previous_type: BlockType) -> bool {
        match self {
            Self::Send(_) | Self::Receive(_) | Self::Change(_) => previous_type.is_legacy(),
            Self::Open(_) => false,
            Self::State(_) => true,
        }
    }

    pub fn serialized_size(&self) -> usize {
        match self {
            Self::Send(_) => SendBlock::SERIALIZED_SIZE,
            Self::Receive(_) => ReceiveBlock::SERIALIZED_SIZE,
            Self::Open(_) => OpenBlock::SERIALIZED_SIZE,
            Self::Change(_) => ChangeBlock::SERIALIZED_SIZE,
            Self::State(_) => StateBlock::SERIALIZED_SIZE,
        }
    }

    /// Append the block body (without the type tag).
    pub fn serialize(&self, out: &mut Vec<u8>) {
        match self {
            Self::Send(b) => b.serialize(out),
            Self::Receive(b) => b.serialize(out),
            Self::Open(b) => b.serialize(out),
            Self::Change(b) => b.serialize(out),
            Self::State(b) => b.serialize(out),
        }
    }

    /// Type tag followed by the body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.serialized_size());
        out.push(self.block_type() as u8);
        self.serialize(&mut out);
        out
    }

    /// Decode a tagged block produced by [`Block::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlockDecodeError> {
        let mut r = Reader::new(bytes);
        let block = Self::read_tagged(&mut r)?;
        r.finish()?;
        Ok(block)
    }

    pub(crate) fn read_tagged(r: &mut Reader<'_>) -> Result<Self, BlockDecodeError> {
        let tag = r.u8()?;
        let block_type = BlockType::from_u8(tag).ok_or(BlockDecodeError::UnknownType(tag))?;
        Self::read_body(block_type, r)
    }

    pub(crate) fn read_body(
        block_type: BlockType,
        r: &mut Reader<'_>,
    ) -> Result<Self, BlockDecodeError> {
        Ok(match block_type {
            BlockType::Send => Self::Send(SendBlock::deserialize(r)?),
            BlockType::Receive => Self::Receive(ReceiveBlock::deserialize(r)?),
            BlockType::Open => Self::Open(OpenBlock::deserialize(r)?),
            BlockType::Change => Self::Change(ChangeBlock::deserialize(r)?),
            BlockType::State => Self::State(StateBlock::deserialize(r)?),
            other => return Err(BlockDecodeError::UnknownType(other as u8)),
        })
    }
}

impl From<SendBlock> for Block {
    fn from(block: SendBlock) -> Self {
        Self::Send(block)
    }
}

impl From<ReceiveBlock> for Block {
    fn from(block: ReceiveBlock) -> Self {
        Self::Receive(block)
    }
}

impl From<OpenBlock> for Block {
    fn from(block: OpenBlock) -> Self {
        Self::Open(block)
    }
}

impl From<ChangeBlock> for Block {
    fn from(block: ChangeBlock) -> Self {
        Self::Change(block)
    }
}

impl From<StateBlock> for Block {
    fn from(block: StateBlock) -> Self {
        Self::State(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::{blake2b_256_multi, generate_keypair, verify_hash};

    fn sample_blocks() -> Vec<Block> {
        let key = generate_keypair();
        let acct = key.account();
        let prev = BlockHash::new([3; 32]);
        vec![
            SendBlock::new(prev, Account::new([4; 32]), Amount::raw(10), &key.private, 1).into(),
            ReceiveBlock::new(prev, BlockHash::new([5; 32]), &key.private, 2).into(),
            OpenBlock::new(BlockHash::new([5; 32]), acct, acct, &key.private, 3).into(),
            ChangeBlock::new(prev, Account::new([6; 32]), &key.private, 4).into(),
            StateBlock::new(acct, prev, acct, Amount::raw(9), Link::ZERO, &key.private, 5).into(),
        ]
    }

    #[test]
    fn tagged_bytes_round_trip() {
        for block in sample_blocks() {
            let bytes = block.to_bytes();
            assert_eq!(bytes.len(), 1 + block.serialized_size());
            assert_eq!(bytes[0], block.block_type() as u8);
            let decoded = Block::from_bytes(&bytes).unwrap();
            assert_eq!(decoded, block);
            assert_eq!(decoded.hash(), block.hash());
        }
    }

    #[test]
    fn legacy_work_is_little_endian_state_work_big_endian() {
        let blocks = sample_blocks();
        let send = blocks[0].to_bytes();
        assert_eq!(&send[send.len() - 8..], &1u64.to_le_bytes());
        let state = blocks[4].to_bytes();
        assert_eq!(&state[state.len() - 8..], &5u64.to_be_bytes());
    }

    #[test]
    fn send_hash_layout() {
        let key = generate_keypair();
        let prev = BlockHash::new([1; 32]);
        let dest = Account::new([2; 32]);
        let send = SendBlock::new(prev, dest, Amount::raw(77), &key.private, 0);
        let expected = blake2b_256_multi(&[&[1; 32], &[2; 32], &77u128.to_be_bytes()]);
        assert_eq!(send.hash(), BlockHash::new(expected));
        assert!(verify_hash(&send.hash(), &send.signature, &key.public));
    }

    #[test]
    fn open_has_no_previous_and_account_root() {
        let blocks = sample_blocks();
        let open = &blocks[2];
        assert!(open.previous().is_zero());
        assert_eq!(open.root().as_account(), open.account_field().unwrap());
    }

    #[test]
    fn predecessor_rules() {
        let blocks = sample_blocks();
        assert!(blocks[0].valid_predecessor(BlockType::Open));
        assert!(!blocks[0].valid_predecessor(BlockType::State));
        assert!(!blocks[2].valid_predecessor(BlockType::Send));
        assert!(blocks[4].valid_predecessor(BlockType::Send));
        assert!(blocks[4].valid_predecessor(BlockType::State));
    }

    #[test]
    fn field_views_match_variant() {
        let blocks = sample_blocks();
        assert_eq!(blocks[0].destination_field(), Some(Account::new([4; 32])));
        assert_eq!(blocks[1].source_field(), Some(BlockHash::new([5; 32])));
        assert!(blocks[1].balance_field().is_none());
        assert_eq!(blocks[3].representative_field(), Some(Account::new([6; 32])));
        assert_eq!(blocks[4].link_field(), Some(Link::ZERO));
        assert!(blocks[0].link_field().is_none());
    }

    #[test]
    fn set_signature_keeps_hash() {
        let mut block = sample_blocks().remove(0);
        let hash = block.hash();
        block.set_signature(Signature::ZERO);
        assert_eq!(block.hash(), hash);
        assert_eq!(block.signature(), &Signature::ZERO);
    }

    #[test]
    fn rejects_unknown_tag_and_truncation() {
        assert_eq!(Block::from_bytes(&[9]), Err(BlockDecodeError::UnknownType(9)));
        assert_eq!(Block::from_bytes(&[1]), Err(BlockDecodeError::UnknownType(1)));
        let bytes = sample_blocks()[4].to_bytes();
        assert!(matches!(
            Block::from_bytes(&bytes[..bytes.len() - 1]),
            Err(BlockDecodeError::UnexpectedEof { .. })
        ));
    }
}
