//! Block model for the block-lattice.
//!
//! Five record variants share one accessor surface through the [`Block`] enum:
//! the legacy `send`, `receive`, `open` and `change` blocks, and the unified
//! `state` block that supersedes them. Derived metadata that is not covered
//! by the hash lives in a [`BlockSideband`] stored next to each admitted block.
//!
//! Hash input and serialized layout are bit-exact: a block's hash is also the
//! link value other blocks use to reference it.

pub mod block;
pub mod change;
pub mod codec;
pub mod open;
pub mod receive;
pub mod saved;
pub mod send;
pub mod sideband;
pub mod state;

pub use block::{Block, BlockType};
pub use change::ChangeBlock;
pub use codec::BlockDecodeError;
pub use open::OpenBlock;
pub use receive::ReceiveBlock;
pub use saved::SavedBlock;
pub use send::SendBlock;
pub use sideband::{BlockDetails, BlockSideband};
pub use state::StateBlock;
