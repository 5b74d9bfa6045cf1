//! Helpers shared by store backends for the stored block form.

use lattice_blocks::SavedBlock;

use crate::StoreError;

/// Decode a stored `tag ++ block ++ sideband` record.
pub fn decode_saved_block(bytes: &[u8]) -> Result<SavedBlock, StoreError> {
    SavedBlock::from_bytes(bytes).map_err(|e| StoreError::Corruption(format!("block record: {e}")))
}
