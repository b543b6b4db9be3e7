//! Chain View Adapter
//!
//! Implements the `ChainView` port over an in-memory picture of the host
//! chain. Embedders tracking a real chain supply their own implementation;
//! this one backs tests and single-process deployments.

use crate::error::FinalityResult;
use crate::ports::outbound::ChainView;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::Hash;
use std::collections::HashMap;

/// In-memory chain view.
///
/// Holds the current head height and the hash of each epoch boundary block.
/// Epochs without a registered hash get a deterministic placeholder so test
/// setups do not have to pin hashes they never inspect.
#[derive(Default)]
pub struct InMemoryChainView {
    head: RwLock<u64>,
    checkpoint_hashes: RwLock<HashMap<u64, Hash>>,
}

impl InMemoryChainView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance (or rewind) the head block number.
    pub fn set_head(&self, number: u64) {
        *self.head.write() = number;
    }

    /// Pin the boundary hash for an epoch.
    pub fn set_checkpoint_hash(&self, epoch: u64, hash: Hash) {
        self.checkpoint_hashes.write().insert(epoch, hash);
    }

    fn placeholder_hash(epoch: u64) -> Hash {
        let mut hash = [0u8; 32];
        hash[..8].copy_from_slice(&epoch.to_le_bytes());
        hash
    }
}

#[async_trait]
impl ChainView for InMemoryChainView {
    async fn head_number(&self) -> FinalityResult<u64> {
        Ok(*self.head.read())
    }

    async fn checkpoint_hash(&self, epoch: u64) -> FinalityResult<Hash> {
        Ok(self
            .checkpoint_hashes
            .read()
            .get(&epoch)
            .copied()
            .unwrap_or_else(|| Self::placeholder_hash(epoch)))
    }
}
