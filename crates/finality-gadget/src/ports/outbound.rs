//! Driven ports (outbound dependencies).
//!
//! The gadget consumes the host chain through `ChainView` and delegates
//! vote authentication through `VoteVerifier`. Both sit at the component
//! boundary; everything behind them is external to the state machine.

use crate::domain::Vote;
use crate::error::FinalityResult;
use async_trait::async_trait;
use shared_types::{Hash, PublicKey};

/// Read-only view of the host chain.
///
/// Block production, hashing and storage are external; the gadget only
/// consumes block numbers and boundary hashes.
#[async_trait]
pub trait ChainView: Send + Sync {
    /// Current head block height.
    async fn head_number(&self) -> FinalityResult<u64>;

    /// Identifying hash of the given epoch's boundary block.
    async fn checkpoint_hash(&self, epoch: u64) -> FinalityResult<Hash>;
}

/// Vote signature verification.
///
/// Votes normally arrive pre-authenticated by the surrounding stack; the
/// engine re-checks them through this port only when configured to.
pub trait VoteVerifier: Send + Sync {
    /// Verify the vote's signature against the validator's registered key.
    fn verify(&self, vote: &Vote, pubkey: &PublicKey) -> bool;
}
