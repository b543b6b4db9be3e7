//! Vote entity
//!
//! A vote is a validator's causal claim that the target epoch's checkpoint
//! follows from a justified source checkpoint. Votes are ephemeral: their
//! effect on the ledger is permanent but the vote itself is not retained.

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Detached signature over a vote's signing message. Verification is owned
/// by the host; the gadget only forwards it through the
/// [`crate::ports::outbound::VoteVerifier`] port when configured to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSignature(pub Vec<u8>);

impl VoteSignature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A supermajority-link vote: `source -> target`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    /// Registry index of the voting validator.
    pub validator_index: u64,
    /// Epoch being voted on; must be the current epoch.
    pub target_epoch: u64,
    /// Checkpoint hash the vote commits to.
    pub target_hash: Hash,
    /// Justified ancestor the target is claimed to follow from.
    pub source_epoch: u64,
    /// Hash of the source checkpoint.
    pub source_hash: Hash,
    /// Signature over [`Vote::signing_message`], verified externally.
    pub signature: VoteSignature,
}

impl Vote {
    pub fn new(
        validator_index: u64,
        target_epoch: u64,
        target_hash: Hash,
        source_epoch: u64,
        source_hash: Hash,
        signature: VoteSignature,
    ) -> Self {
        Self {
            validator_index,
            target_epoch,
            target_hash,
            source_epoch,
            source_hash,
            signature,
        }
    }

    /// Canonical byte message the signature commits to.
    pub fn signing_message(&self) -> Vec<u8> {
        let mut message = Vec::with_capacity(88);
        message.extend_from_slice(&self.validator_index.to_le_bytes());
        message.extend_from_slice(&self.target_epoch.to_le_bytes());
        message.extend_from_slice(&self.target_hash);
        message.extend_from_slice(&self.source_epoch.to_le_bytes());
        message.extend_from_slice(&self.source_hash);
        message
    }
}
