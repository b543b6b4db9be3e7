//! Error types for the finality gadget.
//!
//! Every rejection is total: a failed call leaves the gadget state untouched.
//! Duplicate votes are deliberately *not* an error variant; they are reported
//! as an uncounted [`crate::ports::inbound::VoteOutcome`] so benign
//! retransmission never surfaces as a failure.

use thiserror::Error;

/// Finality gadget errors.
#[derive(Debug, Error)]
pub enum FinalityError {
    /// Epoch initialization out of sequence (epochs are non-skippable).
    #[error("epoch {epoch} initialized out of sequence (current epoch is {current})")]
    EpochOutOfSequence { epoch: u64, current: u64 },

    /// Epoch initialization attempted before its boundary block exists.
    #[error("epoch {epoch} starts at block {start_block}, chain head is {head}")]
    EpochNotReached {
        epoch: u64,
        start_block: u64,
        head: u64,
    },

    /// Checkpoint for this epoch already has its hash set.
    #[error("checkpoint for epoch {epoch} already exists")]
    CheckpointExists { epoch: u64 },

    /// Checkpoint not found in the ledger.
    #[error("checkpoint not found: epoch {epoch}")]
    CheckpointNotFound { epoch: u64 },

    /// Vote or logout referencing a nonexistent validator index.
    #[error("unknown validator: index {index}")]
    UnknownValidator { index: u64 },

    /// Vote's source checkpoint is not justified.
    #[error("vote source epoch {source_epoch} is not justified")]
    StaleSource { source_epoch: u64 },

    /// Voting validator is not a member of either live dynasty.
    #[error("validator {index} is not live in dynasty {dynasty} or its predecessor")]
    NotLive { index: u64, dynasty: u64 },

    /// Vote targets an epoch other than the current one.
    #[error("vote targets epoch {epoch}, current epoch is {current}")]
    TargetEpochMismatch { epoch: u64, current: u64 },

    /// Vote's target hash does not match the checkpoint hash for that epoch.
    #[error("vote target hash does not match checkpoint hash for epoch {epoch}")]
    TargetHashMismatch { epoch: u64 },

    /// Vote signature failed verification.
    #[error("invalid vote signature from validator {index}")]
    InvalidSignature { index: u64 },

    /// Deposit scale factor with a zero denominator.
    #[error("deposit scale denominator must be nonzero")]
    InvalidScale,

    /// Host chain view is unavailable or returned bad data.
    #[error("chain view error: {reason}")]
    ChainView { reason: String },
}

/// Result type for finality operations.
pub type FinalityResult<T> = Result<T, FinalityError>;
