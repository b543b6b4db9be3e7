//! Driving port (inbound API).
//!
//! The single call surface of the gadget. Every call is applied atomically
//! in submission order; there is no partial effect.

use crate::domain::{Checkpoint, Vote};
use crate::error::FinalityResult;
use crate::events::GadgetEvent;
use crate::state::DepositScale;
use async_trait::async_trait;
use shared_types::{Address, PublicKey};

/// Result of processing one vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    /// False for a harmless duplicate (no state changed).
    pub counted: bool,
    /// Epoch that became justified because of this vote, if any.
    pub new_justified: Option<u64>,
    /// Epoch that became finalized because of this vote, if any.
    pub new_finalized: Option<u64>,
}

impl VoteOutcome {
    /// Outcome for a duplicate vote: counted nothing, changed nothing.
    pub fn duplicate() -> Self {
        Self {
            counted: false,
            new_justified: None,
            new_finalized: None,
        }
    }
}

/// Primary finality gadget API.
#[async_trait]
pub trait FinalityApi: Send + Sync {
    /// Initialize the next epoch. Strictly sequential: only
    /// `current_epoch() + 1` is accepted, and only once its boundary block
    /// height has been reached on the host chain.
    async fn initialize_epoch(&self, epoch: u64) -> FinalityResult<()>;

    /// Process one vote. Duplicate votes resolve to an uncounted
    /// [`VoteOutcome`], not an error.
    async fn vote(&self, vote: Vote) -> FinalityResult<VoteOutcome>;

    /// Induct a validator; it becomes a voting member after the configured
    /// dynasty delay. Returns the new validator's index.
    async fn deposit(
        &self,
        withdrawal_address: Address,
        pubkey: PublicKey,
        amount: u128,
    ) -> FinalityResult<u64>;

    /// Schedule a validator's logout after the configured dynasty delay;
    /// its stake keeps counting toward quorum until then.
    async fn logout(&self, validator_index: u64) -> FinalityResult<()>;

    /// Highest justified epoch whose checkpoint recorded at least
    /// `min_deposits` in both dynasty snapshots; 0 when none qualifies.
    async fn highest_justified_epoch(&self, min_deposits: u128) -> u64;

    /// Finalized counterpart of [`FinalityApi::highest_justified_epoch`];
    /// -1 when none qualifies.
    async fn highest_finalized_epoch(&self, min_deposits: u128) -> i64;

    /// Current-dynasty deposit snapshot of the given epoch's checkpoint.
    async fn checkpoint_cur_dyn_deposits(&self, epoch: u64) -> Option<u128>;

    /// Previous-dynasty deposit snapshot of the given epoch's checkpoint.
    async fn checkpoint_prev_dyn_deposits(&self, epoch: u64) -> Option<u128>;

    /// Full checkpoint record for an epoch.
    async fn get_checkpoint(&self, epoch: u64) -> Option<Checkpoint>;

    async fn last_justified_epoch(&self) -> u64;

    async fn last_finalized_epoch(&self) -> i64;

    async fn current_epoch(&self) -> u64;

    async fn current_dynasty(&self) -> u64;

    /// Swap in a new deposit scale factor. Must only be called between
    /// epochs; the gadget treats the factor as constant within an epoch.
    async fn set_deposit_scale(&self, scale: DepositScale) -> FinalityResult<()>;

    /// Drain pending outgoing events.
    async fn take_events(&self) -> Vec<GadgetEvent>;
}
