//! Outgoing events.
//!
//! The engine queues an event for every observable state transition; the
//! host drains them with `take_events` and forwards them to whatever
//! transport it runs on.

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// State transitions announced to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GadgetEvent {
    /// A new epoch's checkpoint was created.
    EpochInitialized { epoch: u64, checkpoint_hash: Hash },
    /// The dynasty counter advanced and the live stake totals rolled.
    DynastyAdvanced {
        dynasty: u64,
        total_curdyn_deposits: u128,
        total_prevdyn_deposits: u128,
    },
    /// A checkpoint reached the dual-dynasty supermajority.
    CheckpointJustified { epoch: u64 },
    /// A checkpoint became irreversible.
    CheckpointFinalized { epoch: u64 },
    /// A validator was inducted; it may vote from `start_dynasty` on.
    ValidatorDeposited {
        index: u64,
        deposit: u128,
        start_dynasty: u64,
    },
    /// A validator's logout was scheduled for `end_dynasty`.
    ValidatorLoggedOut { index: u64, end_dynasty: u64 },
}
