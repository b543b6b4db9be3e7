//! Exclusively-owned mutable state of the finality gadget.
//!
//! All mutation funnels through the engine; readers only ever observe a
//! fully committed state.

use crate::domain::{CheckpointLedger, ValidatorRegistry};
use crate::events::GadgetEvent;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Reward-adjustment factor converting raw deposits into scaled units.
/// Owned by the (external) reward module; the gadget only consumes it, and
/// it may change only between epochs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositScale {
    pub numerator: u64,
    pub denominator: u64,
}

impl DepositScale {
    /// Identity scale: scaled units equal raw units.
    pub fn identity() -> Self {
        Self {
            numerator: 1,
            denominator: 1,
        }
    }

    /// Convert a raw deposit amount into scaled units.
    pub fn apply(&self, raw: u128) -> u128 {
        let denominator = u128::from(self.denominator.max(1));
        raw.saturating_mul(u128::from(self.numerator)) / denominator
    }
}

impl Default for DepositScale {
    fn default() -> Self {
        Self::identity()
    }
}

/// Mutable gadget state, owned by the engine behind a single writer lock.
pub struct GadgetState {
    /// Checkpoints by epoch.
    pub ledger: CheckpointLedger,
    /// All validators ever inducted.
    pub registry: ValidatorRegistry,
    /// Highest epoch for which `initialize_epoch` has run.
    pub current_epoch: u64,
    /// Live dynasty counter, strictly monotonic.
    pub current_dynasty: u64,
    /// Raw deposit total of the current dynasty, recomputed at rollover.
    pub total_curdyn_deposits: u128,
    /// Raw deposit total of the previous dynasty.
    pub total_prevdyn_deposits: u128,
    /// Highest justified epoch.
    pub last_justified_epoch: u64,
    /// Highest finalized epoch, -1 until something finalizes.
    pub last_finalized_epoch: i64,
    /// Current reward-adjustment factor.
    pub deposit_scale: DepositScale,
    /// Events awaiting `take_events`.
    pub pending_events: Vec<GadgetEvent>,
}

impl GadgetState {
    /// Fresh state anchored on the justified genesis checkpoint.
    pub fn new(genesis_hash: Hash) -> Self {
        Self {
            ledger: CheckpointLedger::genesis(genesis_hash),
            registry: ValidatorRegistry::new(),
            current_epoch: 0,
            current_dynasty: 0,
            total_curdyn_deposits: 0,
            total_prevdyn_deposits: 0,
            last_justified_epoch: 0,
            last_finalized_epoch: -1,
            deposit_scale: DepositScale::identity(),
            pending_events: Vec::new(),
        }
    }

    /// Current-dynasty total in scaled units.
    pub fn scaled_curdyn_deposits(&self) -> u128 {
        self.deposit_scale.apply(self.total_curdyn_deposits)
    }

    /// Previous-dynasty total in scaled units.
    pub fn scaled_prevdyn_deposits(&self) -> u128 {
        self.deposit_scale.apply(self.total_prevdyn_deposits)
    }

    /// Whether live stake exists in both voting dynasties. When it does not,
    /// epoch initialization justifies and finalizes the ending epoch
    /// unconditionally so the chain can bootstrap and recover.
    pub fn deposits_exist(&self) -> bool {
        self.scaled_curdyn_deposits() > 0 && self.scaled_prevdyn_deposits() > 0
    }

    pub fn push_event(&mut self, event: GadgetEvent) {
        self.pending_events.push(event);
    }

    /// Take and clear pending events.
    pub fn take_events(&mut self) -> Vec<GadgetEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
