//! Checkpoint entity
//!
//! One checkpoint per epoch, holding the boundary block hash, the lagging
//! deposit snapshots the epoch queries compare against, and the monotone
//! voted-stake accumulators the supermajority rule consumes.
//!
//! State progression: Pending -> Justified -> Finalized, strictly forward.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Checkpoint finality state.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CheckpointState {
    /// Not yet justified - awaiting votes.
    #[default]
    Pending,
    /// 2/3 of both live dynasties' stake voted for it.
    Justified,
    /// Promoted by a consecutive justified successor - irreversible.
    Finalized,
}

/// Which of the two live dynasties a vote is counted toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynastyKind {
    Current,
    Previous,
}

/// A finality checkpoint at an epoch boundary.
#[derive(Clone, Debug)]
pub struct Checkpoint {
    /// Epoch number (checkpoint identifier).
    pub epoch: u64,
    /// Boundary block hash, set once at epoch initialization.
    pub block_hash: Hash,
    /// Current state of this checkpoint.
    pub state: CheckpointState,
    /// Scaled current-dynasty deposit total snapshotted at creation. The
    /// snapshot is taken before any dynasty rollover in the same epoch
    /// initialization, so it lags the live totals by one epoch.
    pub cur_dyn_deposits: u128,
    /// Scaled previous-dynasty deposit total snapshotted at creation.
    pub prev_dyn_deposits: u128,
    /// Scaled stake voted for this checkpoint by current-dynasty members.
    pub cur_dyn_voted: u128,
    /// Scaled stake voted for this checkpoint by previous-dynasty members.
    pub prev_dyn_voted: u128,
    /// Which validator indices already voted, per dynasty.
    cur_dyn_voters: BitVec<u8, Msb0>,
    prev_dyn_voters: BitVec<u8, Msb0>,
}

impl Checkpoint {
    /// Create a pending checkpoint with its deposit snapshots.
    pub fn new(epoch: u64, block_hash: Hash, cur_dyn_deposits: u128, prev_dyn_deposits: u128) -> Self {
        Self {
            epoch,
            block_hash,
            state: CheckpointState::Pending,
            cur_dyn_deposits,
            prev_dyn_deposits,
            cur_dyn_voted: 0,
            prev_dyn_voted: 0,
            cur_dyn_voters: BitVec::new(),
            prev_dyn_voters: BitVec::new(),
        }
    }

    /// The genesis anchor: justified from the start, never voted on.
    pub fn genesis(block_hash: Hash) -> Self {
        let mut checkpoint = Self::new(0, block_hash, 0, 0);
        checkpoint.state = CheckpointState::Justified;
        checkpoint
    }

    pub fn is_justified(&self) -> bool {
        self.state >= CheckpointState::Justified
    }

    pub fn is_finalized(&self) -> bool {
        self.state == CheckpointState::Finalized
    }

    /// Whether the validator's vote was already counted for this dynasty.
    pub fn has_voted(&self, kind: DynastyKind, validator_index: u64) -> bool {
        let bitmap = self.voters(kind);
        bitmap
            .get(validator_index as usize)
            .map(|b| *b)
            .unwrap_or(false)
    }

    /// Count a vote's scaled stake toward the given dynasty. Returns false
    /// without mutating when the validator already voted (idempotent no-op).
    pub fn record_vote(&mut self, kind: DynastyKind, validator_index: u64, scaled_stake: u128) -> bool {
        if self.has_voted(kind, validator_index) {
            return false;
        }
        let index = validator_index as usize;
        let bitmap = self.voters_mut(kind);
        if bitmap.len() <= index {
            bitmap.resize(index + 1, false);
        }
        bitmap.set(index, true);
        match kind {
            DynastyKind::Current => {
                self.cur_dyn_voted = self.cur_dyn_voted.saturating_add(scaled_stake);
            }
            DynastyKind::Previous => {
                self.prev_dyn_voted = self.prev_dyn_voted.saturating_add(scaled_stake);
            }
        }
        true
    }

    /// Voted-stake accumulator for the given dynasty.
    pub fn voted_stake(&self, kind: DynastyKind) -> u128 {
        match kind {
            DynastyKind::Current => self.cur_dyn_voted,
            DynastyKind::Previous => self.prev_dyn_voted,
        }
    }

    /// Pending -> Justified. Returns true if the state changed.
    pub fn mark_justified(&mut self) -> bool {
        if self.state == CheckpointState::Pending {
            self.state = CheckpointState::Justified;
            true
        } else {
            false
        }
    }

    /// Justified -> Finalized. Returns true if the state changed.
    pub fn mark_finalized(&mut self) -> bool {
        if self.state == CheckpointState::Justified {
            self.state = CheckpointState::Finalized;
            true
        } else {
            false
        }
    }

    fn voters(&self, kind: DynastyKind) -> &BitVec<u8, Msb0> {
        match kind {
            DynastyKind::Current => &self.cur_dyn_voters,
            DynastyKind::Previous => &self.prev_dyn_voters,
        }
    }

    fn voters_mut(&mut self, kind: DynastyKind) -> &mut BitVec<u8, Msb0> {
        match kind {
            DynastyKind::Current => &mut self.cur_dyn_voters,
            DynastyKind::Previous => &mut self.prev_dyn_voters,
        }
    }
}

/// The 2/3 supermajority rule: `3 * voted >= 2 * total`.
///
/// Uses checked arithmetic; near `u128::MAX` both sides are scaled down
/// instead of overflowing.
pub fn has_supermajority(voted_stake: u128, total_stake: u128) -> bool {
    match (voted_stake.checked_mul(3), total_stake.checked_mul(2)) {
        (Some(lhs), Some(rhs)) => lhs >= rhs,
        _ => voted_stake / 2 >= total_stake / 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_hash(n: u8) -> Hash {
        let mut hash = [0u8; 32];
        hash[0] = n;
        hash
    }

    #[test]
    fn state_ordering() {
        assert!(CheckpointState::Pending < CheckpointState::Justified);
        assert!(CheckpointState::Justified < CheckpointState::Finalized);
    }

    #[test]
    fn genesis_is_justified_not_finalized() {
        let genesis = Checkpoint::genesis(test_hash(0));
        assert!(genesis.is_justified());
        assert!(!genesis.is_finalized());
    }

    #[test]
    fn record_vote_accumulates_per_dynasty() {
        let mut cp = Checkpoint::new(3, test_hash(3), 100, 100);

        assert!(cp.record_vote(DynastyKind::Current, 0, 60));
        assert!(cp.record_vote(DynastyKind::Previous, 0, 60));
        assert!(cp.record_vote(DynastyKind::Current, 7, 40));

        assert_eq!(cp.voted_stake(DynastyKind::Current), 100);
        assert_eq!(cp.voted_stake(DynastyKind::Previous), 60);
    }

    #[test]
    fn duplicate_vote_is_noop() {
        let mut cp = Checkpoint::new(3, test_hash(3), 100, 100);

        assert!(cp.record_vote(DynastyKind::Current, 5, 70));
        assert!(!cp.record_vote(DynastyKind::Current, 5, 70));
        assert_eq!(cp.voted_stake(DynastyKind::Current), 70);
        assert!(cp.has_voted(DynastyKind::Current, 5));
        assert!(!cp.has_voted(DynastyKind::Previous, 5));
    }

    #[test]
    fn forward_only_state_machine() {
        let mut cp = Checkpoint::new(1, test_hash(1), 0, 0);

        // Cannot finalize a pending checkpoint.
        assert!(!cp.mark_finalized());
        assert!(cp.mark_justified());
        assert!(!cp.mark_justified());
        assert!(cp.mark_finalized());
        assert!(!cp.mark_finalized());
        assert_eq!(cp.state, CheckpointState::Finalized);
    }

    #[test]
    fn supermajority_threshold() {
        assert!(has_supermajority(67, 100));
        assert!(!has_supermajority(66, 100));
        assert!(has_supermajority(2, 3));
        // Both totals zero satisfies the rule trivially.
        assert!(has_supermajority(0, 0));
    }

    #[test]
    fn supermajority_near_overflow() {
        let total = u128::MAX - 1;
        assert!(has_supermajority(total, total));
        assert!(!has_supermajority(total / 2, total));
    }
}
