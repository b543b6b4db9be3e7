//! Checkpoint ledger
//!
//! One record per epoch, addressable by epoch number for O(1) lookup. The
//! backward scans behind `highest_justified_epoch` / `highest_finalized_epoch`
//! live here as pure reads.

use crate::domain::checkpoint::{Checkpoint, DynastyKind};
use crate::error::{FinalityError, FinalityResult};
use shared_types::Hash;
use std::collections::HashMap;

/// Ledger of all checkpoints, keyed by epoch.
#[derive(Clone, Debug)]
pub struct CheckpointLedger {
    checkpoints: HashMap<u64, Checkpoint>,
}

impl CheckpointLedger {
    /// Ledger seeded with the justified genesis checkpoint.
    pub fn genesis(genesis_hash: Hash) -> Self {
        let mut checkpoints = HashMap::new();
        checkpoints.insert(0, Checkpoint::genesis(genesis_hash));
        Self { checkpoints }
    }

    /// Create the checkpoint for a newly initialized epoch. Fails if the
    /// epoch already has a checkpoint (idempotency guard).
    pub fn create(
        &mut self,
        epoch: u64,
        block_hash: Hash,
        cur_dyn_deposits: u128,
        prev_dyn_deposits: u128,
    ) -> FinalityResult<()> {
        if self.checkpoints.contains_key(&epoch) {
            return Err(FinalityError::CheckpointExists { epoch });
        }
        self.checkpoints.insert(
            epoch,
            Checkpoint::new(epoch, block_hash, cur_dyn_deposits, prev_dyn_deposits),
        );
        Ok(())
    }

    pub fn get(&self, epoch: u64) -> Option<&Checkpoint> {
        self.checkpoints.get(&epoch)
    }

    pub fn get_mut(&mut self, epoch: u64) -> Option<&mut Checkpoint> {
        self.checkpoints.get_mut(&epoch)
    }

    pub fn contains(&self, epoch: u64) -> bool {
        self.checkpoints.contains_key(&epoch)
    }

    /// Add scaled voted stake to a checkpoint's dynasty accumulator. The
    /// only voted-stake mutator; returns false when the validator's vote was
    /// already counted for that dynasty.
    pub fn record_vote_stake(
        &mut self,
        epoch: u64,
        kind: DynastyKind,
        validator_index: u64,
        scaled_stake: u128,
    ) -> FinalityResult<bool> {
        let checkpoint = self
            .checkpoints
            .get_mut(&epoch)
            .ok_or(FinalityError::CheckpointNotFound { epoch })?;
        Ok(checkpoint.record_vote(kind, validator_index, scaled_stake))
    }

    /// Highest justified epoch whose both deposit snapshots reach
    /// `min_deposits`. Epoch 0 is the unconditional justified floor.
    pub fn highest_justified(&self, current_epoch: u64, min_deposits: u128) -> u64 {
        for epoch in (0..=current_epoch).rev() {
            if let Some(cp) = self.checkpoints.get(&epoch) {
                if cp.is_justified()
                    && cp.cur_dyn_deposits >= min_deposits
                    && cp.prev_dyn_deposits >= min_deposits
                {
                    return epoch;
                }
            }
        }
        0
    }

    /// Highest finalized epoch whose both deposit snapshots reach
    /// `min_deposits`; -1 when nothing qualifies (there is no finalized
    /// floor).
    pub fn highest_finalized(&self, current_epoch: u64, min_deposits: u128) -> i64 {
        for epoch in (0..=current_epoch).rev() {
            if let Some(cp) = self.checkpoints.get(&epoch) {
                if cp.is_finalized()
                    && cp.cur_dyn_deposits >= min_deposits
                    && cp.prev_dyn_deposits >= min_deposits
                {
                    return epoch as i64;
                }
            }
        }
        -1
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
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

    fn ledger_with_epochs(count: u64) -> CheckpointLedger {
        let mut ledger = CheckpointLedger::genesis(test_hash(0));
        for epoch in 1..=count {
            ledger
                .create(epoch, test_hash(epoch as u8), 0, 0)
                .unwrap();
        }
        ledger
    }

    #[test]
    fn create_is_guarded_against_overwrite() {
        let mut ledger = CheckpointLedger::genesis(test_hash(0));
        ledger.create(1, test_hash(1), 10, 10).unwrap();
        assert!(matches!(
            ledger.create(1, test_hash(2), 10, 10),
            Err(FinalityError::CheckpointExists { epoch: 1 })
        ));
        // Original hash untouched.
        assert_eq!(ledger.get(1).unwrap().block_hash, test_hash(1));
    }

    #[test]
    fn record_vote_stake_requires_checkpoint() {
        let mut ledger = CheckpointLedger::genesis(test_hash(0));
        assert!(matches!(
            ledger.record_vote_stake(5, DynastyKind::Current, 0, 100),
            Err(FinalityError::CheckpointNotFound { epoch: 5 })
        ));
    }

    #[test]
    fn highest_justified_scans_backward_with_threshold() {
        let mut ledger = ledger_with_epochs(6);
        for epoch in [3u64, 5] {
            ledger.get_mut(epoch).unwrap().mark_justified();
        }
        ledger.get_mut(3).unwrap().cur_dyn_deposits = 40;
        ledger.get_mut(3).unwrap().prev_dyn_deposits = 40;
        ledger.get_mut(5).unwrap().cur_dyn_deposits = 40;
        ledger.get_mut(5).unwrap().prev_dyn_deposits = 10;

        assert_eq!(ledger.highest_justified(6, 0), 5);
        // Epoch 5 fails the prev-dynasty threshold, epoch 3 passes both.
        assert_eq!(ledger.highest_justified(6, 20), 3);
        // Nothing reaches 50: fall back to the genesis floor.
        assert_eq!(ledger.highest_justified(6, 50), 0);
    }

    #[test]
    fn highest_finalized_defaults_to_minus_one() {
        let mut ledger = ledger_with_epochs(4);
        assert_eq!(ledger.highest_finalized(4, 0), -1);

        let cp = ledger.get_mut(2).unwrap();
        cp.mark_justified();
        cp.mark_finalized();
        cp.cur_dyn_deposits = 30;
        cp.prev_dyn_deposits = 30;

        assert_eq!(ledger.highest_finalized(4, 0), 2);
        assert_eq!(ledger.highest_finalized(4, 30), 2);
        assert_eq!(ledger.highest_finalized(4, 31), -1);
    }

    #[test]
    fn queries_are_safe_at_genesis() {
        let ledger = CheckpointLedger::genesis(test_hash(0));
        assert_eq!(ledger.highest_justified(0, 0), 0);
        assert_eq!(ledger.highest_justified(0, 1), 0);
        assert_eq!(ledger.highest_finalized(0, 0), -1);
    }
}
