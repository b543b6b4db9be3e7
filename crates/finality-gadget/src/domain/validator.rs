//! Validator & dynasty registry
//!
//! Tracks each validator's raw deposit and its activation/deactivation
//! dynasty range. Dynasty membership is recomputed from the range bounds on
//! every query rather than stored as a flag, so it can never desync from the
//! bounds.

use crate::error::{FinalityError, FinalityResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, PublicKey};

/// Sentinel for a validator that has not logged out.
pub const END_DYNASTY_NONE: u64 = u64::MAX;

/// A registered validator. Never physically removed; its index is a stable id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Validator {
    /// Stable registry index.
    pub index: u64,
    /// Raw deposit amount (unscaled units).
    pub deposit: u128,
    /// First dynasty this validator may vote in.
    pub start_dynasty: u64,
    /// First dynasty this validator may no longer vote in
    /// ([`END_DYNASTY_NONE`] while active).
    pub end_dynasty: u64,
    /// Address funds return to on withdrawal.
    pub withdrawal_address: Address,
    /// Ed25519 key votes are signed with.
    pub pubkey: PublicKey,
}

impl Validator {
    /// Membership test: a validator is a member of dynasty `d` iff
    /// `start_dynasty <= d < end_dynasty`.
    pub fn is_in_dynasty(&self, dynasty: u64) -> bool {
        self.start_dynasty <= dynasty && dynasty < self.end_dynasty
    }

    /// True until logout is scheduled.
    pub fn is_active(&self) -> bool {
        self.end_dynasty == END_DYNASTY_NONE
    }
}

/// Registry of all validators ever inducted.
#[derive(Clone, Debug, Default)]
pub struct ValidatorRegistry {
    validators: Vec<Validator>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Induct a validator. The caller supplies the activation dynasty
    /// (current dynasty plus the activation delay) so that new stake cannot
    /// vote before the rest of the network has observed it.
    pub fn deposit(
        &mut self,
        withdrawal_address: Address,
        pubkey: PublicKey,
        amount: u128,
        start_dynasty: u64,
    ) -> u64 {
        let index = self.validators.len() as u64;
        self.validators.push(Validator {
            index,
            deposit: amount,
            start_dynasty,
            end_dynasty: END_DYNASTY_NONE,
            withdrawal_address,
            pubkey,
        });
        index
    }

    /// Schedule a logout. Returns `Ok(true)` when applied, `Ok(false)` when
    /// the validator had already logged out (idempotent no-op).
    pub fn logout(&mut self, index: u64, end_dynasty: u64) -> FinalityResult<bool> {
        let validator = self
            .validators
            .get_mut(index as usize)
            .ok_or(FinalityError::UnknownValidator { index })?;
        if !validator.is_active() {
            return Ok(false);
        }
        validator.end_dynasty = end_dynasty;
        Ok(true)
    }

    pub fn get(&self, index: u64) -> Option<&Validator> {
        self.validators.get(index as usize)
    }

    /// Dynasty membership for a known index; false for unknown indices.
    pub fn in_dynasty(&self, index: u64, dynasty: u64) -> bool {
        self.get(index)
            .map(|v| v.is_in_dynasty(dynasty))
            .unwrap_or(false)
    }

    /// Sum of raw deposits of all members of the given dynasty. Called at
    /// dynasty rollover, not per vote.
    pub fn total_stake_for_dynasty(&self, dynasty: u64) -> u128 {
        self.validators
            .iter()
            .filter(|v| v.is_in_dynasty(dynasty))
            .fold(0u128, |acc, v| acc.saturating_add(v.deposit))
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }
}
