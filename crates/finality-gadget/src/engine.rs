//! Justification & finalization engine.
//!
//! A deterministic, strictly sequential state machine: every call commits
//! atomically under a single writer lock, and every participant that applies
//! the same call sequence derives bit-identical state.

use crate::domain::{has_supermajority, Checkpoint, DynastyKind, EpochClock, Vote};
use crate::error::{FinalityError, FinalityResult};
use crate::events::GadgetEvent;
use crate::metrics;
use crate::ports::inbound::{FinalityApi, VoteOutcome};
use crate::ports::outbound::{ChainView, VoteVerifier};
use crate::state::{DepositScale, GadgetState};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Address, Hash, PublicKey};
use std::sync::Arc;

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct GadgetConfig {
    /// Blocks per epoch.
    pub epoch_length: u64,
    /// Dynasties between a deposit/logout and its taking effect.
    pub dynasty_delay: u64,
    /// Re-verify vote signatures through the `VoteVerifier` port. Off by
    /// default: votes are assumed pre-authenticated by the surrounding
    /// stack.
    pub verify_signatures: bool,
}

impl Default for GadgetConfig {
    fn default() -> Self {
        Self {
            epoch_length: 50,
            dynasty_delay: 2,
            verify_signatures: false,
        }
    }
}

/// The finality gadget engine.
///
/// Owns the mutable state exclusively; the host chain and the vote
/// authenticator are reached through driven ports.
pub struct FinalityEngine<C, V>
where
    C: ChainView,
    V: VoteVerifier,
{
    config: GadgetConfig,
    clock: EpochClock,
    state: Arc<RwLock<GadgetState>>,
    chain: Arc<C>,
    verifier: Arc<V>,
}

impl<C, V> FinalityEngine<C, V>
where
    C: ChainView,
    V: VoteVerifier,
{
    /// Create an engine anchored on the given genesis checkpoint hash.
    pub fn new(config: GadgetConfig, genesis_hash: Hash, chain: Arc<C>, verifier: Arc<V>) -> Self {
        let clock = EpochClock::new(config.epoch_length);
        Self {
            config,
            clock,
            state: Arc::new(RwLock::new(GadgetState::new(genesis_hash))),
            chain,
            verifier,
        }
    }

    pub fn config(&self) -> &GadgetConfig {
        &self.config
    }

    /// With no live stake in one of the two voting dynasties, the
    /// supermajority rule is vacuous: the ending epoch justifies and
    /// finalizes unconditionally. This keeps the dynasty counter advancing
    /// on an empty chain, which is what lets a first deposit activate on
    /// schedule and the gadget recover after total stake loss.
    fn insta_finalize(state: &mut GadgetState, ending_epoch: u64) {
        let (justified_now, finalized_now) = match state.ledger.get_mut(ending_epoch) {
            Some(checkpoint) => (checkpoint.mark_justified(), checkpoint.mark_finalized()),
            None => return,
        };
        if justified_now {
            state.push_event(GadgetEvent::CheckpointJustified {
                epoch: ending_epoch,
            });
            metrics::record_checkpoint_justified();
        }
        if finalized_now {
            state.push_event(GadgetEvent::CheckpointFinalized {
                epoch: ending_epoch,
            });
            metrics::record_checkpoint_finalized();
        }
        state.last_justified_epoch = ending_epoch;
        state.last_finalized_epoch = ending_epoch as i64;
        tracing::debug!(
            epoch = ending_epoch,
            "no live deposits, epoch insta-finalized"
        );
    }

    /// Dynasty rollover, gated on justification of the ending epoch. An
    /// epoch with no justified predecessor does not start a new dynasty, so
    /// voting power carries forward unchanged through a streak of
    /// unjustified epochs.
    fn maybe_advance_dynasty(state: &mut GadgetState, ending_epoch: u64) {
        let ending_justified = state
            .ledger
            .get(ending_epoch)
            .map(Checkpoint::is_justified)
            .unwrap_or(false);
        if !ending_justified {
            return;
        }
        state.current_dynasty += 1;
        state.total_prevdyn_deposits = state.total_curdyn_deposits;
        state.total_curdyn_deposits = state
            .registry
            .total_stake_for_dynasty(state.current_dynasty);
        state.push_event(GadgetEvent::DynastyAdvanced {
            dynasty: state.current_dynasty,
            total_curdyn_deposits: state.total_curdyn_deposits,
            total_prevdyn_deposits: state.total_prevdyn_deposits,
        });
        metrics::set_current_dynasty(state.current_dynasty);
        tracing::info!(
            dynasty = state.current_dynasty,
            total_curdyn = state.total_curdyn_deposits,
            total_prevdyn = state.total_prevdyn_deposits,
            "dynasty advanced"
        );
    }
}

#[async_trait]
impl<C, V> FinalityApi for FinalityEngine<C, V>
where
    C: ChainView + 'static,
    V: VoteVerifier + 'static,
{
    async fn initialize_epoch(&self, epoch: u64) -> FinalityResult<()> {
        let head = self.chain.head_number().await?;
        let boundary_hash = self.chain.checkpoint_hash(epoch).await?;

        let mut state = self.state.write();

        if epoch != state.current_epoch + 1 {
            return Err(FinalityError::EpochOutOfSequence {
                epoch,
                current: state.current_epoch,
            });
        }
        let start_block = self.clock.start_block(epoch);
        if head < start_block {
            return Err(FinalityError::EpochNotReached {
                epoch,
                start_block,
                head,
            });
        }
        if state.ledger.contains(epoch) {
            return Err(FinalityError::CheckpointExists { epoch });
        }

        // Snapshot the scaled totals before any rollover: the new checkpoint
        // describes the boundary block of the epoch that just ended, so its
        // recorded totals lag the live ones by one epoch.
        let cur_snapshot = state.scaled_curdyn_deposits();
        let prev_snapshot = state.scaled_prevdyn_deposits();

        let ending_epoch = epoch - 1;
        if !state.deposits_exist() {
            Self::insta_finalize(&mut state, ending_epoch);
        }
        Self::maybe_advance_dynasty(&mut state, ending_epoch);

        state
            .ledger
            .create(epoch, boundary_hash, cur_snapshot, prev_snapshot)?;
        state.current_epoch = epoch;
        state.push_event(GadgetEvent::EpochInitialized {
            epoch,
            checkpoint_hash: boundary_hash,
        });
        metrics::set_current_epoch(epoch);
        tracing::info!(epoch, "epoch initialized");
        Ok(())
    }

    async fn vote(&self, vote: Vote) -> FinalityResult<VoteOutcome> {
        let mut state = self.state.write();
        let state = &mut *state;

        let (deposit, pubkey, in_current, in_previous) = {
            let validator = state.registry.get(vote.validator_index).ok_or(
                FinalityError::UnknownValidator {
                    index: vote.validator_index,
                },
            )?;
            let in_current = validator.is_in_dynasty(state.current_dynasty);
            let in_previous = state
                .current_dynasty
                .checked_sub(1)
                .map(|d| validator.is_in_dynasty(d))
                .unwrap_or(false);
            (validator.deposit, validator.pubkey, in_current, in_previous)
        };

        if vote.target_epoch != state.current_epoch {
            metrics::record_vote_rejected("target_epoch");
            return Err(FinalityError::TargetEpochMismatch {
                epoch: vote.target_epoch,
                current: state.current_epoch,
            });
        }
        let target = state
            .ledger
            .get(vote.target_epoch)
            .ok_or(FinalityError::CheckpointNotFound {
                epoch: vote.target_epoch,
            })?;
        if target.block_hash != vote.target_hash {
            metrics::record_vote_rejected("target_hash");
            return Err(FinalityError::TargetHashMismatch {
                epoch: vote.target_epoch,
            });
        }
        let source_justified = state
            .ledger
            .get(vote.source_epoch)
            .map(Checkpoint::is_justified)
            .unwrap_or(false);
        if !source_justified {
            metrics::record_vote_rejected("stale_source");
            return Err(FinalityError::StaleSource {
                source_epoch: vote.source_epoch,
            });
        }
        if !in_current && !in_previous {
            metrics::record_vote_rejected("not_live");
            return Err(FinalityError::NotLive {
                index: vote.validator_index,
                dynasty: state.current_dynasty,
            });
        }
        if self.config.verify_signatures && !self.verifier.verify(&vote, &pubkey) {
            metrics::record_vote_rejected("signature");
            return Err(FinalityError::InvalidSignature {
                index: vote.validator_index,
            });
        }

        // Dynasty membership is fixed within an epoch, so a duplicate in one
        // live dynasty implies a duplicate in the other.
        let already_voted = (in_current
            && target.has_voted(DynastyKind::Current, vote.validator_index))
            || (in_previous && target.has_voted(DynastyKind::Previous, vote.validator_index));
        if already_voted {
            tracing::debug!(
                validator = vote.validator_index,
                epoch = vote.target_epoch,
                "duplicate vote ignored"
            );
            return Ok(VoteOutcome::duplicate());
        }

        // Validation complete; everything below commits.
        let scaled_stake = state.deposit_scale.apply(deposit);
        let scaled_cur_total = state.scaled_curdyn_deposits();
        let scaled_prev_total = state.scaled_prevdyn_deposits();

        if in_current {
            state.ledger.record_vote_stake(
                vote.target_epoch,
                DynastyKind::Current,
                vote.validator_index,
                scaled_stake,
            )?;
        }
        if in_previous {
            state.ledger.record_vote_stake(
                vote.target_epoch,
                DynastyKind::Previous,
                vote.validator_index,
                scaled_stake,
            )?;
        }
        metrics::record_vote_counted();

        let mut outcome = VoteOutcome {
            counted: true,
            new_justified: None,
            new_finalized: None,
        };

        let reached_supermajority = {
            let checkpoint = state
                .ledger
                .get(vote.target_epoch)
                .ok_or(FinalityError::CheckpointNotFound {
                    epoch: vote.target_epoch,
                })?;
            has_supermajority(checkpoint.cur_dyn_voted, scaled_cur_total)
                && has_supermajority(checkpoint.prev_dyn_voted, scaled_prev_total)
        };

        if reached_supermajority {
            let justified_now = state
                .ledger
                .get_mut(vote.target_epoch)
                .map(Checkpoint::mark_justified)
                .unwrap_or(false);
            if justified_now {
                state.last_justified_epoch = vote.target_epoch;
                state.push_event(GadgetEvent::CheckpointJustified {
                    epoch: vote.target_epoch,
                });
                metrics::record_checkpoint_justified();
                tracing::info!(epoch = vote.target_epoch, "checkpoint justified");
                outcome.new_justified = Some(vote.target_epoch);

                // Finalization requires an unbroken two-checkpoint chain:
                // the justifying vote must point at the immediate
                // predecessor.
                if vote.source_epoch + 1 == vote.target_epoch {
                    let finalized_now = state
                        .ledger
                        .get_mut(vote.source_epoch)
                        .map(Checkpoint::mark_finalized)
                        .unwrap_or(false);
                    if finalized_now {
                        state.last_finalized_epoch = vote.source_epoch as i64;
                        state.push_event(GadgetEvent::CheckpointFinalized {
                            epoch: vote.source_epoch,
                        });
                        metrics::record_checkpoint_finalized();
                        tracing::info!(epoch = vote.source_epoch, "checkpoint finalized");
                        outcome.new_finalized = Some(vote.source_epoch);
                    }
                }
            }
        }

        Ok(outcome)
    }

    async fn deposit(
        &self,
        withdrawal_address: Address,
        pubkey: PublicKey,
        amount: u128,
    ) -> FinalityResult<u64> {
        let mut state = self.state.write();
        let start_dynasty = state.current_dynasty + self.config.dynasty_delay;
        let index = state
            .registry
            .deposit(withdrawal_address, pubkey, amount, start_dynasty);
        state.push_event(GadgetEvent::ValidatorDeposited {
            index,
            deposit: amount,
            start_dynasty,
        });
        tracing::info!(index, amount, start_dynasty, "validator deposited");
        Ok(index)
    }

    async fn logout(&self, validator_index: u64) -> FinalityResult<()> {
        let mut state = self.state.write();
        let end_dynasty = state.current_dynasty + self.config.dynasty_delay;
        let applied = state.registry.logout(validator_index, end_dynasty)?;
        if applied {
            state.push_event(GadgetEvent::ValidatorLoggedOut {
                index: validator_index,
                end_dynasty,
            });
            tracing::info!(index = validator_index, end_dynasty, "validator logout scheduled");
        }
        Ok(())
    }

    async fn highest_justified_epoch(&self, min_deposits: u128) -> u64 {
        let state = self.state.read();
        state.ledger.highest_justified(state.current_epoch, min_deposits)
    }

    async fn highest_finalized_epoch(&self, min_deposits: u128) -> i64 {
        let state = self.state.read();
        state.ledger.highest_finalized(state.current_epoch, min_deposits)
    }

    async fn checkpoint_cur_dyn_deposits(&self, epoch: u64) -> Option<u128> {
        self.state
            .read()
            .ledger
            .get(epoch)
            .map(|cp| cp.cur_dyn_deposits)
    }

    async fn checkpoint_prev_dyn_deposits(&self, epoch: u64) -> Option<u128> {
        self.state
            .read()
            .ledger
            .get(epoch)
            .map(|cp| cp.prev_dyn_deposits)
    }

    async fn get_checkpoint(&self, epoch: u64) -> Option<Checkpoint> {
        self.state.read().ledger.get(epoch).cloned()
    }

    async fn last_justified_epoch(&self) -> u64 {
        self.state.read().last_justified_epoch
    }

    async fn last_finalized_epoch(&self) -> i64 {
        self.state.read().last_finalized_epoch
    }

    async fn current_epoch(&self) -> u64 {
        self.state.read().current_epoch
    }

    async fn current_dynasty(&self) -> u64 {
        self.state.read().current_dynasty
    }

    async fn set_deposit_scale(&self, scale: DepositScale) -> FinalityResult<()> {
        if scale.denominator == 0 {
            return Err(FinalityError::InvalidScale);
        }
        let mut state = self.state.write();
        state.deposit_scale = scale;
        tracing::info!(
            numerator = scale.numerator,
            denominator = scale.denominator,
            "deposit scale updated"
        );
        Ok(())
    }

    async fn take_events(&self) -> Vec<GadgetEvent> {
        self.state.write().take_events()
    }
}
