//! End-to-end scenarios driving the engine through the public port:
//! multi-epoch justification and finalization walks, the lagging
//! checkpoint deposit totals, and the deposit-floor epoch queries.

use finality_gadget::adapters::{AcceptAllVoteVerifier, InMemoryChainView};
use finality_gadget::{
    DepositScale, FinalityApi, FinalityEngine, GadgetConfig, Vote, VoteSignature,
};
use std::sync::Arc;

const DEPOSIT: u128 = 10_000;
const GENESIS_HASH: [u8; 32] = [0u8; 32];

struct Harness {
    engine: FinalityEngine<InMemoryChainView, AcceptAllVoteVerifier>,
    chain: Arc<InMemoryChainView>,
}

impl Harness {
    fn new() -> Self {
        let chain = Arc::new(InMemoryChainView::new());
        let engine = FinalityEngine::new(
            GadgetConfig::default(),
            GENESIS_HASH,
            Arc::clone(&chain),
            Arc::new(AcceptAllVoteVerifier),
        );
        Self { engine, chain }
    }

    /// Mine to the next epoch boundary and initialize it.
    async fn new_epoch(&self) {
        let next = self.engine.current_epoch().await + 1;
        self.chain
            .set_head(next * self.engine.config().epoch_length);
        self.engine.initialize_epoch(next).await.unwrap();
    }

    /// Build the vote a correct validator would cast right now: target the
    /// current checkpoint, source the last justified one.
    async fn suggested_vote(&self, validator_index: u64) -> Vote {
        let target_epoch = self.engine.current_epoch().await;
        let target_hash = self
            .engine
            .get_checkpoint(target_epoch)
            .await
            .unwrap()
            .block_hash;
        let source_epoch = self.engine.last_justified_epoch().await;
        let source_hash = self
            .engine
            .get_checkpoint(source_epoch)
            .await
            .map(|cp| cp.block_hash)
            .unwrap_or_default();
        Vote::new(
            validator_index,
            target_epoch,
            target_hash,
            source_epoch,
            source_hash,
            VoteSignature::default(),
        )
    }

    async fn vote(&self, validator_index: u64) {
        let vote = self.suggested_vote(validator_index).await;
        let outcome = self.engine.vote(vote).await.unwrap();
        assert!(outcome.counted);
    }

    /// Deposit during epoch 1 and run epochs until the validator's dynasty
    /// starts. Leaves the harness at epoch 3 with the validator live.
    async fn induct_validator(&self, amount: u128) -> u64 {
        self.new_epoch().await;
        let index = self
            .engine
            .deposit([1u8; 20], [1u8; 32], amount)
            .await
            .unwrap();
        self.new_epoch().await;
        self.new_epoch().await;
        index
    }

    async fn checkpoint_deposits(&self, epoch: u64) -> (u128, u128) {
        (
            self.engine
                .checkpoint_cur_dyn_deposits(epoch)
                .await
                .unwrap(),
            self.engine
                .checkpoint_prev_dyn_deposits(epoch)
                .await
                .unwrap(),
        )
    }
}

#[tokio::test]
async fn default_epoch_queries_before_any_epoch() {
    let harness = Harness::new();
    for min_deposits in [0u128, 1, 10_000, 40_000_000_000, u128::MAX / 4] {
        assert_eq!(harness.engine.highest_justified_epoch(min_deposits).await, 0);
        assert_eq!(
            harness.engine.highest_finalized_epoch(min_deposits).await,
            -1
        );
    }
}

#[tokio::test]
async fn epoch_queries_with_no_validators() {
    let harness = Harness::new();
    for _ in 0..5 {
        let current = harness.engine.current_epoch().await;
        let last_justified = harness.engine.last_justified_epoch().await;
        let last_finalized = harness.engine.last_finalized_epoch().await;

        // With no deposit floor the scans track the live markers; with any
        // floor at all, no checkpoint carries enough stake.
        assert_eq!(harness.engine.highest_justified_epoch(0).await, last_justified);
        if current == 0 {
            assert_eq!(harness.engine.highest_finalized_epoch(0).await, -1);
        } else {
            assert_eq!(
                harness.engine.highest_finalized_epoch(0).await,
                last_finalized
            );
        }
        for min_deposits in [1u128, 10_000, 40_000_000_000] {
            assert_eq!(harness.engine.highest_justified_epoch(min_deposits).await, 0);
            assert_eq!(
                harness.engine.highest_finalized_epoch(min_deposits).await,
                -1
            );
        }

        harness.new_epoch().await;
    }
}

#[tokio::test]
async fn empty_chain_keeps_insta_finalizing() {
    let harness = Harness::new();
    for _ in 0..5 {
        harness.new_epoch().await;
        let current = harness.engine.current_epoch().await;
        assert_eq!(harness.engine.last_justified_epoch().await, current - 1);
        assert_eq!(
            harness.engine.last_finalized_epoch().await,
            (current - 1) as i64
        );
        assert_eq!(harness.engine.current_dynasty().await, current);
    }
}

#[tokio::test]
async fn checkpoint_deposit_totals_lag_one_epoch() {
    let harness = Harness::new();
    assert_eq!(harness.checkpoint_deposits(0).await, (0, 0));

    harness.new_epoch().await;
    assert_eq!(harness.checkpoint_deposits(1).await, (0, 0));

    let validator = harness
        .engine
        .deposit([1u8; 20], [1u8; 32], DEPOSIT)
        .await
        .unwrap();

    harness.new_epoch().await;
    assert_eq!(harness.checkpoint_deposits(2).await, (0, 0));

    harness.new_epoch().await;
    // The live totals now carry the deposit, but the checkpoint records
    // the previous epoch's boundary and still reads zero.
    assert_eq!(harness.checkpoint_deposits(3).await, (0, 0));

    harness.vote(validator).await;
    harness.new_epoch().await;
    assert_eq!(harness.checkpoint_deposits(4).await, (DEPOSIT, 0));
}

#[tokio::test]
async fn single_validator_walk() {
    let harness = Harness::new();
    let engine = &harness.engine;
    let validator = harness.induct_validator(DEPOSIT).await;
    let higher = DEPOSIT + DEPOSIT / 10;

    assert_eq!(engine.current_epoch().await, 3);
    assert_eq!(engine.highest_justified_epoch(DEPOSIT).await, 0);
    assert_eq!(engine.highest_finalized_epoch(DEPOSIT).await, -1);
    assert_eq!(engine.highest_justified_epoch(0).await, 2);
    assert_eq!(engine.highest_finalized_epoch(0).await, 2);
    assert_eq!(engine.highest_justified_epoch(higher).await, 0);
    assert_eq!(engine.highest_finalized_epoch(higher).await, -1);

    // epoch 3: the first real vote justifies 3 and finalizes 2
    harness.vote(validator).await;
    assert_eq!(harness.checkpoint_deposits(3).await, (0, 0));
    assert_eq!(engine.last_justified_epoch().await, 3);
    assert_eq!(engine.last_finalized_epoch().await, 2);
    assert_eq!(engine.highest_justified_epoch(DEPOSIT).await, 0);
    assert_eq!(engine.highest_finalized_epoch(DEPOSIT).await, -1);
    assert_eq!(engine.highest_justified_epoch(0).await, 3);
    assert_eq!(engine.highest_finalized_epoch(0).await, 2);

    // epoch 4: checkpoint totals start catching up
    harness.new_epoch().await;
    harness.vote(validator).await;
    assert_eq!(harness.checkpoint_deposits(4).await, (DEPOSIT, 0));
    assert_eq!(engine.last_justified_epoch().await, 4);
    assert_eq!(engine.last_finalized_epoch().await, 3);
    assert_eq!(engine.highest_justified_epoch(DEPOSIT).await, 0);
    assert_eq!(engine.highest_finalized_epoch(DEPOSIT).await, -1);

    // epoch 5: both dynasty totals recorded; justified scan clears the
    // floor but the finalized one does not yet
    harness.new_epoch().await;
    harness.vote(validator).await;
    assert_eq!(harness.checkpoint_deposits(5).await, (DEPOSIT, DEPOSIT));
    assert_eq!(engine.last_justified_epoch().await, 5);
    assert_eq!(engine.last_finalized_epoch().await, 4);
    assert_eq!(engine.highest_justified_epoch(DEPOSIT).await, 5);
    assert_eq!(engine.highest_finalized_epoch(DEPOSIT).await, -1);
    assert_eq!(engine.highest_justified_epoch(0).await, 5);
    assert_eq!(engine.highest_finalized_epoch(0).await, 4);
    assert_eq!(engine.highest_justified_epoch(higher).await, 0);
    assert_eq!(engine.highest_finalized_epoch(higher).await, -1);

    // epoch 6: now a finalized checkpoint clears the floor too
    harness.new_epoch().await;
    harness.vote(validator).await;
    assert_eq!(harness.checkpoint_deposits(6).await, (DEPOSIT, DEPOSIT));
    assert_eq!(engine.last_justified_epoch().await, 6);
    assert_eq!(engine.last_finalized_epoch().await, 5);
    assert_eq!(engine.highest_justified_epoch(DEPOSIT).await, 6);
    assert_eq!(engine.highest_finalized_epoch(DEPOSIT).await, 5);

    // epoch 7: no vote, nothing moves
    harness.new_epoch().await;
    assert_eq!(engine.last_justified_epoch().await, 6);
    assert_eq!(engine.last_finalized_epoch().await, 5);
    assert_eq!(engine.highest_justified_epoch(DEPOSIT).await, 6);
    assert_eq!(engine.highest_finalized_epoch(DEPOSIT).await, 5);

    // epoch 8: the vote re-justifies but the justified epochs are not
    // consecutive, so nothing new finalizes
    harness.new_epoch().await;
    harness.vote(validator).await;
    assert_eq!(engine.last_justified_epoch().await, 8);
    assert_eq!(engine.last_finalized_epoch().await, 5);
    assert_eq!(engine.highest_justified_epoch(DEPOSIT).await, 8);
    assert_eq!(engine.highest_finalized_epoch(DEPOSIT).await, 5);

    // epoch 9: consecutive again, finalization resumes
    harness.new_epoch().await;
    harness.vote(validator).await;
    assert_eq!(engine.last_justified_epoch().await, 9);
    assert_eq!(engine.last_finalized_epoch().await, 8);
    assert_eq!(engine.highest_justified_epoch(DEPOSIT).await, 9);
    assert_eq!(engine.highest_finalized_epoch(DEPOSIT).await, 8);
    assert_eq!(engine.highest_justified_epoch(higher).await, 0);
    assert_eq!(engine.highest_finalized_epoch(higher).await, -1);
}

#[tokio::test]
async fn minority_stake_cannot_justify() {
    let harness = Harness::new();
    harness.new_epoch().await;
    // Three equal validators; one abstainer still leaves a supermajority,
    // a single voter does not.
    let mut validators = Vec::new();
    for i in 0..3u8 {
        let index = harness
            .engine
            .deposit([i; 20], [i; 32], DEPOSIT)
            .await
            .unwrap();
        validators.push(index);
    }
    harness.new_epoch().await;
    harness.new_epoch().await;
    assert_eq!(harness.engine.current_epoch().await, 3);

    harness.vote(validators[0]).await;
    assert_eq!(harness.engine.last_justified_epoch().await, 2);

    harness.vote(validators[1]).await;
    assert_eq!(harness.engine.last_justified_epoch().await, 3);
    assert_eq!(harness.engine.last_finalized_epoch().await, 2);
}

#[tokio::test]
async fn logged_out_validator_stops_counting() {
    let harness = Harness::new();
    let validator = harness.induct_validator(DEPOSIT).await;

    harness.vote(validator).await;
    harness.engine.logout(validator).await.unwrap();
    // Repeated logout is a no-op.
    harness.engine.logout(validator).await.unwrap();

    // end_dynasty = 5; the validator stays live through dynasty 4 as the
    // current set and through dynasty 5 as the previous one.
    for _ in 0..2 {
        harness.new_epoch().await;
        harness.vote(validator).await;
    }
    assert_eq!(harness.engine.last_justified_epoch().await, 5);

    // Past the end dynasty the validator is in neither live set.
    harness.new_epoch().await;
    let late_vote = harness.suggested_vote(validator).await;
    assert!(matches!(
        harness.engine.vote(late_vote).await,
        Err(finality_gadget::FinalityError::NotLive { .. })
    ));

    // With the stake drained out of the live totals the gadget falls back
    // to insta-finalization.
    harness.new_epoch().await;
    let current = harness.engine.current_epoch().await;
    assert_eq!(harness.engine.last_justified_epoch().await, current - 1);
    assert_eq!(
        harness.engine.last_finalized_epoch().await,
        (current - 1) as i64
    );
}

#[tokio::test]
async fn deposit_scale_shrinks_voting_stake_uniformly() {
    let harness = Harness::new();
    let validator = harness.induct_validator(DEPOSIT).await;
    harness.vote(validator).await;

    // Halving every deposit leaves the supermajority fraction untouched.
    harness
        .engine
        .set_deposit_scale(DepositScale {
            numerator: 1,
            denominator: 2,
        })
        .await
        .unwrap();

    harness.new_epoch().await;
    harness.vote(validator).await;
    assert_eq!(harness.engine.last_justified_epoch().await, 4);
    assert_eq!(harness.checkpoint_deposits(4).await, (DEPOSIT / 2, 0));
}

#[tokio::test]
async fn events_cover_a_full_justification_round() {
    use finality_gadget::GadgetEvent;

    let harness = Harness::new();
    let validator = harness.induct_validator(DEPOSIT).await;

    // Induction spans epochs with no live stake in both dynasties, so the
    // finalization of checkpoint 2 was announced by epoch initialization.
    let setup_events = harness.engine.take_events().await;
    assert!(setup_events.contains(&GadgetEvent::CheckpointFinalized { epoch: 2 }));

    // The epoch-3 vote justifies its target; nothing new finalizes because
    // checkpoint 2 is already final.
    harness.vote(validator).await;
    let events = harness.engine.take_events().await;
    assert!(events.contains(&GadgetEvent::CheckpointJustified { epoch: 3 }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, GadgetEvent::CheckpointFinalized { .. })));

    // Epoch 4 still lacks prev-dynasty stake, so initialization finalizes
    // checkpoint 3 before the vote lands.
    harness.new_epoch().await;
    let events = harness.engine.take_events().await;
    assert!(events.contains(&GadgetEvent::CheckpointFinalized { epoch: 3 }));
    harness.vote(validator).await;

    // From epoch 5 on both dynasty totals are live: the vote alone
    // justifies its target and finalizes the predecessor.
    harness.new_epoch().await;
    harness.engine.take_events().await;
    harness.vote(validator).await;
    let events = harness.engine.take_events().await;
    assert!(events.contains(&GadgetEvent::CheckpointJustified { epoch: 5 }));
    assert!(events.contains(&GadgetEvent::CheckpointFinalized { epoch: 4 }));
}
