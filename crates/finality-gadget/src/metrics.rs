//! # Finality Gadget Metrics
//!
//! Prometheus metrics for monitoring gadget progress and health.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! finality-gadget = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `finality_votes_counted_total` - Counter of votes counted toward a checkpoint
//! - `finality_votes_rejected_total` - Counter of rejected votes (by reason)
//! - `finality_checkpoints_justified_total` - Counter of justified checkpoints
//! - `finality_checkpoints_finalized_total` - Counter of finalized checkpoints
//! - `finality_current_epoch` - Gauge of the current epoch
//! - `finality_current_dynasty` - Gauge of the current dynasty

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, CounterVec, Gauge, IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total votes counted toward a checkpoint
    pub static ref VOTES_COUNTED: IntCounter = register_int_counter!(
        "finality_votes_counted_total",
        "Total number of votes counted toward a checkpoint"
    )
    .expect("Failed to create VOTES_COUNTED metric");

    /// Total votes rejected, labeled by reason
    pub static ref VOTES_REJECTED: CounterVec = register_counter_vec!(
        "finality_votes_rejected_total",
        "Total number of votes rejected",
        &["reason"]
    )
    .expect("Failed to create VOTES_REJECTED metric");

    /// Total checkpoints justified
    pub static ref CHECKPOINTS_JUSTIFIED: IntCounter = register_int_counter!(
        "finality_checkpoints_justified_total",
        "Total number of checkpoints justified"
    )
    .expect("Failed to create CHECKPOINTS_JUSTIFIED metric");

    /// Total checkpoints finalized
    pub static ref CHECKPOINTS_FINALIZED: IntCounter = register_int_counter!(
        "finality_checkpoints_finalized_total",
        "Total number of checkpoints finalized"
    )
    .expect("Failed to create CHECKPOINTS_FINALIZED metric");

    /// Current epoch
    pub static ref CURRENT_EPOCH: Gauge = register_gauge!(
        "finality_current_epoch",
        "Epoch the gadget is currently collecting votes for"
    )
    .expect("Failed to create CURRENT_EPOCH metric");

    /// Current dynasty
    pub static ref CURRENT_DYNASTY: Gauge = register_gauge!(
        "finality_current_dynasty",
        "Dynasty of the current validator set"
    )
    .expect("Failed to create CURRENT_DYNASTY metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a vote counted toward a checkpoint
#[cfg(feature = "metrics")]
pub fn record_vote_counted() {
    VOTES_COUNTED.inc();
}

/// Record vote rejected with reason
#[cfg(feature = "metrics")]
pub fn record_vote_rejected(reason: &str) {
    VOTES_REJECTED.with_label_values(&[reason]).inc();
}

/// Record a checkpoint justified
#[cfg(feature = "metrics")]
pub fn record_checkpoint_justified() {
    CHECKPOINTS_JUSTIFIED.inc();
}

/// Record a checkpoint finalized
#[cfg(feature = "metrics")]
pub fn record_checkpoint_finalized() {
    CHECKPOINTS_FINALIZED.inc();
}

/// Update current epoch gauge
#[cfg(feature = "metrics")]
pub fn set_current_epoch(epoch: u64) {
    CURRENT_EPOCH.set(epoch as f64);
}

/// Update current dynasty gauge
#[cfg(feature = "metrics")]
pub fn set_current_dynasty(dynasty: u64) {
    CURRENT_DYNASTY.set(dynasty as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_vote_counted() {}

#[cfg(not(feature = "metrics"))]
pub fn record_vote_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_checkpoint_justified() {}

#[cfg(not(feature = "metrics"))]
pub fn record_checkpoint_finalized() {}

#[cfg(not(feature = "metrics"))]
pub fn set_current_epoch(_epoch: u64) {}

#[cfg(not(feature = "metrics"))]
pub fn set_current_dynasty(_dynasty: u64) {}
