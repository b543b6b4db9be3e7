//! # finality-gadget
//!
//! Hybrid finality gadget layered over a block-producing chain, in the
//! Casper FFG family: an epoch-based checkpoint tree where bonded
//! validators vote checkpoints from justified to finalized.
//!
//! ## Overview
//!
//! This crate provides:
//! - **Two-Phase Finality**: Checkpoints progress pending → justified → finalized
//! - **2/3 Threshold**: Supermajority stake in both live dynasties required
//! - **Dynasty Rotation**: Deposits and logouts take effect two dynasties out,
//!   gated on justification of the ending epoch
//! - **Deposit Scaling**: A rational scale factor applied uniformly to all
//!   stake, adjustable between epochs
//!
//! ## Architecture
//!
//! Hexagonal: the [`FinalityEngine`] sits behind the [`FinalityApi`] driving
//! port and reaches the host chain through driven ports.
//!
//! ```text
//! Host chain ──initialize_epoch / vote──→ FinalityEngine
//!                                              │
//!                                              ├── ChainView ──→ head height, boundary hashes
//!                                              │
//!                                              └── VoteVerifier ──→ signature checks (optional)
//! ```
//!
//! ## Determinism
//!
//! The engine is a sequential state machine: given the same call sequence,
//! every instance derives identical state. All external effects are surfaced
//! as [`GadgetEvent`]s drained through [`FinalityApi::take_events`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use finality_gadget::{FinalityEngine, GadgetConfig, FinalityApi};
//! use finality_gadget::adapters::{InMemoryChainView, AcceptAllVoteVerifier};
//! use std::sync::Arc;
//!
//! let chain = Arc::new(InMemoryChainView::new());
//! let engine = FinalityEngine::new(
//!     GadgetConfig::default(),
//!     genesis_hash,
//!     Arc::clone(&chain),
//!     Arc::new(AcceptAllVoteVerifier),
//! );
//!
//! // At each epoch boundary:
//! engine.initialize_epoch(epoch).await?;
//!
//! // As votes arrive:
//! let outcome = engine.vote(vote).await?;
//! if let Some(epoch) = outcome.new_finalized {
//!     // prune the chain up to the finalized checkpoint
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod state;

pub use domain::{
    Checkpoint, CheckpointLedger, CheckpointState, DynastyKind, EpochClock, Validator,
    ValidatorRegistry, Vote, VoteSignature, END_DYNASTY_NONE,
};
pub use engine::{FinalityEngine, GadgetConfig};
pub use error::{FinalityError, FinalityResult};
pub use events::GadgetEvent;
pub use ports::inbound::{FinalityApi, VoteOutcome};
pub use ports::outbound::{ChainView, VoteVerifier};
pub use state::{DepositScale, GadgetState};
