//! Domain module for the finality gadget.
//!
//! - epoch: block-height to epoch conversion
//! - validator: validator registry and dynasty membership
//! - checkpoint: per-epoch checkpoint entity and state machine
//! - ledger: checkpoint storage and the epoch query scans
//! - vote: the supermajority-link vote entity

pub mod checkpoint;
pub mod epoch;
pub mod ledger;
pub mod validator;
pub mod vote;

pub use checkpoint::{has_supermajority, Checkpoint, CheckpointState, DynastyKind};
pub use epoch::EpochClock;
pub use ledger::CheckpointLedger;
pub use validator::{Validator, ValidatorRegistry, END_DYNASTY_NONE};
pub use vote::{Vote, VoteSignature};
