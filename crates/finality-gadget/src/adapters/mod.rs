//! Adapters implementing the outbound ports.

pub mod chain;
pub mod vote_verifier;

pub use chain::InMemoryChainView;
pub use vote_verifier::{AcceptAllVoteVerifier, Ed25519VoteVerifier};
