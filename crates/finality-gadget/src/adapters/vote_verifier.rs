//! Vote Verifier Adapters
//!
//! Implements the `VoteVerifier` port. The engine only consults the
//! verifier when `verify_signatures` is enabled; deployments where votes
//! arrive pre-authenticated use `AcceptAllVoteVerifier`.

use crate::domain::Vote;
use crate::ports::outbound::VoteVerifier;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use shared_types::PublicKey;

/// Verifier that accepts every vote. For embedders whose transport layer
/// authenticates messages before they reach the gadget.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllVoteVerifier;

impl VoteVerifier for AcceptAllVoteVerifier {
    fn verify(&self, _vote: &Vote, _pubkey: &PublicKey) -> bool {
        true
    }
}

/// Ed25519 verifier checking each vote's signature over its canonical
/// signing message against the validator's registered public key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519VoteVerifier;

impl VoteVerifier for Ed25519VoteVerifier {
    fn verify(&self, vote: &Vote, pubkey: &PublicKey) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(pubkey) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&vote.signature.0) else {
            return false;
        };
        verifying_key
            .verify(&vote.signing_message(), &signature)
            .is_ok()
    }
}
