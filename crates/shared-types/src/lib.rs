//! # Shared Types Crate
//!
//! Primitive domain types shared across the workspace. All cross-crate
//! representations of hashes, addresses and keys are defined here so that
//! every subsystem agrees on the same byte layouts.

use serde::{Deserialize, Serialize};

/// A 32-byte block hash.
pub type Hash = [u8; 32];

/// A 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

/// A 32-byte Ed25519 public key.
pub type PublicKey = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Block height on the host chain.
pub type BlockNumber = u64;

/// Identifies a block by height and hash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockId {
    pub number: BlockNumber,
    pub hash: Hash,
}

impl BlockId {
    pub fn new(number: BlockNumber, hash: Hash) -> Self {
        Self { number, hash }
    }
}
