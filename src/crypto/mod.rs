//! Cryptographic utilities for the harness
//!
//! This module provides:
//! - SHA-256 hashing and proof-of-work target helpers
//! - ECDSA key management with sequential child derivation (secp256k1)
//! - Merkle root calculation

pub mod hash;
pub mod keys;
pub mod merkle;

pub use hash::{double_sha256, double_sha256_hex, hash_meets_target, sha256, target_from_bits};
pub use keys::{
    public_key_to_address, sign_message, verify_signature, KeyError, KeyPair, KeyRoot,
};
pub use merkle::{calculate_merkle_root, calculate_merkle_root_hex};
