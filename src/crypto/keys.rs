//! ECDSA key management for the harness wallet
//!
//! Provides secp256k1 key pairs, Base58Check addresses, and a seeded
//! hierarchical key root from which child keys are derived by sequential
//! index. The wallet reserves child 0 as its coinbase generation key.

use rand::rngs::OsRng;
use ripemd::Ripemd160;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::hash::sha256;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid seed")]
    InvalidSeed,
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Get the public key as a hex string (compressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize())
    }

    /// Get the address paid to by this key pair
    /// Uses Bitcoin-style address generation: Base58Check(RIPEMD160(SHA256(pubkey)))
    pub fn address(&self) -> String {
        public_key_to_address(&self.public_key)
    }

    /// Sign a 32-byte message hash with the private key
    pub fn sign(&self, message_hash: &[u8]) -> Result<Vec<u8>, KeyError> {
        sign_message(&self.secret_key, message_hash)
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, message_hash: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        verify_signature(&self.public_key, message_hash, signature)
    }
}

/// A hierarchical key root seeded from wallet entropy
///
/// Child keys are derived deterministically by index: the same seed and
/// index always produce the same key pair, so a wallet rebuilt from its
/// seed sees the same addresses.
#[derive(Clone)]
pub struct KeyRoot {
    master: SecretKey,
}

impl KeyRoot {
    /// Derive the key root from a seed
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        if seed.is_empty() {
            return Err(KeyError::InvalidSeed);
        }
        let master =
            SecretKey::from_slice(&sha256(seed)).map_err(|_| KeyError::InvalidSeed)?;
        Ok(Self { master })
    }

    /// Derive the child key pair at the given index
    pub fn derive_child(&self, index: u32) -> Result<KeyPair, KeyError> {
        let mut data = self.master.secret_bytes().to_vec();
        data.extend_from_slice(&index.to_be_bytes());

        // Hash until the candidate lands inside the curve order. The first
        // candidate is valid for all but a negligible fraction of inputs.
        let mut candidate = sha256(&data);
        loop {
            match SecretKey::from_slice(&candidate) {
                Ok(secret_key) => return Ok(KeyPair::from_secret_key(secret_key)),
                Err(_) => candidate = sha256(&candidate),
            }
        }
    }
}

/// Convert a public key to a Base58Check address
pub fn public_key_to_address(public_key: &PublicKey) -> String {
    // SHA256 of the public key
    let sha256_hash = sha256(&public_key.serialize());

    // RIPEMD160 of the SHA256 hash
    let mut ripemd = Ripemd160::new();
    ripemd.update(&sha256_hash);
    let ripemd_hash = ripemd.finalize();

    // Add version byte (0x00)
    let mut address_bytes = vec![0x00];
    address_bytes.extend_from_slice(&ripemd_hash);

    // Calculate checksum (first 4 bytes of double SHA256)
    let checksum = {
        let mut hasher = Sha256::new();
        hasher.update(&address_bytes);
        let first_hash = hasher.finalize();
        let mut hasher = Sha256::new();
        hasher.update(first_hash);
        hasher.finalize()
    };
    address_bytes.extend_from_slice(&checksum[..4]);

    // Base58 encode
    bs58::encode(address_bytes).into_string()
}

/// Sign a message hash with a secret key
pub fn sign_message(secret_key: &SecretKey, message_hash: &[u8]) -> Result<Vec<u8>, KeyError> {
    let secp = Secp256k1::new();

    // Ensure message hash is 32 bytes
    let hash = if message_hash.len() == 32 {
        message_hash.to_vec()
    } else {
        sha256(message_hash)
    };

    let message = Message::from_digest_slice(&hash)?;
    let signature = secp.sign_ecdsa(&message, secret_key);
    Ok(signature.serialize_compact().to_vec())
}

/// Verify a signature against a public key
pub fn verify_signature(
    public_key: &PublicKey,
    message_hash: &[u8],
    signature: &[u8],
) -> Result<bool, KeyError> {
    let secp = Secp256k1::new();

    let hash = if message_hash.len() == 32 {
        message_hash.to_vec()
    } else {
        sha256(message_hash)
    };

    let message = Message::from_digest_slice(&hash)?;
    let sig = secp256k1::ecdsa::Signature::from_compact(signature)
        .map_err(|_| KeyError::InvalidSignature)?;

    match secp.verify_ecdsa(&message, &sig, public_key) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}
