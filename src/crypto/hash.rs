//! Cryptographic hashing utilities for the harness
//!
//! Provides SHA-256 based hashing used for block hashes and transaction ids,
//! plus helpers to express a proof-of-work difficulty as a 256-bit target.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
/// Used for block hashes and transaction ids
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Computes double SHA-256 hash and returns it as a hex string
pub fn double_sha256_hex(data: &[u8]) -> String {
    hex::encode(double_sha256(data))
}

/// Expand a difficulty expressed as required leading zero bits into a
/// 256-bit big-endian target. A hash meets the difficulty exactly when,
/// read as a big-endian unsigned integer, it is <= this target.
pub fn target_from_bits(bits: u32) -> [u8; 32] {
    let mut target = [0xFFu8; 32];
    let full_bytes = (bits as usize / 8).min(32);
    let remaining_bits = bits as usize % 8;

    for byte in target.iter_mut().take(full_bytes) {
        *byte = 0;
    }

    if remaining_bits > 0 && full_bytes < 32 {
        target[full_bytes] = 0xFF >> remaining_bits;
    }

    target
}

/// Compare a 32-byte hash against a target, both interpreted as big-endian
/// unsigned integers. Byte-wise lexicographic order coincides with numeric
/// order for equal-length big-endian values.
pub fn hash_meets_target(hash: &[u8], target: &[u8; 32]) -> bool {
    hash.len() == 32 && hash <= &target[..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256(b"hello world");
        assert_eq!(hash.len(), 32);
        assert_eq!(
            hex::encode(&hash),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_double_sha256() {
        let data = b"hello world";
        assert_eq!(double_sha256(data), sha256(&sha256(data)));
        assert_eq!(double_sha256_hex(data), hex::encode(double_sha256(data)));
    }

    #[test]
    fn test_target_from_bits() {
        let target = target_from_bits(8);
        assert_eq!(target[0], 0x00);
        assert_eq!(target[1], 0xFF);

        let target = target_from_bits(12);
        assert_eq!(target[0], 0x00);
        assert_eq!(target[1], 0x0F);
        assert_eq!(target[2], 0xFF);
    }

    #[test]
    fn test_hash_meets_target() {
        let target = target_from_bits(16);

        let mut hash = vec![0u8; 32];
        hash[2] = 0xFF;
        assert!(hash_meets_target(&hash, &target));

        let mut hash = vec![0u8; 32];
        hash[1] = 0x01;
        assert!(!hash_meets_target(&hash, &target));

        // Equal to the target counts as meeting it
        assert!(hash_meets_target(&target, &target));

        // Wrong length never matches
        assert!(!hash_meets_target(&[0u8; 16], &target));
    }
}
