//! Network parameter definitions
//!
//! Each test network is described by an explicitly constructed
//! `NetworkParams` value: genesis anchor, minimum proof-of-work difficulty,
//! coinbase maturity depth, and the block subsidy schedule. There is no
//! process-wide network state; callers pass the parameters everywhere they
//! are needed.

use crate::crypto::double_sha256_hex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of base units per coin
pub const COIN: u64 = 100_000_000;

/// Parameters describing a test network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Network name
    pub name: String,
    /// Hash of the network's genesis block
    pub genesis_hash: String,
    /// Timestamp of the network's genesis block
    pub genesis_timestamp: DateTime<Utc>,
    /// Minimum difficulty, expressed as required leading zero bits
    pub pow_limit_bits: u32,
    /// Confirmations a coinbase output needs before it may be spent
    pub coinbase_maturity: u64,
    /// Block subsidy before any halving
    pub base_subsidy: u64,
    /// Number of blocks between subsidy halvings
    pub subsidy_halving_interval: u64,
}

impl NetworkParams {
    /// The simulation network: instant mining, short maturity window
    pub fn simnet() -> Self {
        Self {
            name: "simnet".to_string(),
            genesis_hash: double_sha256_hex(b"simnet genesis"),
            genesis_timestamp: timestamp(1_401_292_357),
            pow_limit_bits: 8,
            coinbase_maturity: 16,
            base_subsidy: 50 * COIN,
            subsidy_halving_interval: 210_000,
        }
    }

    /// The regression network: instant mining with mainnet-like maturity
    pub fn regnet() -> Self {
        Self {
            name: "regnet".to_string(),
            genesis_hash: double_sha256_hex(b"regnet genesis"),
            genesis_timestamp: timestamp(1_296_688_602),
            pow_limit_bits: 8,
            coinbase_maturity: 100,
            base_subsidy: 50 * COIN,
            subsidy_halving_interval: 150,
        }
    }

    /// The block subsidy paid by a coinbase at the given height
    pub fn block_subsidy(&self, height: u64) -> u64 {
        if height == 0 {
            return 0;
        }
        let halvings = height / self.subsidy_halving_interval;
        if halvings >= 64 {
            return 0;
        }
        self.base_subsidy >> halvings
    }

    /// The minimum-difficulty proof-of-work target for this network
    pub fn pow_target(&self) -> [u8; 32] {
        crate::crypto::target_from_bits(self.pow_limit_bits)
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}
