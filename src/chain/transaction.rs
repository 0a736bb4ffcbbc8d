//! Transaction types for harness-built blocks
//!
//! Implements the UTXO-model transaction shape the harness needs: outpoint
//! references, raw locking scripts, and coinbase construction. The harness
//! builds on a chain it trusts, so no signature or value validation happens
//! here.

use crate::crypto::double_sha256;
use serde::{Deserialize, Serialize};

/// Current transaction version
pub const TX_VERSION: u32 = 1;

/// Sequence number marking an input as final
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// Output index used by the null outpoint of a coinbase input
pub const COINBASE_OUTPOINT_INDEX: u32 = u32::MAX;

/// Reference to a transaction output (transaction id + output index)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_id: String,
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_id: String, index: u32) -> Self {
        Self { tx_id, index }
    }

    /// The null outpoint referenced by coinbase inputs: zero hash, max index
    pub fn null() -> Self {
        Self {
            tx_id: "0".repeat(64),
            index: COINBASE_OUTPOINT_INDEX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.index == COINBASE_OUTPOINT_INDEX && self.tx_id.chars().all(|c| c == '0')
    }
}

impl std::fmt::Display for OutPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.index)
    }
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// Output being spent
    pub previous_outpoint: OutPoint,
    /// Unlocking script (coinbase inputs carry the height/extra-nonce script)
    pub signature_script: Vec<u8>,
    /// Sequence number
    pub sequence: u32,
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Amount in base units
    pub value: u64,
    /// Locking script
    pub pk_script: Vec<u8>,
}

/// A transaction carried by a harness-built block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction version
    pub version: u32,
    /// Unique transaction id (hash of transaction data)
    pub id: String,
    /// Transaction inputs
    pub inputs: Vec<TxIn>,
    /// Transaction outputs
    pub outputs: Vec<TxOut>,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        let mut tx = Self {
            version: TX_VERSION,
            id: String::new(),
            inputs,
            outputs,
        };
        tx.id = tx.calculate_hash();
        tx
    }

    /// Create a coinbase transaction: a single input referencing the null
    /// outpoint, carrying the passed signature script
    pub fn coinbase(signature_script: Vec<u8>, outputs: Vec<TxOut>) -> Self {
        let inputs = vec![TxIn {
            previous_outpoint: OutPoint::null(),
            signature_script,
            sequence: SEQUENCE_FINAL,
        }];
        Self::new(inputs, outputs)
    }

    /// Whether this is a coinbase transaction
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_outpoint.is_null()
    }

    /// Calculate the transaction hash
    pub fn calculate_hash(&self) -> String {
        let data = format!("{}{:?}{:?}", self.version, self.inputs, self.outputs);
        hex::encode(double_sha256(data.as_bytes()))
    }

    /// Get total output amount
    pub fn total_output(&self) -> u64 {
        self.outputs.iter().map(|o| o.value).sum()
    }
}
