//! Block and block header types
//!
//! A block couples a header with its transactions; the height the block was
//! built for rides along as metadata since it is not committed to by the
//! header itself.

use crate::chain::transaction::Transaction;
use crate::crypto::{calculate_merkle_root, double_sha256, hash_meets_target};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Block header containing metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block version
    pub version: i32,
    /// Hash of the previous block
    pub previous_hash: String,
    /// Merkle root of all transactions
    pub merkle_root: String,
    /// Block creation timestamp
    pub timestamp: DateTime<Utc>,
    /// Difficulty, expressed as required leading zero bits
    pub bits: u32,
    /// Nonce found by the proof-of-work search
    pub nonce: u32,
}

impl BlockHeader {
    /// Calculate the hash of the block header as raw bytes
    pub fn hash_bytes(&self) -> Vec<u8> {
        let data = format!(
            "{}{}{}{}{}{}",
            self.version,
            self.previous_hash,
            self.merkle_root,
            self.timestamp.timestamp(),
            self.bits,
            self.nonce
        );
        double_sha256(data.as_bytes())
    }

    /// Calculate the hash of the block header as a hex string
    pub fn hash(&self) -> String {
        hex::encode(self.hash_bytes())
    }

    /// Check whether the header hash meets the given proof-of-work target
    pub fn meets_target(&self, target: &[u8; 32]) -> bool {
        hash_meets_target(&self.hash_bytes(), target)
    }
}

/// A block produced by the harness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height (metadata, attached at build time)
    pub height: u64,
    /// Block header
    pub header: BlockHeader,
    /// Block hash (cached after solving)
    pub hash: String,
    /// List of transactions in the block, coinbase first
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Calculate the merkle root over an ordered transaction set
    pub fn merkle_root_for(transactions: &[Transaction]) -> String {
        let tx_hashes: Vec<Vec<u8>> = transactions
            .iter()
            .map(|tx| hex::decode(&tx.id).unwrap_or_default())
            .collect();
        hex::encode(calculate_merkle_root(&tx_hashes))
    }

    /// Verify the block's merkle root against its transactions
    pub fn verify_merkle_root(&self) -> bool {
        Self::merkle_root_for(&self.transactions) == self.header.merkle_root
    }

    /// Verify the cached block hash against the header
    pub fn verify_hash(&self) -> bool {
        self.hash == self.header.hash()
    }

    /// Get the coinbase transaction (first transaction)
    pub fn coinbase_tx(&self) -> Option<&Transaction> {
        self.transactions.first().filter(|tx| tx.is_coinbase())
    }

    /// Get number of transactions in this block
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::script::standard_coinbase_script;
    use crate::chain::transaction::TxOut;
    use crate::crypto::target_from_bits;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 1,
            previous_hash: "0".repeat(64),
            merkle_root: "1".repeat(64),
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            bits: 8,
            nonce: 0,
        }
    }

    #[test]
    fn test_header_hash_is_pure() {
        let header = sample_header();
        assert_eq!(header.hash(), header.hash());
        assert_eq!(header.hash(), hex::encode(header.hash_bytes()));
    }

    #[test]
    fn test_header_hash_depends_on_nonce() {
        let header = sample_header();
        let mut changed = header.clone();
        changed.nonce += 1;
        assert_ne!(header.hash(), changed.hash());
    }

    #[test]
    fn test_meets_target() {
        let header = sample_header();
        // Target of all ones accepts any hash; zero bits means no constraint
        assert!(header.meets_target(&target_from_bits(0)));
    }

    #[test]
    fn test_block_merkle_and_hash_verification() {
        let coinbase = Transaction::coinbase(
            standard_coinbase_script(1, 0).unwrap(),
            vec![TxOut {
                value: 50,
                pk_script: vec![],
            }],
        );
        let transactions = vec![coinbase];

        let mut header = sample_header();
        header.merkle_root = Block::merkle_root_for(&transactions);
        let hash = header.hash();

        let mut block = Block {
            height: 1,
            header,
            hash,
            transactions,
        };
        assert!(block.verify_merkle_root());
        assert!(block.verify_hash());
        assert!(block.coinbase_tx().is_some());
        assert_eq!(block.tx_count(), 1);

        // Tamper with the transaction id that feeds the merkle root
        block.transactions[0].id = "2".repeat(64);
        assert!(!block.verify_merkle_root());

        // Tamper with the nonce behind the cached hash
        block.header.nonce += 1;
        assert!(!block.verify_hash());
    }
}
