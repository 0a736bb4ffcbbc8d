//! Simnet-Harness: block generation and wallet state for integration tests
//!
//! This crate provides the core of a blockchain integration-test harness:
//! - Deterministic block construction atop any previous block (or genesis)
//! - Parallel proof-of-work nonce search at test-network difficulty
//! - A reorg-aware in-memory UTXO ledger with maturity tracking
//! - Hierarchical key derivation with Base58Check addresses
//!
//! The harness trusts that it builds on a valid chain: it performs no
//! consensus validation, no networking, and no persistence. Submitting
//! blocks to a node and delivering its connect/disconnect notifications
//! back to the ledger are the caller's responsibility.
//!
//! # Example
//!
//! ```rust
//! use simnet_harness::chain::NetworkParams;
//! use simnet_harness::mining::{build_block, BlockTemplate, Payout};
//! use simnet_harness::wallet::UtxoLedger;
//!
//! let params = NetworkParams::simnet();
//! let mut ledger = UtxoLedger::new(b"example seed", params.clone()).unwrap();
//!
//! // Build a block paying the ledger's generation address
//! let template = BlockTemplate {
//!     prev_block: None,
//!     transactions: vec![],
//!     version: 1,
//!     timestamp: None,
//!     payout: Payout::Address(ledger.generation_address().to_string()),
//! };
//! let block = build_block(template, &params).unwrap();
//!
//! // Feed the connect notification back to the ledger
//! ledger.apply_connect(block.height, &block.transactions);
//! let mature_height = block.height + params.coinbase_maturity;
//! assert_eq!(ledger.balance(mature_height), params.block_subsidy(1));
//! ```

pub mod chain;
pub mod crypto;
pub mod mining;
pub mod wallet;

// Re-export commonly used types
pub use chain::{Block, BlockHeader, NetworkParams, OutPoint, Transaction, TxIn, TxOut, COIN};
pub use crypto::{KeyPair, KeyRoot};
pub use mining::{build_block, BlockTemplate, BuildError, Payout};
pub use wallet::{LedgerError, UtxoLedger};
