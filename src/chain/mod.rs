//! Chain data types shared across the harness
//!
//! This module contains the building blocks the harness assembles and
//! tracks:
//! - Transactions (UTXO model with raw locking scripts)
//! - Blocks (header, cached hash, height metadata)
//! - Scripts (coinbase and pay-to-address construction)
//! - Network parameters (genesis anchor, difficulty, maturity, subsidy)

pub mod block;
pub mod params;
pub mod script;
pub mod transaction;

pub use block::{Block, BlockHeader};
pub use params::{NetworkParams, COIN};
pub use script::{
    pay_to_address_script, script_pays_to, standard_coinbase_script, ScriptBuilder, ScriptError,
};
pub use transaction::{
    OutPoint, Transaction, TxIn, TxOut, COINBASE_OUTPOINT_INDEX, SEQUENCE_FINAL, TX_VERSION,
};
