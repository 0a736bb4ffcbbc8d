//! Block assembly for test chains
//!
//! Builds a syntactically valid block on top of a caller-supplied previous
//! block (or the network genesis), including the coinbase transaction and
//! merkle root, then runs the proof-of-work solver at the network's minimum
//! difficulty. The resulting block is ready for submission; submitting it
//! anywhere is the caller's job.

use crate::chain::{
    pay_to_address_script, standard_coinbase_script, Block, BlockHeader, NetworkParams,
    ScriptError, Transaction, TxOut,
};
use crate::mining::solver::solve_header;
use chrono::{DateTime, Duration, Utc};
use log::info;
use thiserror::Error;

/// Errors that can occur while building a block
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid block version: {0}")]
    InvalidVersion(i32),
    #[error("Unable to solve block at {0} difficulty bits")]
    Unsolvable(u32),
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
}

/// Where a built block's coinbase value goes
#[derive(Debug, Clone)]
pub enum Payout {
    /// Pay the block subsidy to this address
    Address(String),
    /// Use these outputs verbatim instead of the subsidy output.
    /// Value conservation and script validity are the caller's
    /// responsibility; nothing here checks them.
    Outputs(Vec<TxOut>),
}

/// Everything needed to build one block
#[derive(Debug, Clone)]
pub struct BlockTemplate<'a> {
    /// Block to build on; `None` builds on the network's genesis block
    pub prev_block: Option<&'a Block>,
    /// Non-coinbase transactions to include, in order
    pub transactions: Vec<Transaction>,
    /// Block version; must be positive
    pub version: i32,
    /// Header timestamp; `None` uses the previous block's timestamp plus
    /// one second
    pub timestamp: Option<DateTime<Utc>>,
    /// Coinbase payout instruction
    pub payout: Payout,
}

/// Create a coinbase transaction for the given height and payout
pub fn create_coinbase_tx(
    height: u64,
    payout: &Payout,
    params: &NetworkParams,
) -> Result<Transaction, BuildError> {
    let signature_script = standard_coinbase_script(height, 0)?;

    let outputs = match payout {
        Payout::Outputs(outputs) => outputs.clone(),
        Payout::Address(address) => vec![TxOut {
            value: params.block_subsidy(height),
            pk_script: pay_to_address_script(address)?,
        }],
    };

    Ok(Transaction::coinbase(signature_script, outputs))
}

/// Build and solve a block from the template
///
/// With no previous block the result has height 1 and anchors to the
/// network's genesis hash, treating the previous timestamp as the genesis
/// timestamp plus one minute. Fails with [`BuildError::Unsolvable`] if the
/// nonce space is exhausted, which should not happen at minimum difficulty.
pub fn build_block(template: BlockTemplate, params: &NetworkParams) -> Result<Block, BuildError> {
    if template.version <= 0 {
        return Err(BuildError::InvalidVersion(template.version));
    }

    let (previous_hash, height, prev_block_time) = match template.prev_block {
        None => (
            params.genesis_hash.clone(),
            1,
            params.genesis_timestamp + Duration::minutes(1),
        ),
        Some(prev) => (prev.hash.clone(), prev.height + 1, prev.header.timestamp),
    };

    let timestamp = template
        .timestamp
        .unwrap_or(prev_block_time + Duration::seconds(1));

    let coinbase = create_coinbase_tx(height, &template.payout, params)?;
    let mut transactions = vec![coinbase];
    transactions.extend(template.transactions);

    let mut header = BlockHeader {
        version: template.version,
        previous_hash,
        merkle_root: Block::merkle_root_for(&transactions),
        timestamp,
        bits: params.pow_limit_bits,
        nonce: 0,
    };

    if !solve_header(&mut header, &params.pow_target()) {
        return Err(BuildError::Unsolvable(params.pow_limit_bits));
    }

    let hash = header.hash();
    info!(
        "built block {} at height {} with {} transaction(s)",
        hash,
        height,
        transactions.len()
    );

    Ok(Block {
        height,
        header,
        hash,
        transactions,
    })
}
