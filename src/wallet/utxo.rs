//! Spendable output tracking types
//!
//! A [`Utxo`] records everything the ledger needs to know about one output
//! it owns; an [`UndoEntry`] records the per-height delta needed to roll
//! that ownership back when the chain disconnects a block.

use crate::chain::OutPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An unspent output owned by the ledger
///
/// The maturity height is recorded so the maturity window of direct
/// coinbase outputs is observed before they are offered for spending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Locking script of the output
    pub pk_script: Vec<u8>,
    /// Output value in base units
    pub value: u64,
    /// Block height at which the output becomes spendable
    pub maturity_height: u64,
    /// Key index whose address this output pays
    pub key_index: u32,
    /// Excluded from balance and selection while locked
    pub is_locked: bool,
}

impl Utxo {
    /// Whether the output is mature at the given block height
    pub fn is_mature(&self, height: u64) -> bool {
        height >= self.maturity_height
    }
}

/// The ledger delta recorded when one block connects
///
/// Functionally the inverse of a connect notification: re-instating the
/// destroyed outputs and removing the created outpoints restores the
/// ledger state from before the block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoEntry {
    /// Outputs consumed or replaced at this height, keyed by outpoint
    pub utxos_destroyed: HashMap<OutPoint, Utxo>,
    /// Outpoints created at this height
    pub utxos_created: Vec<OutPoint>,
}
