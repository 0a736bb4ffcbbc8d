//! In-memory wallet ledger for tracking spendable outputs across reorgs

pub mod ledger;
pub mod utxo;

pub use ledger::{LedgerError, UtxoLedger};
pub use utxo::{UndoEntry, Utxo};
