//! Reorg-aware in-memory UTXO ledger
//!
//! Owns a hierarchical key tree and the set of spendable outputs paying its
//! addresses. The ledger consumes the chain's connect/disconnect stream:
//! each connect records the delta it caused in a per-height undo journal,
//! and a disconnect replays that delta in reverse, so walking disconnects
//! back in reverse height order exactly restores earlier state.
//!
//! The ledger is not internally synchronized. Chain updates are expected to
//! arrive from a single logical sequence; concurrent callers need external
//! mutual exclusion.

use crate::chain::{script_pays_to, NetworkParams, OutPoint, Transaction};
use crate::crypto::{KeyError, KeyRoot};
use crate::wallet::utxo::{UndoEntry, Utxo};
use log::{debug, info};
use std::collections::HashMap;
use thiserror::Error;

/// Ledger-related errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// A disconnect arrived for a height that was never connected;
    /// this is an ordering error in the caller, not a chain condition.
    #[error("No undo entry for height {0}")]
    NoUndoEntry(u64),
    #[error("Insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: u64, need: u64 },
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

/// An address-indexed, maturity-aware set of spendable outputs owned by a
/// single key tree
pub struct UtxoLedger {
    params: NetworkParams,
    hd_root: KeyRoot,
    generation_address: String,
    /// Next child index to hand out; index 0 is permanently reserved for
    /// the generation address
    hd_index: u32,
    /// Derived addresses by key index
    addrs: HashMap<u32, String>,
    /// Live spendable outputs by outpoint
    utxos: HashMap<OutPoint, Utxo>,
    /// Per-height deltas for rolling back disconnected blocks
    reorg_journal: HashMap<u64, UndoEntry>,
}

impl UtxoLedger {
    /// Create a ledger whose key tree grows from the given seed
    ///
    /// The first child key is reserved as the coinbase generation address
    /// so newly generated coins are tracked from the start.
    pub fn new(seed: &[u8], params: NetworkParams) -> Result<Self, LedgerError> {
        let hd_root = KeyRoot::from_seed(seed)?;
        let generation_address = hd_root.derive_child(0)?.address();

        let mut addrs = HashMap::new();
        addrs.insert(0, generation_address.clone());

        info!(
            "ledger created on {} with generation address {}",
            params.name, generation_address
        );

        Ok(Self {
            params,
            hd_root,
            generation_address,
            hd_index: 1,
            addrs,
            utxos: HashMap::new(),
            reorg_journal: HashMap::new(),
        })
    }

    /// The address coinbase payouts are directed to (key index 0)
    pub fn generation_address(&self) -> &str {
        &self.generation_address
    }

    /// Allocate the next key index and return its derived address
    ///
    /// Indices are dense and strictly increasing; an index is never reused.
    pub fn new_address(&mut self) -> Result<String, LedgerError> {
        let index = self.hd_index;
        let address = self.hd_root.derive_child(index)?.address();
        self.addrs.insert(index, address.clone());
        self.hd_index += 1;
        Ok(address)
    }

    /// Apply a connected block's relevant transactions at the given height
    ///
    /// Records newly created outputs paying ledger addresses, removes
    /// outputs the transactions consume, and writes the undo entry for the
    /// height. The ledger does not deduplicate connect notifications; a
    /// repeated connect for the same height overwrites its journal entry.
    pub fn apply_connect(&mut self, height: u64, transactions: &[Transaction]) {
        let mut undo = UndoEntry::default();

        for tx in transactions {
            let is_coinbase = tx.is_coinbase();
            self.eval_outputs(tx, height, is_coinbase, &mut undo);
            self.eval_inputs(tx, &mut undo);
        }

        debug!(
            "connect at height {}: {} created, {} destroyed",
            height,
            undo.utxos_created.len(),
            undo.utxos_destroyed.len()
        );
        self.reorg_journal.insert(height, undo);
    }

    /// Undo the connect previously applied at the given height
    ///
    /// Re-instates every destroyed output, removes every created outpoint,
    /// and deletes the consumed undo entry.
    pub fn apply_disconnect(&mut self, height: u64) -> Result<(), LedgerError> {
        let undo = self
            .reorg_journal
            .remove(&height)
            .ok_or(LedgerError::NoUndoEntry(height))?;

        for outpoint in &undo.utxos_created {
            self.utxos.remove(outpoint);
        }
        for (outpoint, utxo) in undo.utxos_destroyed {
            self.utxos.insert(outpoint, utxo);
        }

        debug!("disconnected height {}", height);
        Ok(())
    }

    /// Sum of all unlocked outputs mature at the target height
    pub fn balance(&self, target_height: u64) -> u64 {
        self.utxos
            .values()
            .filter(|utxo| !utxo.is_locked && utxo.is_mature(target_height))
            .map(|utxo| utxo.value)
            .sum()
    }

    /// Greedily select unlocked, mature outputs covering the amount
    ///
    /// Fails with [`LedgerError::InsufficientFunds`] without mutating
    /// anything if the spendable balance cannot cover the amount.
    pub fn select_spendable(
        &self,
        target_height: u64,
        amount: u64,
    ) -> Result<Vec<(OutPoint, Utxo)>, LedgerError> {
        let mut selected = Vec::new();
        let mut selected_value = 0u64;

        for (outpoint, utxo) in &self.utxos {
            if utxo.is_locked || !utxo.is_mature(target_height) {
                continue;
            }
            selected.push((outpoint.clone(), utxo.clone()));
            selected_value += utxo.value;
            if selected_value >= amount {
                return Ok(selected);
            }
        }

        Err(LedgerError::InsufficientFunds {
            have: selected_value,
            need: amount,
        })
    }

    /// Exclude an output from balance and selection until unlocked
    ///
    /// Returns false if the outpoint is not in the live set.
    pub fn lock_output(&mut self, outpoint: &OutPoint) -> bool {
        match self.utxos.get_mut(outpoint) {
            Some(utxo) => {
                utxo.is_locked = true;
                true
            }
            None => false,
        }
    }

    /// Make a locked output selectable again
    pub fn unlock_output(&mut self, outpoint: &OutPoint) -> bool {
        match self.utxos.get_mut(outpoint) {
            Some(utxo) => {
                utxo.is_locked = false;
                true
            }
            None => false,
        }
    }

    /// Unlock every locked output
    pub fn unlock_all(&mut self) {
        for utxo in self.utxos.values_mut() {
            utxo.is_locked = false;
        }
    }

    /// Number of outputs currently tracked as unspent
    pub fn utxo_count(&self) -> usize {
        self.utxos.len()
    }

    /// Number of undo entries currently held in the journal
    pub fn journal_depth(&self) -> usize {
        self.reorg_journal.len()
    }

    /// Find the key index whose address a locking script pays, if any
    fn owning_key_index(&self, pk_script: &[u8]) -> Option<u32> {
        self.addrs
            .iter()
            .find(|(_, address)| script_pays_to(pk_script, address))
            .map(|(index, _)| *index)
    }

    /// Record the outputs of one transaction that pay ledger addresses
    fn eval_outputs(
        &mut self,
        tx: &Transaction,
        height: u64,
        is_coinbase: bool,
        undo: &mut UndoEntry,
    ) {
        for (index, output) in tx.outputs.iter().enumerate() {
            let Some(key_index) = self.owning_key_index(&output.pk_script) else {
                continue;
            };

            let maturity_height = if is_coinbase {
                height + self.params.coinbase_maturity
            } else {
                height
            };

            let outpoint = OutPoint::new(tx.id.clone(), index as u32);
            let utxo = Utxo {
                pk_script: output.pk_script.clone(),
                value: output.value,
                maturity_height,
                key_index,
                is_locked: false,
            };

            // A re-created outpoint replaces an existing output; the old
            // record goes into the undo entry alongside consumed outputs
            if let Some(replaced) = self.utxos.insert(outpoint.clone(), utxo) {
                undo.utxos_destroyed.insert(outpoint.clone(), replaced);
            }
            undo.utxos_created.push(outpoint);
        }
    }

    /// Remove outputs that one transaction's inputs consume
    fn eval_inputs(&mut self, tx: &Transaction, undo: &mut UndoEntry) {
        for input in &tx.inputs {
            let outpoint = &input.previous_outpoint;
            if let Some(utxo) = self.utxos.remove(outpoint) {
                undo.utxos_destroyed.insert(outpoint.clone(), utxo);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{pay_to_address_script, TxIn, TxOut, SEQUENCE_FINAL};
    use crate::mining::{create_coinbase_tx, Payout};

    fn new_ledger() -> UtxoLedger {
        UtxoLedger::new(b"ledger test seed", NetworkParams::simnet()).unwrap()
    }

    /// Coinbase paying the ledger's generation address at the given height
    fn generation_coinbase(ledger: &UtxoLedger, height: u64) -> Transaction {
        create_coinbase_tx(
            height,
            &Payout::Address(ledger.generation_address().to_string()),
            &ledger.params,
        )
        .unwrap()
    }

    fn maturity(ledger: &UtxoLedger, height: u64) -> u64 {
        height + ledger.params.coinbase_maturity
    }

    #[test]
    fn test_new_address_allocates_distinct_increasing_indices() {
        let mut ledger = new_ledger();
        let generation = ledger.generation_address().to_string();

        let mut addresses: Vec<String> =
            (0..5).map(|_| ledger.new_address().unwrap()).collect();
        assert!(!addresses.contains(&generation));

        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), 5);

        // Indices 1..=5 are recorded; index 0 stays the generation address
        assert_eq!(ledger.hd_index, 6);
        assert_eq!(ledger.addrs.get(&0), Some(&generation));
    }

    #[test]
    fn test_connect_tracks_generation_coinbase() {
        let mut ledger = new_ledger();
        let coinbase = generation_coinbase(&ledger, 1);
        let subsidy = coinbase.total_output();

        ledger.apply_connect(1, &[coinbase]);

        assert_eq!(ledger.utxo_count(), 1);
        assert_eq!(ledger.journal_depth(), 1);
        assert_eq!(ledger.balance(maturity(&ledger, 1)), subsidy);
    }

    #[test]
    fn test_foreign_outputs_are_ignored() {
        let mut ledger = new_ledger();
        let other = crate::crypto::KeyPair::generate().address();
        let coinbase = create_coinbase_tx(1, &Payout::Address(other), &ledger.params).unwrap();

        ledger.apply_connect(1, &[coinbase]);
        assert_eq!(ledger.utxo_count(), 0);
    }

    #[test]
    fn test_coinbase_maturity_window() {
        let mut ledger = new_ledger();
        let coinbase = generation_coinbase(&ledger, 1);
        let subsidy = coinbase.total_output();
        ledger.apply_connect(1, &[coinbase]);

        let mature_at = maturity(&ledger, 1);
        assert_eq!(ledger.balance(mature_at - 1), 0);
        assert!(ledger.select_spendable(mature_at - 1, 1).is_err());

        assert_eq!(ledger.balance(mature_at), subsidy);
        assert!(ledger.select_spendable(mature_at, subsidy).is_ok());
    }

    #[test]
    fn test_non_coinbase_outputs_spendable_immediately() {
        let mut ledger = new_ledger();
        let address = ledger.new_address().unwrap();
        let tx = Transaction::new(
            vec![TxIn {
                previous_outpoint: OutPoint::new("ab".repeat(32), 0),
                signature_script: vec![],
                sequence: SEQUENCE_FINAL,
            }],
            vec![TxOut {
                value: 1_000,
                pk_script: pay_to_address_script(&address).unwrap(),
            }],
        );

        ledger.apply_connect(5, &[tx]);
        assert_eq!(ledger.balance(5), 1_000);
    }

    #[test]
    fn test_spend_and_disconnect_restores_output() {
        let mut ledger = new_ledger();
        let coinbase = generation_coinbase(&ledger, 1);
        let value = coinbase.total_output();
        let funding_outpoint = OutPoint::new(coinbase.id.clone(), 0);
        ledger.apply_connect(1, &[coinbase]);

        let spendable_height = maturity(&ledger, 1);
        let before = ledger.utxos.clone();

        // A transaction at height 2 spends the ledger-owned output O
        let spend = Transaction::new(
            vec![TxIn {
                previous_outpoint: funding_outpoint.clone(),
                signature_script: vec![],
                sequence: SEQUENCE_FINAL,
            }],
            vec![TxOut {
                value,
                pk_script: vec![0x51],
            }],
        );
        ledger.apply_connect(2, &[spend]);
        assert_eq!(ledger.balance(spendable_height), 0);
        assert!(!ledger.utxos.contains_key(&funding_outpoint));

        // Disconnecting height 2 restores O exactly as before
        ledger.apply_disconnect(2).unwrap();
        assert_eq!(ledger.utxos, before);
        assert_eq!(ledger.balance(spendable_height), value);
    }

    #[test]
    fn test_connect_disconnect_round_trip() {
        let mut ledger = new_ledger();
        let initial = ledger.utxos.clone();

        // Connect a run of coinbase-funded heights, then a spend of the
        // first output
        let mut funding = None;
        for height in 1..=4 {
            let coinbase = generation_coinbase(&ledger, height);
            funding.get_or_insert(OutPoint::new(coinbase.id.clone(), 0));
            ledger.apply_connect(height, &[coinbase]);
        }
        let spend = Transaction::new(
            vec![TxIn {
                previous_outpoint: funding.unwrap(),
                signature_script: vec![],
                sequence: SEQUENCE_FINAL,
            }],
            vec![TxOut {
                value: 1,
                pk_script: vec![0x51],
            }],
        );
        ledger.apply_connect(5, &[spend]);
        assert_eq!(ledger.journal_depth(), 5);

        // Unwind in exact reverse order
        for height in (1..=5).rev() {
            ledger.apply_disconnect(height).unwrap();
        }

        assert_eq!(ledger.utxos, initial);
        assert_eq!(ledger.journal_depth(), 0);
        assert_eq!(ledger.balance(u64::MAX), 0);
    }

    #[test]
    fn test_disconnect_unknown_height_fails() {
        let mut ledger = new_ledger();
        let result = ledger.apply_disconnect(42);
        assert!(matches!(result, Err(LedgerError::NoUndoEntry(42))));
    }

    #[test]
    fn test_insufficient_funds_mutates_nothing() {
        let mut ledger = new_ledger();
        let coinbase = generation_coinbase(&ledger, 1);
        let subsidy = coinbase.total_output();
        ledger.apply_connect(1, &[coinbase]);

        let height = maturity(&ledger, 1);
        let before = ledger.utxos.clone();

        let result = ledger.select_spendable(height, subsidy + 1);
        match result {
            Err(LedgerError::InsufficientFunds { have, need }) => {
                assert_eq!(have, subsidy);
                assert_eq!(need, subsidy + 1);
            }
            other => panic!("expected insufficient funds, got {:?}", other.map(|_| ())),
        }
        assert_eq!(ledger.utxos, before);
    }

    #[test]
    fn test_selection_covers_amount_across_outputs() {
        let mut ledger = new_ledger();
        for height in 1..=3 {
            let coinbase = generation_coinbase(&ledger, height);
            ledger.apply_connect(height, &[coinbase]);
        }

        let height = maturity(&ledger, 3);
        let subsidy = ledger.params.block_subsidy(1);

        let selected = ledger.select_spendable(height, subsidy * 2).unwrap();
        let total: u64 = selected.iter().map(|(_, utxo)| utxo.value).sum();
        assert!(total >= subsidy * 2);
        assert!(selected.len() >= 2);
    }

    #[test]
    fn test_locked_outputs_are_excluded() {
        let mut ledger = new_ledger();
        let coinbase = generation_coinbase(&ledger, 1);
        let subsidy = coinbase.total_output();
        let outpoint = OutPoint::new(coinbase.id.clone(), 0);
        ledger.apply_connect(1, &[coinbase]);

        let height = maturity(&ledger, 1);
        assert!(ledger.lock_output(&outpoint));
        assert_eq!(ledger.balance(height), 0);
        assert!(ledger.select_spendable(height, 1).is_err());

        ledger.unlock_output(&outpoint);
        assert_eq!(ledger.balance(height), subsidy);

        ledger.lock_output(&outpoint);
        ledger.unlock_all();
        assert_eq!(ledger.balance(height), subsidy);

        // Locking an unknown outpoint reports false
        assert!(!ledger.lock_output(&OutPoint::new("cd".repeat(32), 0)));
    }

    #[test]
    fn test_outputs_to_fresh_addresses_are_tracked() {
        let mut ledger = new_ledger();
        let address = ledger.new_address().unwrap();

        let tx = Transaction::new(
            vec![TxIn {
                previous_outpoint: OutPoint::new("ab".repeat(32), 0),
                signature_script: vec![],
                sequence: SEQUENCE_FINAL,
            }],
            vec![TxOut {
                value: 500,
                pk_script: pay_to_address_script(&address).unwrap(),
            }],
        );
        ledger.apply_connect(1, &[tx.clone()]);

        let utxo = ledger
            .utxos
            .get(&OutPoint::new(tx.id.clone(), 0))
            .unwrap();
        assert_eq!(utxo.key_index, 1);
        assert_eq!(utxo.value, 500);
    }
}
