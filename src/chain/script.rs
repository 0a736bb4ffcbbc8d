//! Minimal script handling for harness-built outputs
//!
//! The harness only needs two script shapes: the coinbase signature script
//! (block height plus an extra nonce, both minimally encoded) and the
//! pay-to-pubkey-hash locking script used to pay wallet addresses. Scripts
//! are raw byte vectors so they can round-trip through blocks untouched.

use thiserror::Error;

// Opcodes used by the harness scripts
pub const OP_0: u8 = 0x00;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;

/// Length of the pubkey hash in a pay-to-address script
pub const PUBKEY_HASH_LEN: usize = 20;

/// Script-related errors
#[derive(Error, Debug, Clone)]
pub enum ScriptError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Data push too large: {0} bytes")]
    PushTooLarge(usize),
}

/// Incrementally builds a script from opcodes and data pushes
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an opcode verbatim
    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.script.push(opcode);
        self
    }

    /// Push an integer using the minimal encoding: small values become
    /// dedicated opcodes, everything else a sign-magnitude little-endian push
    pub fn push_int(self, value: i64) -> Result<Self, ScriptError> {
        if value == 0 {
            return Ok(self.push_opcode(OP_0));
        }
        if value == -1 {
            return Ok(self.push_opcode(OP_1NEGATE));
        }
        if (1..=16).contains(&value) {
            return Ok(self.push_opcode(OP_1 + (value as u8) - 1));
        }
        self.push_data(&minimal_int_bytes(value))
    }

    /// Push a length-prefixed chunk of data
    pub fn push_data(mut self, data: &[u8]) -> Result<Self, ScriptError> {
        // Single-byte length prefix covers every push the harness makes
        if data.len() >= 0x4c {
            return Err(ScriptError::PushTooLarge(data.len()));
        }
        self.script.push(data.len() as u8);
        self.script.extend_from_slice(data);
        Ok(self)
    }

    /// Consume the builder, returning the script bytes
    pub fn script(self) -> Vec<u8> {
        self.script
    }
}

/// Encode an integer as minimal sign-magnitude little-endian bytes
fn minimal_int_bytes(value: i64) -> Vec<u8> {
    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();

    let mut bytes = Vec::new();
    while magnitude > 0 {
        bytes.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    // If the high bit of the top byte is set, an extra byte carries the sign;
    // otherwise the sign lives in that bit.
    if bytes.last().map(|b| b & 0x80 != 0).unwrap_or(false) {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        if let Some(last) = bytes.last_mut() {
            *last |= 0x80;
        }
    }

    bytes
}

/// Build the standard coinbase signature script: the block height followed
/// by an extra nonce, both minimally encoded
pub fn standard_coinbase_script(height: u64, extra_nonce: u64) -> Result<Vec<u8>, ScriptError> {
    Ok(ScriptBuilder::new()
        .push_int(height as i64)?
        .push_int(extra_nonce as i64)?
        .script())
}

/// Build a pay-to-pubkey-hash locking script for a Base58Check address
pub fn pay_to_address_script(address: &str) -> Result<Vec<u8>, ScriptError> {
    let hash = address_pubkey_hash(address)?;
    Ok(ScriptBuilder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_data(&hash)?
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .script())
}

/// Check whether a locking script pays to the given address
pub fn script_pays_to(script: &[u8], address: &str) -> bool {
    pay_to_address_script(address)
        .map(|expected| expected == script)
        .unwrap_or(false)
}

/// Extract the pubkey hash from a Base58Check address
fn address_pubkey_hash(address: &str) -> Result<[u8; PUBKEY_HASH_LEN], ScriptError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|_| ScriptError::InvalidAddress(address.to_string()))?;

    // version byte + 20-byte hash + 4-byte checksum
    if decoded.len() != 1 + PUBKEY_HASH_LEN + 4 {
        return Err(ScriptError::InvalidAddress(address.to_string()));
    }

    let mut hash = [0u8; PUBKEY_HASH_LEN];
    hash.copy_from_slice(&decoded[1..1 + PUBKEY_HASH_LEN]);
    Ok(hash)
}
