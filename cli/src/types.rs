//! Tumbler CLI file types
//!
//! Everything on disk is JSON with hex-encoded field elements, except the
//! backend artifacts (proof, verifying key) which use their compressed
//! binary encodings.

use serde::{Deserialize, Serialize};

use tumbler::{fr_from_bytes, fr_to_bytes, Fp, WitnessError};

/// A deposit's secret pair and derived values. Keep private!
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositFile {
    pub nullifier: String,
    pub secret: String,
    pub commitment: String,
    pub nullifier_hash: String,
}

/// The public commitment pool, one entry per deposit, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolFile {
    pub commitments: Vec<String>,
}

impl PoolFile {
    /// Find the leaf index of a commitment
    pub fn find_leaf(&self, commitment: &str) -> Option<u32> {
        self.commitments
            .iter()
            .position(|c| c == commitment)
            .map(|i| i as u32)
    }
}

/// Public inputs accompanying a proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicInputsFile {
    pub root: String,
    pub nullifier_hash: String,
}

/// Nullifier hashes already spent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpentFile {
    pub spent: Vec<String>,
}

/// Hex-encode a field element
pub fn fr_to_hex(value: &Fp) -> String {
    hex::encode(fr_to_bytes(value))
}

/// Decode a hex-encoded field element
pub fn fr_from_hex(label: &str, s: &str) -> Result<Fp, Box<dyn std::error::Error>> {
    let bytes = hex::decode(s).map_err(|e| format!("{}: invalid hex: {}", label, e))?;
    let value = fr_from_bytes(label, &bytes).map_err(|e: WitnessError| e.to_string())?;
    Ok(value)
}
