//! Spent-nullifier bookkeeping
//!
//! Double-spend prevention is external to the circuit: after a proof
//! verifies, the verifier marks its nullifier hash spent and rejects any
//! later withdrawal presenting the same hash, however valid its proof.
//! Check-and-mark is atomic so two concurrent withdrawals cannot both
//! pass before either is recorded.

use std::collections::HashSet;
use std::sync::Mutex;

use tracing::debug;

use crate::field::{fr_to_bytes, Fp};

/// Set of nullifier hashes already spent, keyed by canonical encoding.
#[derive(Debug, Default)]
pub struct SpentSet {
    spent: Mutex<HashSet<[u8; 32]>>,
}

impl SpentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically check and mark a nullifier hash.
    ///
    /// Returns true if the hash was fresh (now marked spent), false if it
    /// had already been spent.
    pub fn try_spend(&self, nullifier_hash: &Fp) -> bool {
        let key = fr_to_bytes(nullifier_hash);
        let fresh = self.spent.lock().expect("spent set lock poisoned").insert(key);
        if !fresh {
            debug!("nullifier hash already spent");
        }
        fresh
    }

    /// Whether a nullifier hash has been spent, without marking it.
    pub fn is_spent(&self, nullifier_hash: &Fp) -> bool {
        let key = fr_to_bytes(nullifier_hash);
        self.spent.lock().expect("spent set lock poisoned").contains(&key)
    }

    /// Number of spent nullifier hashes.
    pub fn len(&self) -> usize {
        self.spent.lock().expect("spent set lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
