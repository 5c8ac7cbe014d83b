//! Witness assembly for the spend relation
//!
//! Turns a prover's private knowledge (secret pair, authentication path)
//! plus the public values (root, nullifier hash) into a fully assigned
//! circuit. All validation lives here so the circuit itself stays purely
//! algebraic: path lengths, canonical field elements, and consistency of
//! the supplied public values against native recomputation.

use tracing::debug;

use crate::field::{fr_from_bytes, Fp};
use crate::merkle::{MerklePath, TREE_DEPTH};
use crate::poseidon::{commitment, nullifier_hash, poseidon_config};
use crate::relation::SpendCircuit;

/// Errors raised before any proof attempt.
///
/// These are configuration or consistency failures: fatal, surfaced to
/// the integrator, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    /// A byte string is not a canonical field element
    FieldDecode(String),
    /// Authentication path length does not match the circuit depth
    PathLength { expected: usize, got: usize },
    /// Supplied public value disagrees with native recomputation
    PublicInputMismatch(String),
}

impl WitnessError {
    pub fn field_decode(label: &str, msg: impl Into<String>) -> Self {
        Self::FieldDecode(format!("{}: {}", label, msg.into()))
    }
}

impl core::fmt::Display for WitnessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::FieldDecode(msg) => write!(f, "field decode error: {}", msg),
            Self::PathLength { expected, got } => {
                write!(f, "path length mismatch: expected {}, got {}", expected, got)
            }
            Self::PublicInputMismatch(msg) => write!(f, "public input mismatch: {}", msg),
        }
    }
}

impl std::error::Error for WitnessError {}

/// The prover's private knowledge
#[derive(Clone, Debug)]
pub struct SpendWitness {
    /// Nullifier half of the secret pair
    pub nullifier: Fp,
    /// Secret half of the secret pair
    pub secret: Fp,
    /// Authentication path of the leaf commitment
    pub path: MerklePath,
}

/// The values shown to a verifier, and nothing else
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendPublicInputs {
    /// Current (or historical, known-valid) Merkle root
    pub root: Fp,
    /// Nullifier hash checked against the external spent set
    pub nullifier_hash: Fp,
}

impl SpendPublicInputs {
    /// Field-element vector in circuit allocation order.
    ///
    /// Single source of truth for both prover and verifier.
    pub fn to_field_elements(&self) -> Vec<Fp> {
        vec![self.nullifier_hash, self.root]
    }
}

/// Byte-level witness as received from storage or the wire.
///
/// Sibling and direction lists are length-checked against the circuit
/// depth here, not inside the circuit.
#[derive(Clone, Debug)]
pub struct SpendWitnessBytes {
    pub nullifier: Vec<u8>,
    pub secret: Vec<u8>,
    pub siblings: Vec<Vec<u8>>,
    pub directions: Vec<bool>,
}

impl SpendWitnessBytes {
    pub fn into_witness(self) -> Result<SpendWitness, WitnessError> {
        if self.siblings.len() != TREE_DEPTH {
            return Err(WitnessError::PathLength {
                expected: TREE_DEPTH,
                got: self.siblings.len(),
            });
        }
        if self.directions.len() != TREE_DEPTH {
            return Err(WitnessError::PathLength {
                expected: TREE_DEPTH,
                got: self.directions.len(),
            });
        }

        let mut siblings = [Fp::from(0u64); TREE_DEPTH];
        let mut path_bits = [false; TREE_DEPTH];
        for (level, sibling) in self.siblings.iter().enumerate() {
            siblings[level] = fr_from_bytes(&format!("siblings[{}]", level), sibling)?;
            path_bits[level] = self.directions[level];
        }

        Ok(SpendWitness {
            nullifier: fr_from_bytes("nullifier", &self.nullifier)?,
            secret: fr_from_bytes("secret", &self.secret)?,
            path: MerklePath { siblings, path_bits },
        })
    }
}

/// Byte-level public inputs as received from the verifier side.
#[derive(Clone, Debug)]
pub struct SpendPublicInputsBytes {
    pub root: Vec<u8>,
    pub nullifier_hash: Vec<u8>,
}

impl SpendPublicInputsBytes {
    pub fn into_public_inputs(self) -> Result<SpendPublicInputs, WitnessError> {
        Ok(SpendPublicInputs {
            root: fr_from_bytes("root", &self.root)?,
            nullifier_hash: fr_from_bytes("nullifier_hash", &self.nullifier_hash)?,
        })
    }
}

/// Assemble a fully assigned circuit from private and public values.
///
/// Cross-checks the supplied public values against native recomputation:
/// a mismatch would otherwise only surface as a degenerate,
/// always-rejecting proof after the full proving cost.
pub fn assemble(
    witness: &SpendWitness,
    public: &SpendPublicInputs,
) -> Result<SpendCircuit<Fp>, WitnessError> {
    let params = poseidon_config::<Fp>();

    let expected_nullifier_hash = nullifier_hash(&params, witness.nullifier, witness.secret);
    if expected_nullifier_hash != public.nullifier_hash {
        return Err(WitnessError::PublicInputMismatch(
            "nullifier hash does not match the secret pair".into(),
        ));
    }

    let leaf = commitment(&params, witness.nullifier, witness.secret);
    let computed_root = witness.path.compute_root(&params, leaf);
    if computed_root != public.root {
        return Err(WitnessError::PublicInputMismatch(
            "authentication path does not lead to the supplied root".into(),
        ));
    }

    debug!(leaf_index = witness.path.leaf_index(), "witness assembled");

    Ok(SpendCircuit {
        nullifier_hash: Some(public.nullifier_hash),
        root: Some(public.root),
        nullifier: Some(witness.nullifier),
        secret: Some(witness.secret),
        siblings: witness.path.siblings.map(Some),
        path_bits: witness.path.path_bits.map(Some),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::fr_to_bytes;
    use crate::merkle::MerkleTree;

    fn deposit(tree: &mut MerkleTree, nullifier: Fp, secret: Fp) -> u32 {
        let leaf = commitment(tree.params(), nullifier, secret);
        tree.insert(leaf)
    }

    #[test]
    fn test_assemble_valid() {
        let mut tree = MerkleTree::new();
        let nullifier = Fp::from(11u64);
        let secret = Fp::from(22u64);
        let index = deposit(&mut tree, nullifier, secret);
        for i in 0..4u64 {
            tree.insert(Fp::from(i + 500));
        }

        let params = poseidon_config::<Fp>();
        let witness = SpendWitness {
            nullifier,
            secret,
            path: tree.get_path(index),
        };
        let public = SpendPublicInputs {
            root: tree.root(),
            nullifier_hash: nullifier_hash(&params, nullifier, secret),
        };

        let circuit = assemble(&witness, &public).unwrap();
        assert_eq!(circuit.root, Some(public.root));
        assert_eq!(circuit.nullifier_hash, Some(public.nullifier_hash));
    }

    #[test]
    fn test_assemble_rejects_wrong_root() {
        let mut tree = MerkleTree::new();
        let nullifier = Fp::from(11u64);
        let secret = Fp::from(22u64);
        let index = deposit(&mut tree, nullifier, secret);

        let params = poseidon_config::<Fp>();
        let witness = SpendWitness {
            nullifier,
            secret,
            path: tree.get_path(index),
        };
        let public = SpendPublicInputs {
            root: tree.root() + Fp::from(1u64),
            nullifier_hash: nullifier_hash(&params, nullifier, secret),
        };

        assert!(matches!(
            assemble(&witness, &public),
            Err(WitnessError::PublicInputMismatch(_))
        ));
    }

    #[test]
    fn test_assemble_rejects_wrong_nullifier_hash() {
        let mut tree = MerkleTree::new();
        let nullifier = Fp::from(11u64);
        let secret = Fp::from(22u64);
        let index = deposit(&mut tree, nullifier, secret);

        let witness = SpendWitness {
            nullifier,
            secret,
            path: tree.get_path(index),
        };
        let public = SpendPublicInputs {
            root: tree.root(),
            nullifier_hash: Fp::from(999u64),
        };

        assert!(matches!(
            assemble(&witness, &public),
            Err(WitnessError::PublicInputMismatch(_))
        ));
    }

    #[test]
    fn test_bytes_path_length_checked() {
        let witness = SpendWitnessBytes {
            nullifier: vec![1],
            secret: vec![2],
            siblings: vec![vec![3]; TREE_DEPTH - 1],
            directions: vec![false; TREE_DEPTH],
        };

        assert!(matches!(
            witness.into_witness(),
            Err(WitnessError::PathLength { .. })
        ));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut tree = MerkleTree::new();
        let nullifier = Fp::from(31u64);
        let secret = Fp::from(32u64);
        let index = deposit(&mut tree, nullifier, secret);
        let path = tree.get_path(index);

        let bytes = SpendWitnessBytes {
            nullifier: fr_to_bytes(&nullifier).to_vec(),
            secret: fr_to_bytes(&secret).to_vec(),
            siblings: path.siblings.iter().map(|s| fr_to_bytes(s).to_vec()).collect(),
            directions: path.path_bits.to_vec(),
        };

        let witness = bytes.into_witness().unwrap();
        assert_eq!(witness.nullifier, nullifier);
        assert_eq!(witness.secret, secret);
        assert_eq!(witness.path.siblings, path.siblings);
    }
}
