//! The spend relation circuit
//!
//! Full provable statement: "I know (nullifier, secret, path) such that
//! H(TAG_COMMITMENT, nullifier, secret) is a leaf whose Merkle path leads
//! to public root R, and H(TAG_NULLIFIER, nullifier, secret) equals public
//! value N." Public inputs are exactly N then R, in that order; nothing
//! else is public, so which leaf was spent stays hidden.
//!
//! The circuit never "throws" on bad knowledge: an unsatisfiable witness
//! is discovered at proof generation or verification, not here.

use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;
use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::merkle::TREE_DEPTH;
use crate::poseidon::{hash2_var, hash_var, poseidon_config, TAG_COMMITMENT, TAG_NULLIFIER};

/// Merkle membership gadget.
///
/// Folds `leaf` with each (sibling, direction) pair and constrains the
/// final node equal to `root`. Each direction is allocated as a `Boolean`
/// witness, so it is constrained to {0,1} by construction; a malicious
/// witness cannot encode a selector that is neither sibling order. The
/// gadget adds one hash-and-select chain of length `TREE_DEPTH`; trust in
/// `root` is the caller's concern (here it is bound to a public input).
pub fn enforce_merkle_membership<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    params: &PoseidonConfig<F>,
    leaf: &FpVar<F>,
    root: &FpVar<F>,
    siblings: &[Option<F>; TREE_DEPTH],
    path_bits: &[Option<bool>; TREE_DEPTH],
) -> Result<(), SynthesisError> {
    let mut current = leaf.clone();

    for level in 0..TREE_DEPTH {
        let sibling = FpVar::new_witness(cs.clone(), || {
            siblings[level].ok_or(SynthesisError::AssignmentMissing)
        })?;
        let bit = Boolean::new_witness(cs.clone(), || {
            path_bits[level].ok_or(SynthesisError::AssignmentMissing)
        })?;

        // bit set means the current node is on the right
        let left = bit.select(&sibling, &current)?;
        let right = bit.select(&current, &sibling)?;
        current = hash2_var(cs.clone(), params, &left, &right)?;
    }

    current.enforce_equal(root)
}

/// The spend circuit.
///
/// Assignment fields are `Option` so the same type drives key generation
/// (blank, topology only) and proving (fully assigned).
#[derive(Clone, Debug)]
pub struct SpendCircuit<F: PrimeField> {
    /// Public: nullifier hash disclosed at withdrawal
    pub nullifier_hash: Option<F>,
    /// Public: Merkle root of the commitment tree
    pub root: Option<F>,
    /// Private: nullifier half of the secret pair
    pub nullifier: Option<F>,
    /// Private: secret half of the secret pair
    pub secret: Option<F>,
    /// Private: sibling hashes along the authentication path
    pub siblings: [Option<F>; TREE_DEPTH],
    /// Private: direction bits, same length as siblings
    pub path_bits: [Option<bool>; TREE_DEPTH],
}

impl<F: PrimeField> SpendCircuit<F> {
    /// Circuit with no assignment, for key generation
    pub fn blank() -> Self {
        Self {
            nullifier_hash: None,
            root: None,
            nullifier: None,
            secret: None,
            siblings: [None; TREE_DEPTH],
            path_bits: [None; TREE_DEPTH],
        }
    }
}

impl<F: PrimeField> ConstraintSynthesizer<F> for SpendCircuit<F> {
    fn generate_constraints(self, cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        let params = poseidon_config::<F>();

        // Public inputs, allocation order fixed: nullifier hash, then root
        let nullifier_hash = FpVar::new_input(cs.clone(), || {
            self.nullifier_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let root = FpVar::new_input(cs.clone(), || {
            self.root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let nullifier = FpVar::new_witness(cs.clone(), || {
            self.nullifier.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let secret = FpVar::new_witness(cs.clone(), || {
            self.secret.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // (1) candidate nullifier hash, bound to the public input
        let tag_nullifier = FpVar::constant(F::from(TAG_NULLIFIER));
        let candidate = hash_var(
            cs.clone(),
            &params,
            &[tag_nullifier, nullifier.clone(), secret.clone()],
        )?;
        candidate.enforce_equal(&nullifier_hash)?;

        // (2) leaf commitment from the same secret pair
        let tag_commitment = FpVar::constant(F::from(TAG_COMMITMENT));
        let leaf = hash_var(cs.clone(), &params, &[tag_commitment, nullifier, secret])?;

        // (3) membership of that leaf under the public root
        enforce_merkle_membership(cs, &params, &leaf, &root, &self.siblings, &self.path_bits)
    }
}
