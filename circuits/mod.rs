//! Tumbler ZK circuits
//!
//! The arithmetic-circuit relation for a privacy-preserving asset mixer:
//! a spender proves membership of a hidden commitment inside a public
//! Merkle tree, bound to a public nullifier hash that prevents the same
//! commitment from being spent twice.

pub mod field;
pub mod poseidon;
pub mod merkle;
pub mod relation;
pub mod witness;
pub mod backend;
pub mod spent_set;

// Re-exports for convenience
pub use field::{fr_from_bytes, fr_to_bytes, random_fr, Fp};
pub use poseidon::{commitment, hash, hash2, nullifier_hash, poseidon_config};
pub use merkle::{MerklePath, MerkleTree, TREE_DEPTH};
pub use relation::SpendCircuit;
pub use witness::{
    assemble, SpendPublicInputs, SpendPublicInputsBytes, SpendWitness, SpendWitnessBytes,
    WitnessError,
};
pub use backend::{
    artifact_from_bytes, artifact_to_bytes, BackendError, Groth16Backend, ProvingBackend,
    SpendProof, SpendProvingKey, SpendVerifyingKey,
};
pub use spent_set::SpentSet;
