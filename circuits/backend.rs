//! Proving backend capability
//!
//! The relation does not implement pairing arithmetic or a constraint
//! compiler; it consumes an external proving system through the narrow
//! {setup, prove, verify} capability below, so alternative SNARK
//! constructions can be substituted without touching the relation.
//!
//! `Groth16Backend` is the production implementation, over BN254.
//! Constraint synthesis ("compile") happens inside key generation and
//! proving; keys are bound to one exact circuit topology, and keys from
//! one circuit version are never valid for another.

use std::time::Instant;

use ark_bn254::Bn254;
use ark_groth16::{prepare_verifying_key, Groth16, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::SynthesisError;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use crate::field::Fp;
use crate::relation::SpendCircuit;
use crate::witness::SpendPublicInputs;

/// Backend failures. An unsatisfiable
/// witness (no proof object produced) is distinct from a cryptographic
/// rejection, which is `Ok(false)` from `verify`, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Key generation failed
    Setup(String),
    /// The claimed knowledge does not satisfy the relation
    Unsatisfiable(String),
    /// Proof generation failed for a reason other than satisfiability
    Proving(String),
    /// Verification could not be carried out (malformed inputs, not a
    /// rejection)
    Verification(String),
    /// Artifact (de)serialization failed
    Serialization(String),
}

impl BackendError {
    pub fn serialization(label: &str, msg: impl Into<String>) -> Self {
        Self::Serialization(format!("{}: {}", label, msg.into()))
    }
}

impl core::fmt::Display for BackendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Setup(msg) => write!(f, "setup error: {}", msg),
            Self::Unsatisfiable(msg) => write!(f, "unsatisfiable witness: {}", msg),
            Self::Proving(msg) => write!(f, "proving error: {}", msg),
            Self::Verification(msg) => write!(f, "verification error: {}", msg),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// One proving system, consumed as a capability.
///
/// Setup is one-shot per circuit version; proof generation may run
/// concurrently for independent witnesses against the same read-only
/// proving key; verification is a pure, idempotent function of
/// (proof, verifying key, public inputs).
pub trait ProvingBackend {
    type ProvingKey;
    type VerifyingKey;
    type Proof;

    /// Compile the circuit and generate a key pair bound to it
    fn setup<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey), BackendError>;

    /// Produce a proof from a fully assigned circuit
    fn prove<R: RngCore + CryptoRng>(
        &self,
        pk: &Self::ProvingKey,
        circuit: SpendCircuit<Fp>,
        rng: &mut R,
    ) -> Result<Self::Proof, BackendError>;

    /// Check a proof against the public inputs
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public: &SpendPublicInputs,
    ) -> Result<bool, BackendError>;
}

/// Groth16 over BN254
#[derive(Clone, Copy, Debug, Default)]
pub struct Groth16Backend;

/// Proof artifact of the production backend
pub type SpendProof = Proof<Bn254>;

/// Proving key of the production backend
pub type SpendProvingKey = ProvingKey<Bn254>;

/// Verifying key of the production backend
pub type SpendVerifyingKey = VerifyingKey<Bn254>;

impl ProvingBackend for Groth16Backend {
    type ProvingKey = ProvingKey<Bn254>;
    type VerifyingKey = VerifyingKey<Bn254>;
    type Proof = Proof<Bn254>;

    fn setup<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey), BackendError> {
        let start = Instant::now();
        let pk = Groth16::<Bn254>::generate_random_parameters_with_reduction(
            SpendCircuit::<Fp>::blank(),
            rng,
        )
        .map_err(|e| BackendError::Setup(e.to_string()))?;
        let vk = pk.vk.clone();
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "groth16 setup complete");
        Ok((pk, vk))
    }

    fn prove<R: RngCore + CryptoRng>(
        &self,
        pk: &Self::ProvingKey,
        circuit: SpendCircuit<Fp>,
        rng: &mut R,
    ) -> Result<Self::Proof, BackendError> {
        let start = Instant::now();
        let proof = Groth16::<Bn254>::create_random_proof_with_reduction(circuit, pk, rng)
            .map_err(|e| match e {
                SynthesisError::Unsatisfiable | SynthesisError::AssignmentMissing => {
                    BackendError::Unsatisfiable(e.to_string())
                }
                other => BackendError::Proving(other.to_string()),
            })?;
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "proof generated");
        Ok(proof)
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public: &SpendPublicInputs,
    ) -> Result<bool, BackendError> {
        let pvk = prepare_verifying_key(vk);
        Groth16::<Bn254>::verify_proof(&pvk, proof, &public.to_field_elements())
            .map_err(|e| BackendError::Verification(e.to_string()))
    }
}

/// Serialize a backend artifact (proof, key) to its compressed encoding
pub fn artifact_to_bytes<T: CanonicalSerialize>(
    label: &str,
    value: &T,
) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    value
        .serialize_compressed(&mut bytes)
        .map_err(|e| BackendError::serialization(label, e.to_string()))?;
    Ok(bytes)
}

/// Deserialize a backend artifact from its compressed encoding
pub fn artifact_from_bytes<T: CanonicalDeserialize>(
    label: &str,
    bytes: &[u8],
) -> Result<T, BackendError> {
    T::deserialize_compressed(bytes).map_err(|e| BackendError::serialization(label, e.to_string()))
}
