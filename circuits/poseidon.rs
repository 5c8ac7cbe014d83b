//! Poseidon hash and the commitment/nullifier scheme
//!
//! Poseidon is the ZK-friendly hash used for:
//! - Leaf commitments: hash(TAG_COMMITMENT, nullifier, secret)
//! - Nullifier hashes: hash(TAG_NULLIFIER, nullifier, secret)
//! - Merkle tree internal nodes: hash(left, right)
//!
//! The primitive comes from `ark-crypto-primitives`, which supplies both a
//! native sponge and an R1CS gadget with identical semantics. The two
//! forms must agree bit-for-bit on every input; a divergence is an
//! integration bug caught by the conformance tests, not a runtime error.
//!
//! The commitment and the nullifier hash are derived from the same secret
//! pair but under distinct domain tags, so the published nullifier hash
//! cannot be matched against the public leaf list.

use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_crypto_primitives::sponge::poseidon::{
    find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge,
};
use ark_crypto_primitives::sponge::{Absorb, CryptographicSponge, FieldBasedCryptographicSponge};
use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Sponge rate (elements absorbed per permutation)
pub const RATE: usize = 2;

/// Number of full rounds
pub const FULL_ROUNDS: u64 = 8;

/// Number of partial rounds
pub const PARTIAL_ROUNDS: u64 = 56;

/// S-box exponent
pub const ALPHA: u64 = 5;

/// Domain tag for leaf commitments
pub const TAG_COMMITMENT: u64 = 1;

/// Domain tag for nullifier hashes
pub const TAG_NULLIFIER: u64 = 2;

/// Build the Poseidon parameters for field `F`.
///
/// Generic over the field so the relation can be retargeted to another
/// curve without touching the gadgets.
pub fn poseidon_config<F: PrimeField>() -> PoseidonConfig<F> {
    let (ark, mds) = find_poseidon_ark_and_mds::<F>(
        F::MODULUS_BIT_SIZE as u64,
        RATE,
        FULL_ROUNDS,
        PARTIAL_ROUNDS,
        0,
    );
    PoseidonConfig::new(
        FULL_ROUNDS as usize,
        PARTIAL_ROUNDS as usize,
        ALPHA,
        mds,
        ark,
        RATE,
        1,
    )
}

/// Hash arbitrary field elements (native).
pub fn hash<F: PrimeField + Absorb>(params: &PoseidonConfig<F>, inputs: &[F]) -> F {
    let mut sponge = PoseidonSponge::<F>::new(params);
    sponge.absorb(&inputs);
    sponge.squeeze_native_field_elements(1)[0]
}

/// Hash two field elements (native, for Merkle tree nodes).
pub fn hash2<F: PrimeField + Absorb>(params: &PoseidonConfig<F>, a: F, b: F) -> F {
    hash(params, &[a, b])
}

/// Compute the leaf commitment for a secret pair.
pub fn commitment<F: PrimeField + Absorb>(
    params: &PoseidonConfig<F>,
    nullifier: F,
    secret: F,
) -> F {
    hash(params, &[F::from(TAG_COMMITMENT), nullifier, secret])
}

/// Compute the public nullifier hash for a secret pair.
pub fn nullifier_hash<F: PrimeField + Absorb>(
    params: &PoseidonConfig<F>,
    nullifier: F,
    secret: F,
) -> F {
    hash(params, &[F::from(TAG_NULLIFIER), nullifier, secret])
}

/// Hash arbitrary field elements (in-circuit).
pub fn hash_var<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    params: &PoseidonConfig<F>,
    inputs: &[FpVar<F>],
) -> Result<FpVar<F>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::<F>::new(cs, params);
    sponge.absorb(&inputs)?;
    let mut output = sponge.squeeze_field_elements(1)?;
    Ok(output.remove(0))
}

/// Hash two field elements (in-circuit, for Merkle tree nodes).
pub fn hash2_var<F: PrimeField>(
    cs: ConstraintSystemRef<F>,
    params: &PoseidonConfig<F>,
    a: &FpVar<F>,
    b: &FpVar<F>,
) -> Result<FpVar<F>, SynthesisError> {
    hash_var(cs, params, &[a.clone(), b.clone()])
}
