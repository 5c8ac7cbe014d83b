//! Field boundary for the mixer relation
//!
//! All circuit arithmetic happens in the scalar field of the proving
//! backend's curve (BN254). Everything crossing into the relation from the
//! outside world passes through the decoders here, which reject values
//! that are not canonical field elements.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};

use crate::witness::WitnessError;

/// Scalar field of the proving backend's curve.
///
/// The gadgets themselves are generic over `PrimeField`; this alias is the
/// single point where the concrete field is chosen.
pub type Fp = ark_bn254::Fr;

/// Byte width of a canonically encoded field element.
pub const FIELD_BYTES: usize = 32;

/// Decode a big-endian byte string into a field element.
///
/// Rejects empty input, input longer than 32 bytes, and non-canonical
/// encodings (values >= the field modulus). Out-of-range integers must
/// never reach witness assembly silently reduced.
pub fn fr_from_bytes(label: &str, bytes: &[u8]) -> Result<Fp, WitnessError> {
    if bytes.is_empty() {
        return Err(WitnessError::field_decode(label, "empty field bytes"));
    }
    if bytes.len() > FIELD_BYTES {
        return Err(WitnessError::field_decode(
            label,
            format!("expected at most {} bytes, got {}", FIELD_BYTES, bytes.len()),
        ));
    }

    let value = Fr::from_be_bytes_mod_order(bytes);

    // A canonical encoding survives a decode/encode round trip unchanged.
    let mut padded = [0u8; FIELD_BYTES];
    padded[FIELD_BYTES - bytes.len()..].copy_from_slice(bytes);
    if fr_to_bytes(&value) != padded {
        return Err(WitnessError::field_decode(
            label,
            "non-canonical encoding (value >= field modulus)",
        ));
    }

    Ok(value)
}

/// Sample a uniformly random field element (secret-pair generation).
pub fn random_fr<R: ark_std::rand::RngCore>(rng: &mut R) -> Fp {
    use ark_ff::UniformRand;
    Fp::rand(rng)
}

/// Encode a field element as fixed-width big-endian bytes.
pub fn fr_to_bytes(value: &Fp) -> [u8; FIELD_BYTES] {
    let repr = value.into_bigint().to_bytes_be();
    let mut out = [0u8; FIELD_BYTES];
    out[FIELD_BYTES - repr.len()..].copy_from_slice(&repr);
    out
}
