//! End-to-end tests: setup, prove, verify, and the external spent set

use std::sync::Arc;

use ark_std::rand::{rngs::StdRng, SeedableRng};

/// Same deterministic seed as `ark_std::test_rng`, but with a concrete
/// return type so the `CryptoRng` bound on the backend is satisfied
/// (`test_rng` returns an opaque `impl Rng`).
fn test_rng() -> StdRng {
    StdRng::from_seed([
        1, 0, 0, 0, 23, 0, 0, 0, 200, 1, 0, 0, 210, 30, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0,
    ])
}

use tumbler::{
    artifact_from_bytes, artifact_to_bytes, assemble, commitment, nullifier_hash,
    poseidon_config, Fp, Groth16Backend, MerkleTree, ProvingBackend, SpendProof, SpendPublicInputs,
    SpendVerifyingKey, SpendWitness, SpentSet,
};

/// Build a tree of `n` deposits and return the witness/public pair for
/// the deposit at `index`.
fn withdrawal_instance(n: u64, index: u32) -> (SpendWitness, SpendPublicInputs) {
    let params = poseidon_config::<Fp>();
    let mut tree = MerkleTree::new();

    let mut chosen = None;
    for i in 0..n {
        let nullifier = Fp::from(i * 2 + 1);
        let secret = Fp::from(i * 2 + 2);
        let leaf = commitment(&params, nullifier, secret);
        let leaf_index = tree.insert(leaf);
        if leaf_index == index {
            chosen = Some((nullifier, secret));
        }
    }

    let (nullifier, secret) = chosen.expect("index within tree");
    let witness = SpendWitness {
        nullifier,
        secret,
        path: tree.get_path(index),
    };
    let public = SpendPublicInputs {
        root: tree.root(),
        nullifier_hash: nullifier_hash(&params, nullifier, secret),
    };
    (witness, public)
}

#[test]
fn test_full_withdrawal_lifecycle() {
    let backend = Groth16Backend;
    let mut rng = test_rng();

    // Deposit phase: 12 commitments, spend leaf 5
    let (witness, public) = withdrawal_instance(12, 5);
    let circuit = assemble(&witness, &public).unwrap();

    let (pk, vk) = backend.setup(&mut rng).unwrap();
    let proof = backend.prove(&pk, circuit, &mut rng).unwrap();

    // Valid proof verifies against the correct public inputs
    assert!(backend.verify(&vk, &proof, &public).unwrap());

    // Idempotent: same tuple, same result
    assert!(backend.verify(&vk, &proof, &public).unwrap());

    // Wrong root rejects
    let wrong_root = SpendPublicInputs {
        root: public.root + Fp::from(1u64),
        nullifier_hash: public.nullifier_hash,
    };
    assert!(!backend.verify(&vk, &proof, &wrong_root).unwrap());

    // Wrong nullifier hash rejects
    let wrong_nh = SpendPublicInputs {
        root: public.root,
        nullifier_hash: public.nullifier_hash + Fp::from(1u64),
    };
    assert!(!backend.verify(&vk, &proof, &wrong_nh).unwrap());

    // Root from an unrelated tree state rejects
    let (_, other_public) = withdrawal_instance(9, 2);
    assert_ne!(other_public.root, public.root);
    let other_root = SpendPublicInputs {
        root: other_public.root,
        nullifier_hash: public.nullifier_hash,
    };
    assert!(!backend.verify(&vk, &proof, &other_root).unwrap());

    // Artifacts survive a serialization round trip
    let proof_bytes = artifact_to_bytes("proof", &proof).unwrap();
    let vk_bytes = artifact_to_bytes("vk", &vk).unwrap();
    let proof2: SpendProof = artifact_from_bytes("proof", &proof_bytes).unwrap();
    let vk2: SpendVerifyingKey = artifact_from_bytes("vk", &vk_bytes).unwrap();
    assert!(backend.verify(&vk2, &proof2, &public).unwrap());

    // Double-spend: bookkeeping rejects the second withdrawal even though
    // the proof itself is still cryptographically valid
    let spent = SpentSet::new();
    assert!(spent.try_spend(&public.nullifier_hash));
    assert!(backend.verify(&vk, &proof, &public).unwrap());
    assert!(!spent.try_spend(&public.nullifier_hash));
}

#[test]
fn test_tampered_witness_produces_no_accepted_proof() {
    let backend = Groth16Backend;
    let mut rng = test_rng();

    let (witness, public) = withdrawal_instance(8, 3);

    // Flip one direction bit without recomputing siblings, bypassing the
    // assembler's native pre-check
    let mut path_bits = witness.path.path_bits;
    path_bits[0] = !path_bits[0];
    let circuit = tumbler::SpendCircuit {
        nullifier_hash: Some(public.nullifier_hash),
        root: Some(public.root),
        nullifier: Some(witness.nullifier),
        secret: Some(witness.secret),
        siblings: witness.path.siblings.map(Some),
        path_bits: path_bits.map(Some),
    };

    let (pk, vk) = backend.setup(&mut rng).unwrap();

    // No proof object may come out of this accepted: the prover either
    // refuses (debug builds assert satisfaction, hence catch_unwind) or a
    // forced proof fails verification
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let mut rng = test_rng();
        backend.prove(&pk, circuit, &mut rng)
    }));
    match outcome {
        Err(_) | Ok(Err(_)) => {}
        Ok(Ok(proof)) => assert!(!backend.verify(&vk, &proof, &public).unwrap()),
    }
}

#[test]
fn test_concurrent_withdrawals_independent_witnesses() {
    let backend = Groth16Backend;
    let mut rng = test_rng();

    let (pk, vk) = backend.setup(&mut rng).unwrap();
    let pk = Arc::new(pk);

    // Two independent spends of the same tree, proved concurrently
    // against the shared read-only proving key
    let handles: Vec<_> = [1u32, 4u32]
        .into_iter()
        .map(|index| {
            let pk = Arc::clone(&pk);
            std::thread::spawn(move || {
                let (witness, public) = withdrawal_instance(6, index);
                let circuit = assemble(&witness, &public).unwrap();
                let mut rng = test_rng();
                let proof = Groth16Backend.prove(&pk, circuit, &mut rng).unwrap();
                (proof, public)
            })
        })
        .collect();

    let spent = SpentSet::new();
    for handle in handles {
        let (proof, public) = handle.join().unwrap();
        assert!(backend.verify(&vk, &proof, &public).unwrap());
        assert!(spent.try_spend(&public.nullifier_hash));
    }
    assert_eq!(spent.len(), 2);
}
