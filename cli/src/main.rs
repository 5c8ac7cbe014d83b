//! Tumbler CLI - deposit, prove, and verify mixer withdrawals
//!
//! Commands:
//! - deposit: generate a secret pair and publish its commitment
//! - prove: assemble a witness and generate a Groth16 proof
//! - verify: check a proof and enforce the spent-nullifier set

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

mod types;

use types::*;

use tumbler::{
    artifact_from_bytes, artifact_to_bytes, assemble, commitment, nullifier_hash,
    poseidon_config, random_fr, Fp, Groth16Backend, MerkleTree, ProvingBackend, SpendProof,
    SpendPublicInputs, SpendVerifyingKey, SpendWitness,
};

#[derive(Parser)]
#[command(name = "tumbler")]
#[command(about = "Privacy-preserving asset mixer: Groth16 Merkle-membership proofs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a deposit: a fresh secret pair and its public commitment
    Deposit {
        /// Output file for the secret pair (keep private!)
        #[arg(short, long, default_value = "deposit.json")]
        output: PathBuf,

        /// Public commitment pool to append to
        #[arg(short, long, default_value = "pool.json")]
        pool: PathBuf,
    },

    /// Generate a proof of membership for a deposit
    Prove {
        /// Deposit file (from `deposit`)
        #[arg(short, long, default_value = "deposit.json")]
        deposit: PathBuf,

        /// Public commitment pool (current tree state)
        #[arg(long, default_value = "pool.json")]
        pool: PathBuf,

        /// Output proof file
        #[arg(long, default_value = "proof.bin")]
        proof: PathBuf,

        /// Output verifying key file
        #[arg(long, default_value = "vk.bin")]
        vk: PathBuf,

        /// Output public inputs file
        #[arg(long, default_value = "public.json")]
        public: PathBuf,
    },

    /// Verify a proof and mark its nullifier hash spent
    Verify {
        /// Proof file
        #[arg(long, default_value = "proof.bin")]
        proof: PathBuf,

        /// Verifying key file
        #[arg(long, default_value = "vk.bin")]
        vk: PathBuf,

        /// Public inputs file
        #[arg(long, default_value = "public.json")]
        public: PathBuf,

        /// Spent-nullifier bookkeeping file
        #[arg(long, default_value = "spent.json")]
        spent: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Deposit { output, pool } => cmd_deposit(&output, &pool),
        Commands::Prove { deposit, pool, proof, vk, public } => {
            cmd_prove(&deposit, &pool, &proof, &vk, &public)
        }
        Commands::Verify { proof, vk, public, spent } => {
            cmd_verify(&proof, &vk, &public, &spent)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn cmd_deposit(output: &Path, pool_path: &Path) -> Result<(), Box<dyn Error>> {
    let mut rng = rand::thread_rng();
    let nullifier = random_fr(&mut rng);
    let secret = random_fr(&mut rng);

    let params = poseidon_config::<Fp>();
    let leaf = commitment(&params, nullifier, secret);
    let nh = nullifier_hash(&params, nullifier, secret);

    let deposit = DepositFile {
        nullifier: fr_to_hex(&nullifier),
        secret: fr_to_hex(&secret),
        commitment: fr_to_hex(&leaf),
        nullifier_hash: fr_to_hex(&nh),
    };
    fs::write(output, serde_json::to_string_pretty(&deposit)?)?;

    let mut pool = load_pool(pool_path)?;
    pool.commitments.push(deposit.commitment.clone());
    fs::write(pool_path, serde_json::to_string_pretty(&pool)?)?;

    println!("deposit written to {}", output.display());
    println!("commitment: {}", deposit.commitment);
    println!("pool size: {}", pool.commitments.len());
    Ok(())
}

fn cmd_prove(
    deposit_path: &Path,
    pool_path: &Path,
    proof_path: &Path,
    vk_path: &Path,
    public_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let deposit: DepositFile = serde_json::from_str(&fs::read_to_string(deposit_path)?)?;
    let pool = load_pool(pool_path)?;

    // Rebuild the tree from the public pool
    let mut tree = MerkleTree::new();
    for (i, c) in pool.commitments.iter().enumerate() {
        tree.insert(fr_from_hex(&format!("pool[{}]", i), c)?);
    }

    let index = pool
        .find_leaf(&deposit.commitment)
        .ok_or("deposit commitment not found in pool")?;

    let witness = SpendWitness {
        nullifier: fr_from_hex("nullifier", &deposit.nullifier)?,
        secret: fr_from_hex("secret", &deposit.secret)?,
        path: tree.get_path(index),
    };
    let public = SpendPublicInputs {
        root: tree.root(),
        nullifier_hash: fr_from_hex("nullifier_hash", &deposit.nullifier_hash)?,
    };

    let circuit = assemble(&witness, &public)?;

    // Fresh keys per circuit version; reuse vk.bin for all proofs of it
    let backend = Groth16Backend;
    let mut rng = rand::thread_rng();
    println!("generating keys (one-time per circuit version)...");
    let (pk, vk) = backend.setup(&mut rng)?;

    println!("proving...");
    let proof = backend.prove(&pk, circuit, &mut rng)?;

    fs::write(proof_path, artifact_to_bytes("proof", &proof)?)?;
    fs::write(vk_path, artifact_to_bytes("verifying key", &vk)?)?;
    let public_file = PublicInputsFile {
        root: fr_to_hex(&public.root),
        nullifier_hash: fr_to_hex(&public.nullifier_hash),
    };
    fs::write(public_path, serde_json::to_string_pretty(&public_file)?)?;

    println!("proof written to {}", proof_path.display());
    Ok(())
}

/// Verify a proof, then enforce the spent file.
///
/// The spent file is read, checked, and rewritten without locking, so
/// this command assumes one verifier process at a time. A concurrent
/// deployment needs the in-process `SpentSet`, whose check-and-mark is
/// atomic, in front of a single writer.
fn cmd_verify(
    proof_path: &Path,
    vk_path: &Path,
    public_path: &Path,
    spent_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let proof: SpendProof = artifact_from_bytes("proof", &fs::read(proof_path)?)?;
    let vk: SpendVerifyingKey = artifact_from_bytes("verifying key", &fs::read(vk_path)?)?;
    let public_file: PublicInputsFile = serde_json::from_str(&fs::read_to_string(public_path)?)?;

    let public = SpendPublicInputs {
        root: fr_from_hex("root", &public_file.root)?,
        nullifier_hash: fr_from_hex("nullifier_hash", &public_file.nullifier_hash)?,
    };

    let backend = Groth16Backend;
    if !backend.verify(&vk, &proof, &public)? {
        eprintln!("proof rejected: not authorized");
        process::exit(1);
    }

    // Double-spend check is independent of proof validity
    let mut spent = load_spent(spent_path)?;
    if spent.spent.contains(&public_file.nullifier_hash) {
        eprintln!("proof valid, but nullifier hash already spent: rejected");
        process::exit(1);
    }
    spent.spent.push(public_file.nullifier_hash.clone());
    fs::write(spent_path, serde_json::to_string_pretty(&spent)?)?;

    println!("proof verified; nullifier hash marked spent");
    Ok(())
}

fn load_pool(path: &Path) -> Result<PoolFile, Box<dyn Error>> {
    if path.exists() {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    } else {
        Ok(PoolFile::default())
    }
}

fn load_spent(path: &Path) -> Result<SpentFile, Box<dyn Error>> {
    if path.exists() {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    } else {
        Ok(SpentFile::default())
    }
}
