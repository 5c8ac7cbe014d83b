//! Merkle tree over leaf commitments
//!
//! An append-only, fixed-depth tree for storing commitments, kept sparse
//! so only occupied leaves are materialized. The circuit proves membership
//! without revealing which leaf; everything here is the native side used
//! for tree construction and witness preparation.

use std::collections::HashMap;

use ark_crypto_primitives::sponge::poseidon::PoseidonConfig;

use crate::field::Fp;
use crate::poseidon::{hash2, poseidon_config};

/// Merkle tree depth (supports 2^DEPTH leaves, adjustable for production).
///
/// Depth is a circuit parameter fixed at compile time; changing it is a
/// new circuit version requiring fresh keys.
pub const TREE_DEPTH: usize = 8;

/// A Merkle authentication path (sibling hashes from leaf to root)
#[derive(Clone, Debug)]
pub struct MerklePath {
    /// Sibling hashes at each level
    pub siblings: [Fp; TREE_DEPTH],
    /// Direction bits (false = current node is on the left)
    pub path_bits: [bool; TREE_DEPTH],
}

impl MerklePath {
    /// Verify this path leads from the given leaf to the given root
    pub fn verify(&self, params: &PoseidonConfig<Fp>, leaf: Fp, root: Fp) -> bool {
        self.compute_root(params, leaf) == root
    }

    /// Recompute the root from a leaf using this path
    pub fn compute_root(&self, params: &PoseidonConfig<Fp>, leaf: Fp) -> Fp {
        let mut current = leaf;

        for level in 0..TREE_DEPTH {
            let sibling = self.siblings[level];

            current = if self.path_bits[level] {
                // Current node is on the right
                hash2(params, sibling, current)
            } else {
                hash2(params, current, sibling)
            };
        }

        current
    }

    /// Recover the leaf index encoded by the direction bits
    pub fn leaf_index(&self) -> u32 {
        let mut index = 0u32;
        for (level, bit) in self.path_bits.iter().enumerate() {
            if *bit {
                index |= 1 << level;
            }
        }
        index
    }
}

/// In-memory Merkle tree for building and updating.
///
/// Sparse representation: only inserted leaves are stored; everything else
/// hashes up from precomputed empty-subtree roots. Insertions require
/// `&mut self`, which linearizes them relative to any root read.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    /// Leaves indexed by position
    leaves: HashMap<u32, Fp>,
    /// Number of leaves inserted
    pub leaf_count: u32,
    /// empty_roots[i] = root of an empty subtree of depth i
    empty_roots: [Fp; TREE_DEPTH + 1],
    /// Hash parameters shared by all node computations
    params: PoseidonConfig<Fp>,
}

impl MerkleTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        let params = poseidon_config::<Fp>();
        let mut empty_roots = [Fp::from(0u64); TREE_DEPTH + 1];
        for i in 1..=TREE_DEPTH {
            empty_roots[i] = hash2(&params, empty_roots[i - 1], empty_roots[i - 1]);
        }

        Self {
            leaves: HashMap::new(),
            leaf_count: 0,
            empty_roots,
            params,
        }
    }

    /// Insert a leaf at the next available position, returning its index.
    ///
    /// Panics when the tree is full: a leaf past capacity would fall
    /// outside every subtree `root` folds, so it could never be proven.
    pub fn insert(&mut self, leaf: Fp) -> u32 {
        assert!(
            self.leaf_count < Self::capacity(),
            "merkle tree full: capacity {} leaves",
            Self::capacity()
        );
        let index = self.leaf_count;
        self.leaves.insert(index, leaf);
        self.leaf_count += 1;
        index
    }

    /// Maximum number of leaves (2^TREE_DEPTH)
    pub const fn capacity() -> u32 {
        1 << TREE_DEPTH
    }

    /// Get the leaf at a given index (empty leaves are zero)
    pub fn get_leaf(&self, index: u32) -> Fp {
        self.leaves.get(&index).copied().unwrap_or(Fp::from(0u64))
    }

    /// Compute the current root
    pub fn root(&self) -> Fp {
        self.compute_subtree_root(0, TREE_DEPTH)
    }

    /// Hash parameters used by this tree
    pub fn params(&self) -> &PoseidonConfig<Fp> {
        &self.params
    }

    /// Compute root of the subtree of the given depth starting at start_index
    fn compute_subtree_root(&self, start_index: u32, depth: usize) -> Fp {
        if depth == 0 {
            return self.get_leaf(start_index);
        }

        if start_index >= self.leaf_count {
            return self.empty_roots[depth];
        }

        let subtree_size = 1u32 << (depth - 1);
        let left = self.compute_subtree_root(start_index, depth - 1);
        let right_index = start_index + subtree_size;
        let right = if right_index >= self.leaf_count {
            self.empty_roots[depth - 1]
        } else {
            self.compute_subtree_root(right_index, depth - 1)
        };

        hash2(&self.params, left, right)
    }

    /// Generate the authentication path for the given leaf index
    pub fn get_path(&self, index: u32) -> MerklePath {
        let mut siblings = [Fp::from(0u64); TREE_DEPTH];
        let mut path_bits = [false; TREE_DEPTH];
        let mut current_index = index;

        for level in 0..TREE_DEPTH {
            path_bits[level] = (current_index & 1) == 1;

            let sibling_index = current_index ^ 1;
            let subtree_start = sibling_index << level;
            siblings[level] = self.compute_subtree_root(subtree_start, level);

            current_index >>= 1;
        }

        MerklePath { siblings, path_bits }
    }
}

impl Default for MerkleTree {
    fn default() -> Self {
        Self::new()
    }
}
