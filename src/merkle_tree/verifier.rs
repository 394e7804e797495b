use halo2_proofs::halo2curves::bn256::Fr as Fp;
use tracing::debug;

use crate::errors::{InclusionError, Result};
use crate::merkle_tree::{MerkleHasher, MAX_DEPTH};

/// Inclusion proof of a leaf in a tree with a given root.
///
/// Bit `i` of `leaf_index` gives the position of the running node at level `i`: `0` when it is
/// the left child, `1` when it is the right child.
#[derive(Clone, Debug, PartialEq)]
pub struct MerkleProof {
    pub leaf: Fp,
    pub sibling_hashes: Vec<Fp>,
    pub leaf_index: u64,
    pub root: Fp,
}

impl MerkleProof {
    pub fn init_empty(depth: usize) -> Self {
        MerkleProof {
            leaf: Fp::from(0),
            sibling_hashes: vec![Fp::from(0); depth],
            leaf_index: 0,
            root: Fp::from(0),
        }
    }

    /// Path directions from the leaf up, `true` meaning the running node is the right child
    pub fn path_indices(&self) -> Vec<bool> {
        (0..self.sibling_hashes.len())
            .map(|level| (self.leaf_index >> level) & 1 == 1)
            .collect()
    }

    pub fn verify<H: MerkleHasher>(&self, depth: usize) -> Result<bool> {
        verify_inclusion::<H>(
            self.leaf,
            &self.sibling_hashes,
            self.leaf_index,
            self.root,
            depth,
        )
    }
}

/// Rejects paths that do not have exactly `depth` siblings and positions outside `[0, 2^depth)`.
pub fn validate_path(siblings: &[Fp], leaf_index: u64, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(InclusionError::InvalidTreeDepth {
            depth,
            max: MAX_DEPTH,
        });
    }

    if siblings.len() != depth {
        return Err(InclusionError::InvalidPathLength {
            expected: depth,
            actual: siblings.len(),
        });
    }

    if leaf_index >> depth != 0 {
        return Err(InclusionError::LeafIndexOutOfRange {
            index: leaf_index,
            depth,
        });
    }

    Ok(())
}

/// Folds `leaf` up the path and returns the root it leads to.
pub fn compute_root<H: MerkleHasher>(
    leaf: Fp,
    siblings: &[Fp],
    leaf_index: u64,
    depth: usize,
) -> Result<Fp> {
    validate_path(siblings, leaf_index, depth)?;

    let mut node = leaf;

    for (level, sibling) in siblings.iter().enumerate() {
        node = if (leaf_index >> level) & 1 == 0 {
            H::hash_node(node, *sibling)?
        } else {
            H::hash_node(*sibling, node)?
        };
    }

    Ok(node)
}

/// Checks that `leaf` sits at `leaf_index` in the tree with root `expected_root`.
///
/// Returns `Ok(false)` when the recomputed root differs. Errors are reserved for malformed inputs,
/// which are rejected before any hashing happens.
pub fn verify_inclusion<H: MerkleHasher>(
    leaf: Fp,
    siblings: &[Fp],
    leaf_index: u64,
    expected_root: Fp,
    depth: usize,
) -> Result<bool> {
    let root = compute_root::<H>(leaf, siblings, leaf_index, depth)?;

    if root != expected_root {
        debug!(
            leaf_index,
            depth,
            computed_root = ?root,
            expected_root = ?expected_root,
            "recomputed root does not match the expected root"
        );
        return Ok(false);
    }

    Ok(true)
}
