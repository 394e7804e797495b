use halo2_proofs::halo2curves::bn256::Fr as Fp;
use std::marker::PhantomData;
use std::path::Path;

use crate::errors::{InclusionError, Result};
use crate::merkle_tree::utils::{build_levels, compute_leaves, parse_csv_to_accounts, zero_hashes};
use crate::merkle_tree::{verify_inclusion, CompressedAccount, MerkleHasher, MerkleProof, MAX_DEPTH};

/// Sparse append-only Merkle tree of compressed account leaves.
///
/// The tree has a fixed depth. Slots past the last inserted leaf hold the empty leaf `0`, so only
/// the populated prefix of each level is materialised and the rest is covered by zero hashes.
#[derive(Clone, Debug)]
pub struct AccountTree<H: MerkleHasher> {
    root: Fp,
    depth: usize,
    nodes: Vec<Vec<Fp>>,
    zeros: Vec<Fp>,
    accounts: Vec<CompressedAccount>,
    _marker: PhantomData<H>,
}

impl<H: MerkleHasher> AccountTree<H> {
    /// Builds a tree of the given depth over precomputed leaves
    pub fn new(depth: usize, leaves: Vec<Fp>) -> Result<Self> {
        Self::build(depth, leaves, vec![])
    }

    /// Hashes `accounts` into leaves and builds the tree. Account `i` must declare leaf index `i`.
    pub fn from_accounts(
        depth: usize,
        accounts: Vec<CompressedAccount>,
        domain_offset: Fp,
    ) -> Result<Self> {
        Self::check_capacity(depth, accounts.len())?;
        let leaves = compute_leaves::<H>(&accounts, domain_offset)?;
        Self::build(depth, leaves, accounts)
    }

    pub fn from_csv<P: AsRef<Path>>(path: P, depth: usize, domain_offset: Fp) -> Result<Self> {
        let accounts = parse_csv_to_accounts(path)?;
        Self::from_accounts(depth, accounts, domain_offset)
    }

    fn check_capacity(depth: usize, leaves: usize) -> Result<()> {
        if !(1..=MAX_DEPTH).contains(&depth) {
            return Err(InclusionError::InvalidTreeDepth {
                depth,
                max: MAX_DEPTH,
            });
        }

        if leaves as u64 > 1u64 << depth {
            return Err(InclusionError::TooManyLeaves { leaves, depth });
        }

        Ok(())
    }

    fn build(depth: usize, leaves: Vec<Fp>, accounts: Vec<CompressedAccount>) -> Result<Self> {
        Self::check_capacity(depth, leaves.len())?;

        let zeros = zero_hashes::<H>(depth)?;
        let nodes = build_levels::<H>(leaves, &zeros, depth)?;
        let root = nodes[depth].first().copied().unwrap_or(zeros[depth]);

        Ok(AccountTree {
            root,
            depth,
            nodes,
            zeros,
            accounts,
            _marker: PhantomData,
        })
    }

    pub fn root(&self) -> &Fp {
        &self.root
    }

    pub fn depth(&self) -> &usize {
        &self.depth
    }

    pub fn leaves(&self) -> &[Fp] {
        &self.nodes[0]
    }

    /// Accounts the tree was built from, empty when it was built from raw leaves
    pub fn accounts(&self) -> &[CompressedAccount] {
        &self.accounts
    }

    pub fn get_account(&self, index: usize) -> Option<&CompressedAccount> {
        self.accounts.get(index)
    }

    pub fn index_of(&self, leaf: &Fp) -> Option<usize> {
        self.leaves().iter().position(|node| node == leaf)
    }

    /// Generates the inclusion proof of the leaf at `index`
    pub fn generate_proof(&self, index: usize) -> Result<MerkleProof> {
        if index >= self.leaves().len() {
            return Err(InclusionError::LeafNotFound);
        }

        let mut sibling_hashes = Vec::with_capacity(self.depth);
        let mut current_index = index;

        for level in 0..self.depth {
            let sibling = self.nodes[level]
                .get(current_index ^ 1)
                .copied()
                .unwrap_or(self.zeros[level]);
            sibling_hashes.push(sibling);
            current_index /= 2;
        }

        Ok(MerkleProof {
            leaf: self.nodes[0][index],
            sibling_hashes,
            leaf_index: index as u64,
            root: self.root,
        })
    }

    /// Verifies a proof against this tree's root and depth
    pub fn verify_proof(&self, proof: &MerkleProof) -> Result<bool> {
        verify_inclusion::<H>(
            proof.leaf,
            &proof.sibling_hashes,
            proof.leaf_index,
            self.root,
            self.depth,
        )
    }
}
