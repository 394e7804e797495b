use halo2_gadgets::poseidon::primitives::{self as poseidon, ConstantLength};
use halo2_proofs::halo2curves::bn256::Fr as Fp;
use light_poseidon::{Poseidon, PoseidonHasher};

use crate::chips::poseidon::spec::{Poseidon2Spec, Poseidon5Spec};
use crate::errors::{InclusionError, Result};
use crate::merkle_tree::utils::{ark_to_fp, fp_to_ark};

/// A fixed-arity hash family used to commit to compressed accounts and to fold Merkle paths.
///
/// The verifier and the tree builder only talk to this trait, so a different family can be
/// plugged in without touching the path logic.
pub trait MerkleHasher: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Compresses the five fields of a compressed account into one leaf.
    fn hash_leaf(inputs: [Fp; 5]) -> Result<Fp>;

    /// Compresses an ordered pair of children into their parent.
    fn hash_node(left: Fp, right: Fp) -> Result<Fp>;
}

/// Circom compatible Poseidon over BN254, the hash the on-chain protocol commits with.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircomPoseidon;

/// Pow5 Poseidon from halo2_gadgets with this crate's BN256 specs. It is the family constrained
/// by [`crate::circuits::account_inclusion::AccountInclusionCircuit`], so circuit witnesses
/// must be computed with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pow5Poseidon;

fn circom_hash(inputs: &[Fp]) -> Result<Fp> {
    let mut hasher = Poseidon::<ark_bn254::Fr>::new_circom(inputs.len())
        .map_err(|e| InclusionError::Hash(e.to_string()))?;

    let inputs = inputs.iter().map(fp_to_ark).collect::<Vec<_>>();
    let digest = hasher
        .hash(&inputs)
        .map_err(|e| InclusionError::Hash(e.to_string()))?;

    ark_to_fp(digest)
}

impl MerkleHasher for CircomPoseidon {
    fn hash_leaf(inputs: [Fp; 5]) -> Result<Fp> {
        circom_hash(&inputs)
    }

    fn hash_node(left: Fp, right: Fp) -> Result<Fp> {
        circom_hash(&[left, right])
    }
}

impl MerkleHasher for Pow5Poseidon {
    fn hash_leaf(inputs: [Fp; 5]) -> Result<Fp> {
        Ok(
            poseidon::Hash::<Fp, Poseidon5Spec, ConstantLength<5>, 6, 5>::init()
                .hash(inputs),
        )
    }

    fn hash_node(left: Fp, right: Fp) -> Result<Fp> {
        Ok(
            poseidon::Hash::<Fp, Poseidon2Spec, ConstantLength<2>, 3, 2>::init()
                .hash([left, right]),
        )
    }
}
