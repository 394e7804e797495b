//! Poseidon specifications over the BN256 scalar field for the two arities used by compressed accounts.
//! Patterned after [halo2_gadgets::poseidon::primitives::P128Pow5T3], with round constants and MDS
//! matrices derived through the Grain LFSR instead of being hardcoded.

use halo2_gadgets::poseidon::primitives::{generate_constants, Spec};
use halo2_proofs::arithmetic::Field;
use halo2_proofs::halo2curves::bn256::Fr as Fp;
use std::sync::OnceLock;

use crate::merkle_tree::{FULL_ROUNDS, PARTIAL_ROUNDS_NODE, PARTIAL_ROUNDS_LEAF};

pub(crate) type Mds<F, const T: usize> = [[F; T]; T];

type Constants<const T: usize> = (Vec<[Fp; T]>, Mds<Fp, T>, Mds<Fp, T>);

/// Width 3, rate 2. Compresses two children into their parent node.
#[derive(Debug, Clone, Copy)]
pub struct Poseidon2Spec;

/// Width 6, rate 5. Compresses the five fields of a compressed account into its leaf.
#[derive(Debug, Clone, Copy)]
pub struct Poseidon5Spec;

static NODE_CONSTANTS: OnceLock<Constants<3>> = OnceLock::new();
static LEAF_CONSTANTS: OnceLock<Constants<6>> = OnceLock::new();

impl Spec<Fp, 3, 2> for Poseidon2Spec {
    fn full_rounds() -> usize {
        FULL_ROUNDS
    }

    fn partial_rounds() -> usize {
        PARTIAL_ROUNDS_NODE
    }

    fn sbox(val: Fp) -> Fp {
        val.pow_vartime(&[5])
    }

    fn secure_mds() -> usize {
        0
    }

    // generated once per process
    fn constants() -> Constants<3> {
        NODE_CONSTANTS
            .get_or_init(generate_constants::<Fp, Self, 3, 2>)
            .clone()
    }
}

impl Spec<Fp, 6, 5> for Poseidon5Spec {
    fn full_rounds() -> usize {
        FULL_ROUNDS
    }

    fn partial_rounds() -> usize {
        PARTIAL_ROUNDS_LEAF
    }

    fn sbox(val: Fp) -> Fp {
        val.pow_vartime(&[5])
    }

    fn secure_mds() -> usize {
        0
    }

    fn constants() -> Constants<6> {
        LEAF_CONSTANTS
            .get_or_init(generate_constants::<Fp, Self, 6, 5>)
            .clone()
    }
}
