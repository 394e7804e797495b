//! Fixed-length Poseidon hashing of assigned cells, on top of the `Pow5Chip` permutation and the
//! `Hash` sponge of halo2_gadgets.
use halo2_gadgets::poseidon::{primitives::*, Hash, Pow5Chip, Pow5Config};
use halo2_proofs::{
    circuit::{AssignedCell, Layouter},
    halo2curves::bn256::Fr as Fp,
    plonk::{Advice, Column, ConstraintSystem, Error, Fixed},
};
use std::marker::PhantomData;

use super::spec::{Poseidon2Spec, Poseidon5Spec};

/// Chip hashing the five fields of a compressed account into its leaf
pub type LeafHashChip = PoseidonChip<Poseidon5Spec, 6, 5, 5>;
pub type LeafHashConfig = PoseidonConfig<6, 5, 5>;

/// Chip hashing two sibling nodes into their parent
pub type NodeHashChip = PoseidonChip<Poseidon2Spec, 3, 2, 2>;
pub type NodeHashConfig = PoseidonConfig<3, 2, 2>;

/// Configuration of a [`PoseidonChip`] absorbing `L` elements with a `WIDTH` wide state of which
/// `RATE = WIDTH - 1` elements are absorbed per permutation.
#[derive(Debug, Clone)]
pub struct PoseidonConfig<const WIDTH: usize, const RATE: usize, const L: usize> {
    pow5_config: Pow5Config<Fp, WIDTH, RATE>,
}

#[derive(Debug, Clone)]
pub struct PoseidonChip<
    S: Spec<Fp, WIDTH, RATE>,
    const WIDTH: usize,
    const RATE: usize,
    const L: usize,
> {
    config: PoseidonConfig<WIDTH, RATE, L>,
    _marker: PhantomData<S>,
}

impl<S: Spec<Fp, WIDTH, RATE>, const WIDTH: usize, const RATE: usize, const L: usize>
    PoseidonChip<S, WIDTH, RATE, L>
{
    pub fn construct(config: PoseidonConfig<WIDTH, RATE, L>) -> Self {
        Self {
            config,
            _marker: PhantomData,
        }
    }

    /// Creates the permutation gates over caller provided columns.
    ///
    /// Chips of different widths can be laid over the same columns, each one gets its own
    /// selectors. The initial sponge state is assigned from constants, so a fixed column must be
    /// enabled for constants by the caller.
    pub fn configure(
        meta: &mut ConstraintSystem<Fp>,
        state: [Column<Advice>; WIDTH],
        partial_sbox: Column<Advice>,
        rc_a: [Column<Fixed>; WIDTH],
        rc_b: [Column<Fixed>; WIDTH],
    ) -> PoseidonConfig<WIDTH, RATE, L> {
        PoseidonConfig {
            pow5_config: Pow5Chip::configure::<S>(meta, state, partial_sbox, rc_a, rc_b),
        }
    }

    /// Copies `input_cells` into the sponge and returns the cell holding the digest
    pub fn hash(
        &self,
        mut layouter: impl Layouter<Fp>,
        input_cells: [AssignedCell<Fp, Fp>; L],
    ) -> Result<AssignedCell<Fp, Fp>, Error> {
        let pow5_chip = Pow5Chip::construct(self.config.pow5_config.clone());

        Hash::<_, _, S, ConstantLength<L>, WIDTH, RATE>::init(
            pow5_chip,
            layouter.namespace(|| "init sponge"),
        )?
        .hash(layouter.namespace(|| "absorb and squeeze"), input_cells)
    }
}
