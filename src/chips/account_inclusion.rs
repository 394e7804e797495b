use halo2_proofs::circuit::{AssignedCell, Layouter, Value};
use halo2_proofs::halo2curves::{bn256::Fr as Fp, group::ff::PrimeField};
use halo2_proofs::plonk::{Advice, Column, ConstraintSystem, Error, Expression, Selector};
use halo2_proofs::poly::Rotation;

/// Configuration of the [`AccountInclusionChip`].
///
/// # Fields
///
/// * `advice`: the three advice columns `[a, b, c]` shared by every gate of the chip
/// * `decompose_selector`: enables the running sum `a_next = 2 * a + b` with `b` boolean
/// * `offset_selector`: enables `c = a + b`, used to domain separate the discriminator
/// * `swap_selector`: enables the conditional swap of `(a, b)` into the next row according to the bit in `c`
#[derive(Debug, Clone)]
pub struct AccountInclusionConfig {
    pub advice: [Column<Advice>; 3],
    pub decompose_selector: Selector,
    pub offset_selector: Selector,
    pub swap_selector: Selector,
}

/// Chip holding the non hashing constraints of a compressed account inclusion proof: binding the
/// leaf index to its path bits, adding the discriminator domain offset and routing the running
/// node left or right at every level.
#[derive(Debug, Clone)]
pub struct AccountInclusionChip {
    config: AccountInclusionConfig,
}

impl AccountInclusionChip {
    pub fn construct(config: AccountInclusionConfig) -> Self {
        Self { config }
    }

    /// Configures the chip over three advice columns. Equality must be enabled on them by the
    /// caller, and a fixed column must be enabled for constants.
    pub fn configure(
        meta: &mut ConstraintSystem<Fp>,
        advice: [Column<Advice>; 3],
        selectors: [Selector; 3],
    ) -> AccountInclusionConfig {
        let col_a = advice[0];
        let col_b = advice[1];
        let col_c = advice[2];

        let [decompose_selector, offset_selector, swap_selector] = selectors;

        // acc_next = 2 * acc + bit, bit * (1 - bit) = 0
        meta.create_gate("decompose constraint", |meta| {
            let s = meta.query_selector(decompose_selector);
            let acc = meta.query_advice(col_a, Rotation::cur());
            let bit = meta.query_advice(col_b, Rotation::cur());
            let acc_next = meta.query_advice(col_a, Rotation::next());

            vec![
                s.clone() * (acc_next - Expression::Constant(Fp::from(2)) * acc - bit.clone()),
                s * bit.clone() * (Expression::Constant(Fp::from(1)) - bit),
            ]
        });

        // discriminator + offset = domain separated discriminator
        meta.create_gate("domain offset constraint", |meta| {
            let s = meta.query_selector(offset_selector);
            let discriminator = meta.query_advice(col_a, Rotation::cur());
            let offset = meta.query_advice(col_b, Rotation::cur());
            let offset_discriminator = meta.query_advice(col_c, Rotation::cur());

            vec![s * (discriminator + offset - offset_discriminator)]
        });

        // left = cur + bit * (sib - cur), right = sib + bit * (cur - sib)
        meta.create_gate("swap constraint", |meta| {
            let s = meta.query_selector(swap_selector);
            let cur = meta.query_advice(col_a, Rotation::cur());
            let sib = meta.query_advice(col_b, Rotation::cur());
            let bit = meta.query_advice(col_c, Rotation::cur());
            let left = meta.query_advice(col_a, Rotation::next());
            let right = meta.query_advice(col_b, Rotation::next());

            vec![
                s.clone()
                    * (left - cur.clone() - bit.clone() * (sib.clone() - cur.clone())),
                s.clone() * (right - sib.clone() - bit.clone() * (cur - sib)),
                s * bit.clone() * (Expression::Constant(Fp::from(1)) - bit),
            ]
        });

        AccountInclusionConfig {
            advice,
            decompose_selector,
            offset_selector,
            swap_selector,
        }
    }

    /// Decomposes `leaf_index` into exactly `depth` bits and constrains their running sum to be
    /// equal to the `leaf_index` cell. Returns the bit cells starting from the least significant,
    /// namely the path direction at level 0.
    pub fn decompose_leaf_index(
        &self,
        mut layouter: impl Layouter<Fp>,
        leaf_index: &AssignedCell<Fp, Fp>,
        depth: usize,
    ) -> Result<Vec<AssignedCell<Fp, Fp>>, Error> {
        layouter.assign_region(
            || "decompose leaf index",
            |mut region| {
                let mut acc = region.assign_advice_from_constant(
                    || "initial running sum",
                    self.config.advice[0],
                    0,
                    Fp::from(0),
                )?;

                // the running sum walks the bits from the most significant one
                let index = leaf_index.value().map(|x| x.to_owned());
                let mut bits = Vec::with_capacity(depth);

                for row in 0..depth {
                    self.config.decompose_selector.enable(&mut region, row)?;

                    let shift = depth - 1 - row;
                    let bit_value = index.map(|x| {
                        let limbs = x.to_repr();
                        let byte = limbs.as_ref()[shift / 8];
                        Fp::from(((byte >> (shift % 8)) & 1) as u64)
                    });

                    let bit = region.assign_advice(
                        || format!("bit {}", shift),
                        self.config.advice[1],
                        row,
                        || bit_value,
                    )?;

                    let acc_value = acc.value().map(|x| x.to_owned()) * Value::known(Fp::from(2))
                        + bit_value;

                    acc = region.assign_advice(
                        || "running sum",
                        self.config.advice[0],
                        row + 1,
                        || acc_value,
                    )?;

                    bits.push(bit);
                }

                region.constrain_equal(acc.cell(), leaf_index.cell())?;

                bits.reverse();
                Ok(bits)
            },
        )
    }

    /// Adds the `offset` circuit constant to the discriminator cell and returns the sum
    pub fn assign_discriminator_offset(
        &self,
        mut layouter: impl Layouter<Fp>,
        discriminator: &AssignedCell<Fp, Fp>,
        offset: Fp,
    ) -> Result<AssignedCell<Fp, Fp>, Error> {
        layouter.assign_region(
            || "domain separate discriminator",
            |mut region| {
                self.config.offset_selector.enable(&mut region, 0)?;

                let discriminator = discriminator.copy_advice(
                    || "copy discriminator",
                    &mut region,
                    self.config.advice[0],
                    0,
                )?;

                let offset = region.assign_advice_from_constant(
                    || "domain offset",
                    self.config.advice[1],
                    0,
                    offset,
                )?;

                let sum = discriminator.value().map(|x| x.to_owned())
                    + offset.value().map(|x| x.to_owned());

                region.assign_advice(
                    || "domain separated discriminator",
                    self.config.advice[2],
                    0,
                    || sum,
                )
            },
        )
    }

    /// Orders the running node and its sibling into the `(left, right)` pair hashed at this level.
    /// When `swap_bit` is `0` the running node is the left child, when it is `1` the right one.
    pub fn swap_hashes_per_level(
        &self,
        mut layouter: impl Layouter<Fp>,
        current_hash: &AssignedCell<Fp, Fp>,
        sibling_hash: &AssignedCell<Fp, Fp>,
        swap_bit: &AssignedCell<Fp, Fp>,
    ) -> Result<(AssignedCell<Fp, Fp>, AssignedCell<Fp, Fp>), Error> {
        layouter.assign_region(
            || "swap hashes",
            |mut region| {
                // Row 0
                self.config.swap_selector.enable(&mut region, 0)?;

                let cur = current_hash.copy_advice(
                    || "copy current hash",
                    &mut region,
                    self.config.advice[0],
                    0,
                )?;
                let sib = sibling_hash.copy_advice(
                    || "copy sibling hash",
                    &mut region,
                    self.config.advice[1],
                    0,
                )?;
                let bit = swap_bit.copy_advice(
                    || "copy swap bit",
                    &mut region,
                    self.config.advice[2],
                    0,
                )?;

                let cur_val = cur.value().map(|x| x.to_owned());
                let sib_val = sib.value().map(|x| x.to_owned());
                let bit_val = bit.value().map(|x| x.to_owned());

                // Row 1
                let left_val = cur_val + bit_val * (sib_val - cur_val);
                let right_val = sib_val + bit_val * (cur_val - sib_val);

                let left_hash = region.assign_advice(
                    || "assign left hash to be hashed",
                    self.config.advice[0],
                    1,
                    || left_val,
                )?;
                let right_hash = region.assign_advice(
                    || "assign right hash to be hashed",
                    self.config.advice[1],
                    1,
                    || right_val,
                )?;

                Ok((left_hash, right_hash))
            },
        )
    }
}
