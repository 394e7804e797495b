use halo2_proofs::circuit::{Layouter, Value};
use halo2_proofs::halo2curves::bn256::Fr as Fp;
use halo2_proofs::plonk::{Advice, Column, Error};
use halo2_proofs::{circuit::AssignedCell, plonk::Instance};

/// Trait containing common methods for all circuits
pub trait CircuitBase {
    /// Enforce copy constraint check between input cell and instance column at row passed as input
    fn expose_public(
        &self,
        mut layouter: impl Layouter<Fp>,
        cell: &AssignedCell<Fp, Fp>,
        row: usize,
        instance: Column<Instance>,
    ) -> Result<(), Error> {
        layouter.constrain_instance(cell.cell(), instance, row)
    }

    /// Assigns `value` to a fresh cell of the advice column `advice_col` and returns the cell.
    /// `object_to_assign` labels the region, which helps reading MockProver failures.
    fn assign_value_to_witness(
        &self,
        mut layouter: impl Layouter<Fp>,
        value: Fp,
        object_to_assign: &'static str,
        advice_col: Column<Advice>,
    ) -> Result<AssignedCell<Fp, Fp>, Error> {
        layouter.assign_region(
            || format!("assign {}", object_to_assign),
            |mut region| region.assign_advice(|| "value", advice_col, 0, || Value::known(value)),
        )
    }

    /// Assigns `values` side by side on a single row, one per advice column. Returns the cells in
    /// the same order.
    fn assign_row_to_witness<const N: usize>(
        &self,
        mut layouter: impl Layouter<Fp>,
        values: [Fp; N],
        object_to_assign: &'static str,
        advice_cols: [Column<Advice>; N],
    ) -> Result<[AssignedCell<Fp, Fp>; N], Error> {
        layouter.assign_region(
            || format!("assign {}", object_to_assign),
            |mut region| {
                let cells = values
                    .iter()
                    .zip(advice_cols.iter())
                    .enumerate()
                    .map(|(i, (value, col))| {
                        region.assign_advice(
                            || format!("{} {}", object_to_assign, i),
                            *col,
                            0,
                            || Value::known(*value),
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                cells.try_into().map_err(|_| Error::Synthesis)
            },
        )
    }
}
