pub mod account_inclusion;
pub mod traits;
pub mod utils;

use halo2_proofs::halo2curves::bn256::Fr as Fp;

/// Public inputs a circuit exposes in its instance columns
pub trait WithInstances {
    fn num_instances(&self) -> usize;
    fn instances(&self) -> Vec<Vec<Fp>>;
}
