mod account;
mod hasher;
mod params;
mod tests;
mod tree;
pub mod utils;
mod verifier;

pub use account::{discriminator_from_bytes, truncate_to_field, CompressedAccount};
pub use hasher::{CircomPoseidon, MerkleHasher, Pow5Poseidon};
pub use params::*;
pub use tree::AccountTree;
pub use verifier::{compute_root, validate_path, verify_inclusion, MerkleProof};
