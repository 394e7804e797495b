//! This crate contains the primitives for proving that a compressed account is committed to by a
//! leaf of a Poseidon Merkle tree, natively and as a zkSNARK.
//! The tooling being used to generate the zkSNARKs is [Halo2 PSE Fork](https://github.com/privacy-scaling-explorations/halo2).

/// Zk circuit subcomponents aka chips.
pub mod chips;
/// Zk circuits with a full prover and verifier. A circuit can be viewed as an assembly of chips.
pub mod circuits;
/// Field element encodings and the input record accepted at the proving boundary.
pub mod encoding;
pub mod errors;
/// Utilities to build the account tree and verify inclusion proofs natively. No zk proof in here.
pub mod merkle_tree;

pub use errors::{InclusionError, Result};
