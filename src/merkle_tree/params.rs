use halo2_proofs::halo2curves::bn256::Fr as Fp;
use serde::Deserialize;

use crate::encoding::deserialize_field;
use crate::errors::{InclusionError, Result};

// Depth of the state trees holding compressed accounts. Prover and verifier must agree on it.
pub const TREE_DEPTH: usize = 26;
// Upper bound accepted when building trees, leaf indices are decomposed into at most this many bits
pub const MAX_DEPTH: usize = 32;
// 2^k rows are enough to lay out the inclusion circuit for a tree of TREE_DEPTH levels
pub const K: u32 = 12;

// Poseidon parameters shared by the native hasher and the circuit. Partial rounds are processed
// two per row by the Pow5 chip, so both counts are even.
pub const FULL_ROUNDS: usize = 8;
pub const PARTIAL_ROUNDS_NODE: usize = 58;
pub const PARTIAL_ROUNDS_LEAF: usize = 60;

/// Domain separation offset added to the account discriminator before hashing.
///
/// Opaque protocol constant: the discriminator occupies the low 8 bytes of a 32 byte big endian
/// word and the byte right above it is set to `2`, which amounts to adding `2 * 2^64`.
pub fn discriminator_domain_offset() -> Fp {
    Fp::from_raw([0, 2, 0, 0])
}

fn default_depth() -> usize {
    TREE_DEPTH
}

/// Parameters prover and verifier must agree on.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ProofParams {
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(
        default = "discriminator_domain_offset",
        deserialize_with = "deserialize_field"
    )]
    pub domain_offset: Fp,
}

impl Default for ProofParams {
    fn default() -> Self {
        Self {
            depth: TREE_DEPTH,
            domain_offset: discriminator_domain_offset(),
        }
    }
}

impl ProofParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: ProofParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DEPTH).contains(&self.depth) {
            return Err(InclusionError::InvalidTreeDepth {
                depth: self.depth,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }
}
