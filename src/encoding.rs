//! Boundary encoding of field elements and circuit inputs.
//!
//! Everything entering the verifier or the circuit goes through here first: byte strings are range
//! checked against the BN254 scalar field, paths are checked for arity, and positions for range.

use halo2_proofs::halo2curves::{bn256::Fr as Fp, group::ff::PrimeField};
use itertools::Itertools;
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

use crate::errors::{InclusionError, Result};
use crate::merkle_tree::utils::{big_uint_to_fp, fp_to_big_uint};
use crate::merkle_tree::{validate_path, CompressedAccount, MerkleHasher, MerkleProof, ProofParams};

/// Reads a big endian 32 byte value, rejecting anything that is not a canonical field element.
pub fn fp_from_be_bytes(bytes: &[u8; 32]) -> Result<Fp> {
    let mut repr = *bytes;
    repr.reverse();

    Option::from(Fp::from_repr(repr)).ok_or(InclusionError::PublicInputGreaterThanFieldSize)
}

pub fn fp_to_be_bytes(fp: &Fp) -> [u8; 32] {
    let mut bytes = fp.to_repr();
    bytes.reverse();
    bytes
}

/// Parses a decimal or `0x` prefixed hex string into a field element.
pub fn parse_field(value: &str) -> Result<Fp> {
    let value = value.trim();

    match value.strip_prefix("0x") {
        Some(digits) => {
            if digits.is_empty() {
                return Err(InclusionError::InvalidFieldEncoding(value.to_string()));
            }
            let digits = if digits.len() % 2 == 1 {
                format!("0{}", digits)
            } else {
                digits.to_string()
            };
            let bytes = hex::decode(&digits)
                .map_err(|e| InclusionError::InvalidFieldEncoding(format!("{}: {}", value, e)))?;

            if bytes.len() > 32 {
                return Err(InclusionError::PublicInputGreaterThanFieldSize);
            }
            let mut padded = [0u8; 32];
            padded[32 - bytes.len()..].copy_from_slice(&bytes);
            fp_from_be_bytes(&padded)
        }
        None => {
            // no sign, no separators
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(InclusionError::InvalidFieldEncoding(value.to_string()));
            }
            let big_uint = BigUint::parse_bytes(value.as_bytes(), 10)
                .ok_or_else(|| InclusionError::InvalidFieldEncoding(value.to_string()))?;
            big_uint_to_fp(&big_uint)
        }
    }
}

pub fn fp_to_decimal(fp: &Fp) -> String {
    fp_to_big_uint(fp).to_str_radix(10)
}

/// Serde helper for fields given as decimal or hex strings
pub fn deserialize_field<'de, D>(deserializer: D) -> std::result::Result<Fp, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_field(&value).map_err(serde::de::Error::custom)
}

/// Reverses the byte order inside every `CHUNK_SIZE` chunk of `bytes`.
///
/// `convert_endianness::<32, 64>` turns two big endian words into two little endian ones.
pub fn convert_endianness<const CHUNK_SIZE: usize, const ARRAY_SIZE: usize>(
    bytes: &[u8; ARRAY_SIZE],
) -> [u8; ARRAY_SIZE] {
    let mut result = *bytes;
    for chunk in result.chunks_mut(CHUNK_SIZE) {
        chunk.reverse();
    }
    result
}

/// Inputs of a compressed account inclusion proof in the circom input format.
///
/// `owner_hashed`, `merkle_tree_hashed`, `discriminator`, `data_hash` and `expectedRoot` are
/// public, `leaf_index` and `pathElements` are private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionInputs {
    pub owner_hashed: String,
    pub leaf_index: String,
    pub merkle_tree_hashed: String,
    pub discriminator: String,
    pub data_hash: String,
    #[serde(rename = "expectedRoot")]
    pub expected_root: String,
    #[serde(rename = "pathElements")]
    pub path_elements: Vec<String>,
}

impl InclusionInputs {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_parts(account: &CompressedAccount, proof: &MerkleProof) -> Self {
        InclusionInputs {
            owner_hashed: fp_to_decimal(&account.owner_hashed),
            leaf_index: account.leaf_index.to_string(),
            merkle_tree_hashed: fp_to_decimal(&account.merkle_tree_hashed),
            discriminator: fp_to_decimal(&account.discriminator),
            data_hash: fp_to_decimal(&account.data_hash),
            expected_root: fp_to_decimal(&proof.root),
            path_elements: proof.sibling_hashes.iter().map(fp_to_decimal).collect_vec(),
        }
    }

    fn leaf_index(&self) -> Result<u64> {
        let digits = self.leaf_index.trim();
        let invalid =
            || InclusionError::InvalidFieldEncoding(format!("leaf index {}", self.leaf_index));

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.parse::<u64>().map_err(|_| invalid())
    }

    pub fn account(&self) -> Result<CompressedAccount> {
        Ok(CompressedAccount::new(
            parse_field(&self.owner_hashed)?,
            self.leaf_index()?,
            parse_field(&self.merkle_tree_hashed)?,
            parse_field(&self.discriminator)?,
            parse_field(&self.data_hash)?,
        ))
    }

    /// Public inputs in instance order: owner, tree, discriminator, data hash, expected root
    pub fn public_inputs(&self) -> Result<Vec<Fp>> {
        [
            &self.owner_hashed,
            &self.merkle_tree_hashed,
            &self.discriminator,
            &self.data_hash,
            &self.expected_root,
        ]
        .into_iter()
        .map(|value| parse_field(value))
        .collect()
    }

    /// Validates arity and ranges, then hashes the account into the leaf of its inclusion proof.
    pub fn validate<H: MerkleHasher>(
        &self,
        params: &ProofParams,
    ) -> Result<(CompressedAccount, MerkleProof)> {
        params.validate()?;

        let account = self.account()?;
        let sibling_hashes = self
            .path_elements
            .iter()
            .map(|element| parse_field(element))
            .collect::<Result<Vec<_>>>()?;
        validate_path(&sibling_hashes, account.leaf_index, params.depth)?;

        let proof = MerkleProof {
            leaf: account.compute_leaf::<H>(params.domain_offset)?,
            sibling_hashes,
            leaf_index: account.leaf_index,
            root: parse_field(&self.expected_root)?,
        };

        Ok((account, proof))
    }
}
