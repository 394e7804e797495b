use halo2_proofs::halo2curves::bn256::Fr as Fp;

use crate::encoding::fp_from_be_bytes;
use crate::errors::Result;
use crate::merkle_tree::MerkleHasher;

/// A compressed account as committed to by a leaf of the state tree.
///
/// `owner_hashed` and `merkle_tree_hashed` are the owner and tree public keys already mapped into
/// the field, `data_hash` is the hash of the account data.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressedAccount {
    pub owner_hashed: Fp,
    pub leaf_index: u64,
    pub merkle_tree_hashed: Fp,
    pub discriminator: Fp,
    pub data_hash: Fp,
}

impl CompressedAccount {
    pub fn new(
        owner_hashed: Fp,
        leaf_index: u64,
        merkle_tree_hashed: Fp,
        discriminator: Fp,
        data_hash: Fp,
    ) -> Self {
        CompressedAccount {
            owner_hashed,
            leaf_index,
            merkle_tree_hashed,
            discriminator,
            data_hash,
        }
    }

    pub fn init_empty() -> Self {
        CompressedAccount::new(Fp::from(0), 0, Fp::from(0), Fp::from(0), Fp::from(0))
    }

    /// Returns the five hash inputs in commitment order, with the discriminator domain separated
    pub fn hash_inputs(&self, domain_offset: Fp) -> [Fp; 5] {
        [
            self.owner_hashed,
            Fp::from(self.leaf_index),
            self.merkle_tree_hashed,
            self.discriminator + domain_offset,
            self.data_hash,
        ]
    }

    /// Computes the leaf committing to this account
    pub fn compute_leaf<H: MerkleHasher>(&self, domain_offset: Fp) -> Result<Fp> {
        H::hash_leaf(self.hash_inputs(domain_offset))
    }
}

/// Places an 8 byte account discriminator in the low bytes of a big endian word
pub fn discriminator_from_bytes(discriminator: [u8; 8]) -> Fp {
    Fp::from(u64::from_be_bytes(discriminator))
}

/// Maps a 32 byte big endian value (a public key or a hash) into the field by dropping its top byte
pub fn truncate_to_field(bytes: &[u8; 32]) -> Result<Fp> {
    let mut truncated = *bytes;
    truncated[0] = 0;
    fp_from_be_bytes(&truncated)
}

#[cfg(test)]
mod tests {
    use super::{discriminator_from_bytes, truncate_to_field, CompressedAccount};
    use crate::merkle_tree::{discriminator_domain_offset, CircomPoseidon, Pow5Poseidon};
    use crate::merkle_tree::utils::big_uint_to_fp;
    use halo2_proofs::halo2curves::bn256::Fr as Fp;
    use num_bigint::BigUint;

    fn account() -> CompressedAccount {
        CompressedAccount::new(
            Fp::from(11),
            3,
            Fp::from(22),
            discriminator_from_bytes([0, 0, 0, 0, 0, 0, 0, 1]),
            Fp::from(33),
        )
    }

    #[test]
    fn test_leaf_hash_is_deterministic() {
        let offset = discriminator_domain_offset();
        let account = account();

        assert_eq!(
            account.compute_leaf::<CircomPoseidon>(offset).unwrap(),
            account.compute_leaf::<CircomPoseidon>(offset).unwrap()
        );
        assert_eq!(
            account.compute_leaf::<Pow5Poseidon>(offset).unwrap(),
            account.compute_leaf::<Pow5Poseidon>(offset).unwrap()
        );
    }

    #[test]
    fn test_discriminator_is_domain_separated() {
        let account = account();
        let inputs = account.hash_inputs(discriminator_domain_offset());

        // 2 * 2^64 + 1
        assert_eq!(inputs[3], Fp::from_raw([1, 2, 0, 0]));
        assert_eq!(inputs[1], Fp::from(3));

        let without_offset = account.compute_leaf::<CircomPoseidon>(Fp::from(0)).unwrap();
        let with_offset = account
            .compute_leaf::<CircomPoseidon>(discriminator_domain_offset())
            .unwrap();
        assert_ne!(without_offset, with_offset);
    }

    #[test]
    fn test_every_field_changes_the_leaf() {
        let offset = discriminator_domain_offset();
        let base = account();
        let leaf = base.compute_leaf::<Pow5Poseidon>(offset).unwrap();

        let mut variants = vec![base.clone(); 5];
        variants[0].owner_hashed += Fp::from(1);
        variants[1].leaf_index += 1;
        variants[2].merkle_tree_hashed += Fp::from(1);
        variants[3].discriminator += Fp::from(1);
        variants[4].data_hash += Fp::from(1);

        for variant in variants {
            assert_ne!(variant.compute_leaf::<Pow5Poseidon>(offset).unwrap(), leaf);
        }
    }

    #[test]
    fn test_truncate_to_field_drops_top_byte() {
        // 2^248 - 1, the largest value left once the top byte is gone
        let max = (BigUint::from(1u8) << 248usize) - 1u8;
        assert_eq!(
            truncate_to_field(&[0xff; 32]).unwrap(),
            big_uint_to_fp(&max).unwrap()
        );

        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[1] = 0x01;
        bytes[31] = 0x02;
        // 2^240 + 2
        assert_eq!(
            truncate_to_field(&bytes).unwrap(),
            Fp::from_raw([2, 0, 0, 1 << 48])
        );
    }

    #[test]
    fn test_discriminator_from_bytes_is_big_endian() {
        assert_eq!(
            discriminator_from_bytes([0, 0, 0, 0, 0, 0, 1, 0]),
            Fp::from(256)
        );
        assert_eq!(
            discriminator_from_bytes([1, 0, 0, 0, 0, 0, 0, 0]),
            Fp::from(1u64 << 56)
        );
    }
}
