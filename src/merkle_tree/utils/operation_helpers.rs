use ark_ff::{BigInteger, PrimeField as ArkPrimeField};
use halo2_proofs::halo2curves::{bn256::Fr as Fp, group::ff::PrimeField};
use num_bigint::BigUint;

use crate::encoding::fp_from_be_bytes;
use crate::errors::{InclusionError, Result};

/// Converts a BigUint to a Field Element, rejecting values outside the field
pub fn big_uint_to_fp(big_uint: &BigUint) -> Result<Fp> {
    let bytes = big_uint.to_bytes_be();
    if bytes.len() > 32 {
        return Err(InclusionError::PublicInputGreaterThanFieldSize);
    }

    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(&bytes);
    fp_from_be_bytes(&padded)
}

pub fn fp_to_big_uint(fp: &Fp) -> BigUint {
    BigUint::from_bytes_le(fp.to_repr().as_ref())
}

/// Moves a field element into the arkworks representation of the same BN254 scalar field
pub fn fp_to_ark(fp: &Fp) -> ark_bn254::Fr {
    ark_bn254::Fr::from_le_bytes_mod_order(fp.to_repr().as_ref())
}

pub fn ark_to_fp(fr: ark_bn254::Fr) -> Result<Fp> {
    let bytes = fr.into_bigint().to_bytes_le();

    let mut repr = [0u8; 32];
    repr[..bytes.len()].copy_from_slice(&bytes);

    Option::from(Fp::from_repr(repr)).ok_or_else(|| {
        InclusionError::InvalidFieldEncoding("arkworks element outside the BN254 scalar field".into())
    })
}

#[cfg(test)]
mod tests {
    use super::{ark_to_fp, big_uint_to_fp, fp_to_ark, fp_to_big_uint};
    use crate::errors::InclusionError;
    use halo2_proofs::halo2curves::bn256::Fr as Fp;
    use num_bigint::BigUint;

    #[test]
    fn test_big_uint_conversion() {
        let fp = big_uint_to_fp(&BigUint::from(3u32)).unwrap();
        assert_eq!(fp, Fp::from(3));

        let over_64 = BigUint::from(18446744073709551616_u128);
        let fp_2 = big_uint_to_fp(&over_64).unwrap();
        assert_eq!(fp_to_big_uint(&fp_2), over_64);

        let fp_3 = fp_2 - fp;
        assert_eq!(fp_3, Fp::from(18446744073709551613));
    }

    #[test]
    fn test_big_uint_above_modulus_is_rejected() {
        let modulus = BigUint::parse_bytes(
            b"30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001",
            16,
        )
        .unwrap();

        assert!(matches!(
            big_uint_to_fp(&modulus),
            Err(InclusionError::PublicInputGreaterThanFieldSize)
        ));
        assert!(big_uint_to_fp(&(modulus - 1u32)).is_ok());
    }

    #[test]
    fn test_ark_round_trip_preserves_value() {
        let fp = -Fp::from(42);
        assert_eq!(ark_to_fp(fp_to_ark(&fp)).unwrap(), fp);
    }
}
