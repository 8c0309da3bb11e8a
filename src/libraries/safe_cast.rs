use ethnum::U256;
use num_bigint::BigUint;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CastError {
    #[error("{0} does not fit in a U256")]
    DoesNotFitU256(BigUint),
}

pub fn big_uint_to_u256(biguint: BigUint) -> Result<U256, CastError> {
    let value_bytes = biguint.to_bytes_be();
    let mut value_u256 = [0u8; 32];
    if value_bytes.len() <= 32 {
        value_u256[32 - value_bytes.len()..].copy_from_slice(&value_bytes);
    } else {
        return Err(CastError::DoesNotFitU256(biguint));
    }
    Ok(U256::from_be_bytes(value_u256))
}

pub fn u256_to_big_uint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes())
}

/// Moves an amount across to the alloy integer type used by the contract bindings.
pub fn u256_to_alloy(value: U256) -> alloy::primitives::U256 {
    alloy::primitives::U256::from_be_bytes(value.to_be_bytes())
}

pub fn alloy_to_u256(value: alloy::primitives::U256) -> U256 {
    U256::from_be_bytes(value.to_be_bytes::<32>())
}
