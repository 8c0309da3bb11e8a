use ethnum::U256;
use num_bigint::BigUint;

use super::{
    constants::{MAX_SQRT_RATIO, MIN_SQRT_RATIO, Q96},
    price::Price,
    safe_cast::big_uint_to_u256,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqrtPriceError {
    #[error("sqrt price for {0} is outside the range a V3 pool accepts")]
    OutOfPoolRange(String),
    #[error("sqrt price for {0} does not fit in a u128")]
    Overflow(String),
}

/// floor(sqrt(price * 2^(2 * frac_bits)))
fn encode_sqrt(price: &Price, frac_bits: u32) -> BigUint {
    let scaled = (price.numerator() << (2 * frac_bits) as usize) / price.denominator();
    scaled.sqrt()
}

/// Encodes a price (token1 per token0, base units) as the Q64.96 value a V3
/// pool is initialized with. Rejects prices the pool contract would reject.
pub fn encode_sqrt_price_x96(price: &Price) -> Result<U256, SqrtPriceError> {
    let sqrt_price = big_uint_to_u256(encode_sqrt(price, 96))
        .map_err(|_e| SqrtPriceError::OutOfPoolRange(price.to_string()))?;
    if sqrt_price < *MIN_SQRT_RATIO || sqrt_price >= *MAX_SQRT_RATIO {
        return Err(SqrtPriceError::OutOfPoolRange(price.to_string()));
    }
    Ok(sqrt_price)
}

/// Q64.64 encoding used by Raydium-style CLMM pools.
pub fn encode_sqrt_price_x64(price: &Price) -> Result<u128, SqrtPriceError> {
    let sqrt_price = encode_sqrt(price, 64);
    let digits = sqrt_price.to_u64_digits();
    match digits.as_slice() {
        [] => Ok(0),
        [low] => Ok(*low as u128),
        [low, high] => Ok(((*high as u128) << 64) | *low as u128),
        _ => Err(SqrtPriceError::Overflow(price.to_string())),
    }
}

/// Approximate price (token1 per token0, base units) of a Q64.96 sqrt price.
pub fn sqrt_price_x96_to_price(sqrt_price_x96: U256) -> f64 {
    let ratio = sqrt_price_x96.as_f64() / Q96.as_f64();
    ratio * ratio
}
