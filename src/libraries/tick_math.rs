use ethnum::U256;
use lazy_static::lazy_static;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{FromPrimitive, One, ToPrimitive, Zero};

use super::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use super::safe_cast::{big_uint_to_u256, u256_to_big_uint};

/// Fixed-point conversions between ticks and Q64.96 sqrt prices.
/// Computes sqrt(1.0001^tick) * 2^96 exactly as the V3 pool contract does, so ticks
/// derived here match what the chain will accept.
pub struct TickMath;

lazy_static! {
    static ref TWO_POW_128: BigUint = BigUint::one() << 128;
    static ref TWO_POW_256_MINUS_1: BigUint = BigUint::from_bytes_be(&[0xff; 32]);
    static ref ODD_TICK_RATIO: BigUint =
        BigUint::parse_bytes(b"fffcb933bd6fad37aa2d162d1a594001", 16).unwrap();
    static ref CONSTANTS: [BigUint; 19] = [
        BigUint::parse_bytes(b"fff97272373d413259a46990580e213a", 16).unwrap(),
        BigUint::parse_bytes(b"fff2e50f5f656932ef12357cf3c7fdcc", 16).unwrap(),
        BigUint::parse_bytes(b"ffe5caca7e10e4e61c3624eaa0941cd0", 16).unwrap(),
        BigUint::parse_bytes(b"ffcb9843d60f6159c9db58835c926644", 16).unwrap(),
        BigUint::parse_bytes(b"ff973b41fa98c081472e6896dfb254c0", 16).unwrap(),
        BigUint::parse_bytes(b"ff2ea16466c96a3843ec78b326b52861", 16).unwrap(),
        BigUint::parse_bytes(b"fe5dee046a99a2a811c461f1969c3053", 16).unwrap(),
        BigUint::parse_bytes(b"fcbe86c7900a88aedcffc83b479aa3a4", 16).unwrap(),
        BigUint::parse_bytes(b"f987a7253ac413176f2b074cf7815e54", 16).unwrap(),
        BigUint::parse_bytes(b"f3392b0822b70005940c7a398e4b70f3", 16).unwrap(),
        BigUint::parse_bytes(b"e7159475a2c29b7443b29c7fa6e889d9", 16).unwrap(),
        BigUint::parse_bytes(b"d097f3bdfd2022b8845ad8f792aa5825", 16).unwrap(),
        BigUint::parse_bytes(b"a9f746462d870fdf8a65dc1f90e061e5", 16).unwrap(),
        BigUint::parse_bytes(b"70d869a156d2a1b890bb3df62baf32f7", 16).unwrap(),
        BigUint::parse_bytes(b"31be135f97d08fd981231505542fcfa6", 16).unwrap(),
        BigUint::parse_bytes(b"9aa508b5b7a84e1c677de54f3e99bc9", 16).unwrap(),
        BigUint::parse_bytes(b"5d6af8dedb81196699c329225ee604", 16).unwrap(),
        BigUint::parse_bytes(b"2216e584f5fa1ea926041bedfe98", 16).unwrap(),
        BigUint::parse_bytes(b"48a170391f7dc42444e8fa2", 16).unwrap(),
    ];
    static ref MSB_THRESHOLDS: [(BigUint, u32); 8] = [
        (BigUint::from_bytes_be(&[0xFF; 16]), 128),
        (BigUint::from_bytes_be(&[0xFF; 8]), 64),
        (BigUint::from_bytes_be(&[0xFF; 4]), 32),
        (BigUint::from_bytes_be(&[0xFF; 2]), 16),
        (BigUint::from_bytes_be(&[0xFF]), 8),
        (BigUint::from_u8(0xF).unwrap(), 4),
        (BigUint::from_u8(0x3).unwrap(), 2),
        (BigUint::from_u8(0x1).unwrap(), 1),
    ];
    static ref LOG_2_COEFF: BigInt = BigInt::parse_bytes(b"255738958999603826347141", 10).unwrap();
    static ref TICK_LOW_OFFSET: BigInt =
        BigInt::parse_bytes(b"3402992956809132418596140100660247210", 10).unwrap();
    static ref TICK_HI_OFFSET: BigInt =
        BigInt::parse_bytes(b"291339464771989622907027621153398088495", 10).unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickMathError {
    #[error("tick {0} is outside [-887272, 887272]")]
    TickOutOfBounds(i32),
    #[error("sqrt price {0} is outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)")]
    SqrtPriceOutOfBounds(U256),
    #[error("arithmetic overflow in tick math")]
    ArithmeticOverflow,
}

impl TickMath {
    /// Calculates sqrt(1.0001^tick) * 2^96, rounded up.
    pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, TickMathError> {
        if !(MIN_TICK..=MAX_TICK).contains(&tick) {
            return Err(TickMathError::TickOutOfBounds(tick));
        }

        let abs_tick = tick.unsigned_abs();
        let mut ratio = if abs_tick & 0x1 != 0 {
            ODD_TICK_RATIO.clone()
        } else {
            TWO_POW_128.clone()
        };

        for (i, constant) in CONSTANTS.iter().enumerate() {
            if abs_tick & (1 << (i + 1)) != 0 {
                ratio = (ratio * constant) >> 128;
            }
        }

        if tick > 0 {
            ratio = &*TWO_POW_256_MINUS_1 / ratio;
        }

        // Q128.128 -> Q64.96, rounding up
        let remainder_is_zero = (&ratio % (BigUint::one() << 32u32)).is_zero();
        let sqrt_price_x96 = (ratio >> 32)
            + if remainder_is_zero {
                BigUint::zero()
            } else {
                BigUint::one()
            };

        big_uint_to_u256(sqrt_price_x96).map_err(|_e| TickMathError::ArithmeticOverflow)
    }

    /// Greatest tick whose sqrt ratio is less than or equal to `sqrt_price_x96`.
    pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, TickMathError> {
        if sqrt_price_x96 < *MIN_SQRT_RATIO || sqrt_price_x96 >= *MAX_SQRT_RATIO {
            return Err(TickMathError::SqrtPriceOutOfBounds(sqrt_price_x96));
        }

        let ratio = u256_to_big_uint(sqrt_price_x96) << 32;
        let msb = Self::most_significant_bit(&ratio);
        let r = if msb >= 128 {
            ratio >> (msb - 127)
        } else {
            ratio << (127 - msb)
        };

        let log_2 = Self::log_2(r, msb)?;
        let log_sqrt10001 = log_2 * &*LOG_2_COEFF;

        let tick_low = ((&log_sqrt10001 - &*TICK_LOW_OFFSET) >> 128_u8)
            .to_i32()
            .ok_or(TickMathError::ArithmeticOverflow)?;
        let tick_hi = ((&log_sqrt10001 + &*TICK_HI_OFFSET) >> 128_u8)
            .to_i32()
            .ok_or(TickMathError::ArithmeticOverflow)?;

        if tick_low == tick_hi {
            return Ok(tick_low);
        }
        if Self::get_sqrt_ratio_at_tick(tick_hi)? <= sqrt_price_x96 {
            Ok(tick_hi)
        } else {
            Ok(tick_low)
        }
    }

    fn most_significant_bit(value: &BigUint) -> u32 {
        let mut msb = 0;
        let mut r = value.clone();

        for (threshold, bit) in MSB_THRESHOLDS.iter() {
            if r > *threshold {
                msb |= bit;
                r >>= *bit;
            }
        }

        msb
    }

    // log2 of the normalized ratio as a signed Q64.64, 14 fractional bits refined
    fn log_2(mut r: BigUint, msb: u32) -> Result<BigInt, TickMathError> {
        let mut log_2 = BigInt::from(msb as i32 - 128) << 64;

        for shift in (50..=63).rev() {
            r = (&r * &r) >> 127;
            let f: BigUint = &r >> 128;
            log_2 |= BigInt::from_biguint(Sign::Plus, f.clone()) << shift;
            r >>= f.to_u32().ok_or(TickMathError::ArithmeticOverflow)?;
        }

        Ok(log_2)
    }
}
