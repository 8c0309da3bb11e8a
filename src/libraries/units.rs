use ethnum::U256;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::safe_cast::{big_uint_to_u256, u256_to_big_uint};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("`{0}` is not a decimal number")]
    Malformed(String),
    #[error("`{value}` has more than {decimals} fractional digits")]
    TooPrecise { value: String, decimals: u8 },
    #[error("`{0}` does not fit in a U256")]
    Overflow(String),
}

/// Splits a plain decimal string ("12", "0.5", ".25") into an exact fraction
/// `numerator / 10^scale`. Signs and exponents are rejected.
pub fn parse_decimal(text: &str) -> Result<(BigUint, u32), UnitsError> {
    let trimmed = text.trim();
    let malformed = || UnitsError::Malformed(text.to_string());

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(malformed());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }

    let digits = format!("{whole}{fraction}");
    let numerator = BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(malformed)?;
    Ok((numerator, fraction.len() as u32))
}

/// Converts a human amount ("10.5") into base units for a token with `decimals`.
pub fn parse_units(text: &str, decimals: u8) -> Result<U256, UnitsError> {
    let (numerator, scale) = parse_decimal(text)?;
    if scale > decimals as u32 {
        // trailing zeros beyond the token precision are harmless
        let excess = BigUint::from(10_u32).pow(scale - decimals as u32);
        if !(&numerator % &excess).is_zero() {
            return Err(UnitsError::TooPrecise {
                value: text.to_string(),
                decimals,
            });
        }
        return big_uint_to_u256(numerator / excess)
            .map_err(|_e| UnitsError::Overflow(text.to_string()));
    }
    let scaled = numerator * BigUint::from(10_u32).pow(decimals as u32 - scale);
    big_uint_to_u256(scaled).map_err(|_e| UnitsError::Overflow(text.to_string()))
}

/// Renders base units as a human amount, trimming trailing fractional zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    let value = u256_to_big_uint(value);
    let unit = BigUint::from(10_u32).pow(decimals as u32);
    let whole = &value / &unit;
    let fraction = &value % &unit;

    if fraction.is_zero() || unit.is_one() {
        return whole.to_string();
    }
    let fraction = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_amounts_with_token_decimals() {
        assert_eq!(parse_units("10", 6).unwrap(), U256::from(10_000_000_u64));
        assert_eq!(
            parse_units("0.01", 18).unwrap(),
            U256::from(10_000_000_000_000_000_u64)
        );
        assert_eq!(parse_units(".5", 1).unwrap(), U256::from(5_u8));
        assert_eq!(parse_units("1.500", 1).unwrap(), U256::from(15_u8));
    }

    #[test]
    fn should_reject_malformed_or_too_precise_amounts() {
        assert!(matches!(parse_units("", 6), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("-1", 6), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units("1e5", 6), Err(UnitsError::Malformed(_))));
        assert!(matches!(parse_units(".", 6), Err(UnitsError::Malformed(_))));
        assert_eq!(
            parse_units("0.0000001", 6),
            Err(UnitsError::TooPrecise {
                value: "0.0000001".to_string(),
                decimals: 6
            })
        );
    }

    #[test]
    fn should_format_base_units() {
        assert_eq!(format_units(U256::from(10_000_000_u64), 6), "10");
        assert_eq!(format_units(U256::from(1_500_000_u64), 6), "1.5");
        assert_eq!(format_units(U256::from(42_u8), 6), "0.000042");
        assert_eq!(format_units(U256::from(42_u8), 0), "42");
    }
}
