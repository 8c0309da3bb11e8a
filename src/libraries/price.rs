use std::{cmp::Ordering, fmt, str::FromStr};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use super::units::{parse_decimal, UnitsError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must be a finite number greater than zero, got {0}")]
    NotPositive(String),
    #[error(transparent)]
    Units(#[from] UnitsError),
}

/// An exact, strictly positive price kept as a fraction so fixed-point
/// encodings never go through floating point.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PriceRepr", into = "String")]
pub struct Price {
    numerator: BigUint,
    denominator: BigUint,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceRepr {
    Text(String),
    Number(f64),
}

impl TryFrom<PriceRepr> for Price {
    type Error = PriceError;

    fn try_from(value: PriceRepr) -> Result<Self, Self::Error> {
        match value {
            PriceRepr::Text(text) => text.parse(),
            PriceRepr::Number(number) => Price::try_from(number),
        }
    }
}

impl Price {
    pub fn from_ratio(numerator: BigUint, denominator: BigUint) -> Result<Self, PriceError> {
        if numerator.is_zero() || denominator.is_zero() {
            return Err(PriceError::NotPositive(format!("{numerator}/{denominator}")));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> &BigUint {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }

    /// Price of the other side of the pair.
    pub fn invert(&self) -> Self {
        Self {
            numerator: self.denominator.clone(),
            denominator: self.numerator.clone(),
        }
    }

    /// Turns a human price (token1 per token0) into a price in base units by
    /// multiplying with 10^(decimals1 - decimals0).
    pub fn adjust_for_decimals(&self, decimals0: u8, decimals1: u8) -> Self {
        let ten = BigUint::from(10_u32);
        if decimals1 >= decimals0 {
            Self {
                numerator: &self.numerator * ten.pow((decimals1 - decimals0) as u32),
                denominator: self.denominator.clone(),
            }
        } else {
            Self {
                numerator: self.numerator.clone(),
                denominator: &self.denominator * ten.pow((decimals0 - decimals1) as u32),
            }
        }
    }

    /// Compares the values of two prices regardless of how the fractions are scaled.
    pub fn cmp_value(&self, other: &Price) -> Ordering {
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }

    pub fn to_f64(&self) -> f64 {
        let numerator = self.numerator.to_f64().unwrap_or(f64::INFINITY);
        let denominator = self.denominator.to_f64().unwrap_or(f64::INFINITY);
        numerator / denominator
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (numerator, scale) = parse_decimal(text)?;
        if numerator.is_zero() {
            return Err(PriceError::NotPositive(text.to_string()));
        }
        Ok(Self {
            numerator,
            denominator: BigUint::from(10_u32).pow(scale),
        })
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceError;

    // f64's Display never uses exponent notation, so the text is a plain decimal
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value <= 0.0 {
            return Err(PriceError::NotPositive(value.to_string()));
        }
        value.to_string().parse()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == BigUint::from(1_u8) {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price({self} ~ {})", self.to_f64())
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        // fractions are rendered as decimals when the denominator is a power of ten
        let denominator = price.denominator.to_string();
        let is_power_of_ten = denominator.starts_with('1')
            && denominator[1..].chars().all(|c| c == '0');
        if !is_power_of_ten {
            return price.to_f64().to_string();
        }
        let scale = denominator.len() - 1;
        if scale == 0 {
            return price.numerator.to_string();
        }
        let digits = format!("{:0>width$}", price.numerator.to_string(), width = scale + 1);
        let (whole, fraction) = digits.split_at(digits.len() - scale);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        }
    }
}
