use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::libraries::{
    constants::{DEFAULT_SPREAD, DEFAULT_TICK_SPACING, MAX_TICK, MIN_TICK, TICK_BASE},
    price::Price,
    sqrt_price::{encode_sqrt_price_x96, SqrtPriceError},
    tick_math::{TickMath, TickMathError},
};

pub mod types;

pub use types::{PoolFee, PoolTickSpacing, SnapMode, TickRange};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TickRangeError {
    #[error("price must be finite and greater than zero, got {0}")]
    InvalidPrice(f64),
    #[error("spread must be strictly between 0 and 1, got {0}")]
    InvalidSpread(f64),
    #[error("tick spacing must be greater than zero, got {0}")]
    InvalidTickSpacing(i32),
    #[error("lower price {lower} must be below upper price {upper}")]
    InvalidPriceBounds { lower: String, upper: String },
    #[error("unsupported fee tier: {0}")]
    UnsupportedFeeTier(u32),
    #[error("tick {0} is outside the tick grid")]
    TickOutOfBounds(i32),
    #[error(transparent)]
    SqrtPrice(#[from] SqrtPriceError),
    #[error(transparent)]
    TickMath(#[from] TickMathError),
}

/// How the range of a new position is chosen, as written in plan files.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeSpec {
    /// Widest range the tick spacing allows.
    #[default]
    Full,
    /// Center price with a fractional spread on both sides.
    Spread {
        price: f64,
        #[serde(default = "default_spread")]
        spread: f64,
        #[serde(default)]
        snap: SnapMode,
    },
    /// Explicit price bounds, aligned outward.
    Bounds { lower: Price, upper: Price },
}

fn default_spread() -> f64 {
    DEFAULT_SPREAD
}

impl RangeSpec {
    pub fn resolve(&self, tick_spacing: PoolTickSpacing) -> Result<TickRange, TickRangeError> {
        match self {
            RangeSpec::Full => full_range(tick_spacing),
            RangeSpec::Spread {
                price,
                spread,
                snap,
            } => get_tick_range_from_price_with(*price, *spread, tick_spacing.0, *snap),
            RangeSpec::Bounds { lower, upper } => {
                get_tick_range_with_spacing(lower, upper, tick_spacing)
            }
        }
    }
}

/// Arguments of the spread-based calculator, filled with the usual defaults
/// (20% spread, spacing 60, nearest snapping).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickRangeRequest {
    pub price: f64,
    pub spread: f64,
    pub tick_spacing: i32,
    pub snap: SnapMode,
}

impl TickRangeRequest {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            spread: DEFAULT_SPREAD,
            tick_spacing: DEFAULT_TICK_SPACING,
            snap: SnapMode::default(),
        }
    }

    pub fn with_spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    pub fn with_tick_spacing(mut self, tick_spacing: i32) -> Self {
        self.tick_spacing = tick_spacing;
        self
    }

    pub fn with_snap(mut self, snap: SnapMode) -> Self {
        self.snap = snap;
        self
    }

    pub fn resolve(&self) -> Result<TickRange, TickRangeError> {
        get_tick_range_from_price_with(self.price, self.spread, self.tick_spacing, self.snap)
    }
}

pub fn log_base_1_0001(x: f64) -> f64 {
    x.ln() / TICK_BASE.ln()
}

/// Rounds to the nearest multiple of `tick_spacing`; an exact half goes up.
pub fn nearest_usable_tick(tick: i32, tick_spacing: i32) -> Result<i32, TickRangeError> {
    validate_tick_spacing(tick_spacing)?;
    let (tick, spacing) = (tick as i64, tick_spacing as i64);
    Ok(((2 * tick + spacing).div_euclid(2 * spacing) * spacing) as i32)
}

fn floor_to_spacing(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing) * tick_spacing
}

fn ceil_to_spacing(tick: i32, tick_spacing: i32) -> i32 {
    let floored = floor_to_spacing(tick, tick_spacing);
    if floored == tick {
        tick
    } else {
        floored + tick_spacing
    }
}

fn validate_tick_spacing(tick_spacing: i32) -> Result<(), TickRangeError> {
    if tick_spacing <= 0 {
        return Err(TickRangeError::InvalidTickSpacing(tick_spacing));
    }
    Ok(())
}

/// Widest aligned range, e.g. [-887220, 887220] for a spacing of 60.
pub fn full_range(tick_spacing: PoolTickSpacing) -> Result<TickRange, TickRangeError> {
    validate_tick_spacing(tick_spacing.0)?;
    Ok(TickRange {
        tick_lower: (MIN_TICK / tick_spacing.0) * tick_spacing.0,
        tick_upper: (MAX_TICK / tick_spacing.0) * tick_spacing.0,
    })
}

fn clamp_to_usable(tick: i32, tick_spacing: i32) -> i32 {
    let min_usable = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_usable = (MAX_TICK / tick_spacing) * tick_spacing;
    tick.clamp(min_usable, max_usable)
}

/// Floor-derived lower and ceil-derived upper ticks for `price * (1 -/+ spread)`,
/// before any spacing is applied.
pub fn raw_ticks_from_price(price: f64, spread: f64) -> Result<(i32, i32), TickRangeError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(TickRangeError::InvalidPrice(price));
    }
    if !spread.is_finite() || spread <= 0.0 || spread >= 1.0 {
        return Err(TickRangeError::InvalidSpread(spread));
    }

    let lower_price = price * (1.0 - spread);
    let upper_price = price * (1.0 + spread);

    let raw_lower = log_base_1_0001(lower_price).floor();
    let raw_upper = log_base_1_0001(upper_price).ceil();

    let to_tick = |raw: f64| -> Result<i32, TickRangeError> {
        if !raw.is_finite() || raw < MIN_TICK as f64 || raw > MAX_TICK as f64 {
            return Err(TickRangeError::TickOutOfBounds(
                raw.clamp(i32::MIN as f64, i32::MAX as f64) as i32,
            ));
        }
        Ok(raw as i32)
    };

    Ok((to_tick(raw_lower)?, to_tick(raw_upper)?))
}

/// Tick range covering `price` (token1 per token0) +/- `spread`, snapped to the
/// nearest multiple of `tick_spacing`.
pub fn get_tick_range_from_price(
    price: f64,
    spread: f64,
    tick_spacing: i32,
) -> Result<TickRange, TickRangeError> {
    get_tick_range_from_price_with(price, spread, tick_spacing, SnapMode::Nearest)
}

pub fn get_tick_range_from_price_with(
    price: f64,
    spread: f64,
    tick_spacing: i32,
    snap: SnapMode,
) -> Result<TickRange, TickRangeError> {
    validate_tick_spacing(tick_spacing)?;
    let (raw_lower, raw_upper) = raw_ticks_from_price(price, spread)?;

    let (tick_lower, tick_upper) = match snap {
        SnapMode::Nearest => (
            nearest_usable_tick(raw_lower, tick_spacing)?,
            nearest_usable_tick(raw_upper, tick_spacing)?,
        ),
        SnapMode::Outward => (
            floor_to_spacing(raw_lower, tick_spacing),
            ceil_to_spacing(raw_upper, tick_spacing),
        ),
    };

    Ok(TickRange {
        tick_lower: clamp_to_usable(tick_lower, tick_spacing),
        tick_upper: clamp_to_usable(tick_upper, tick_spacing),
    })
}

/// Tick range for explicit price bounds on a pool with the given fee tier.
pub fn get_tick_range(
    price_lower: &Price,
    price_upper: &Price,
    fee: PoolFee,
) -> Result<TickRange, TickRangeError> {
    get_tick_range_with_spacing(price_lower, price_upper, fee.tick_spacing()?)
}

/// Bounds go through the exact Q64.96 encoding and [`TickMath`], then the lower
/// tick is floored and the upper tick ceiled to the spacing.
pub fn get_tick_range_with_spacing(
    price_lower: &Price,
    price_upper: &Price,
    tick_spacing: PoolTickSpacing,
) -> Result<TickRange, TickRangeError> {
    validate_tick_spacing(tick_spacing.0)?;
    if price_lower.cmp_value(price_upper) != Ordering::Less {
        return Err(TickRangeError::InvalidPriceBounds {
            lower: price_lower.to_string(),
            upper: price_upper.to_string(),
        });
    }

    let raw_lower = TickMath::get_tick_at_sqrt_ratio(encode_sqrt_price_x96(price_lower)?)?;
    let raw_upper = TickMath::get_tick_at_sqrt_ratio(encode_sqrt_price_x96(price_upper)?)?;

    Ok(TickRange {
        tick_lower: clamp_to_usable(floor_to_spacing(raw_lower, tick_spacing.0), tick_spacing.0),
        tick_upper: clamp_to_usable(ceil_to_spacing(raw_upper, tick_spacing.0), tick_spacing.0),
    })
}
