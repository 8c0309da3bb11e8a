use ethnum::U256;
use lazy_static::lazy_static;

lazy_static! {
    pub static ref Q96: U256 = U256::from(1u8) << 96; // 2^96 ;

    pub static ref MIN_SQRT_RATIO: U256 = U256::from_str_radix("4295128739", 10).unwrap();
    pub static ref MAX_SQRT_RATIO: U256 =
        U256::from_str_radix("1461446703485210103287273052203988822378723970342", 10).unwrap();
}

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// Base of the tick grid: price = 1.0001^tick.
pub const TICK_BASE: f64 = 1.0001;

pub const DEFAULT_SPREAD: f64 = 0.2;
pub const DEFAULT_TICK_SPACING: i32 = 60;

/// Seconds added to "now" for the deadline of position-manager calls.
pub const MINT_DEADLINE_SECS: u64 = 60 * 10;
