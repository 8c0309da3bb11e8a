pub mod constants;
pub mod price;
pub mod safe_cast;
pub mod sqrt_price;
pub mod tick_math;
pub mod units;
