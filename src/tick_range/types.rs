use serde::{Deserialize, Serialize};

use super::TickRangeError;

/// Pool fee in hundredths of a bip (e.g., 500 for 0.05%).
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[serde(transparent)]
pub struct PoolFee(pub u32);

impl PoolFee {
    pub const LOWEST: PoolFee = PoolFee(100);
    pub const LOW: PoolFee = PoolFee(500);
    pub const MEDIUM: PoolFee = PoolFee(3000);
    pub const HIGH: PoolFee = PoolFee(10000);

    /// Fixed fee-tier to tick-spacing table of the V3 factory.
    pub fn tick_spacing(&self) -> Result<PoolTickSpacing, TickRangeError> {
        match self.0 {
            100 => Ok(PoolTickSpacing(1)),
            500 => Ok(PoolTickSpacing(10)),
            3000 => Ok(PoolTickSpacing(60)),
            10000 => Ok(PoolTickSpacing(200)),
            fee => Err(TickRangeError::UnsupportedFeeTier(fee)),
        }
    }
}

impl Default for PoolFee {
    fn default() -> Self {
        PoolFee::MEDIUM
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[serde(transparent)]
pub struct PoolTickSpacing(pub i32);

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct TickRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

/// How a raw tick is moved onto the spacing grid in the spread-based calculator.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "snake_case")]
pub enum SnapMode {
    /// Nearest multiple, halves toward +inf. May give up to spacing/2 of the
    /// requested coverage on either side.
    #[default]
    Nearest,
    /// Floor the lower tick and ceil the upper tick to the grid.
    Outward,
}
