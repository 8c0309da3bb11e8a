//! Run configurations read from JSON files.

use std::path::Path;

use alloy::primitives::Address;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{Chain, ConfigError, Network};
use crate::{
    libraries::{price::Price, units::parse_units},
    solana::{AmmConfig, ComputeBudget, SolanaAddress},
    tick_range::{PoolFee, RangeSpec},
};

/// Checks a plan beyond what its JSON shape already guarantees.
pub trait Plan: DeserializeOwned {
    fn validate(&self) -> Result<(), ConfigError>;
}

pub fn load_plan<T: Plan>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let plan: T = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    plan.validate()?;
    Ok(plan)
}

fn default_decimals() -> u8 {
    9
}

/// Pool and position to provision on a Uniswap V3 deployment.
///
/// Amounts are human decimal strings in the order the tokens are given here;
/// `range` and `initial_price` are token1 per token0 in base units, i.e. after
/// canonical ordering.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EthPoolPlan {
    pub network: Network,
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a: String,
    pub amount_b: String,
    pub decimals_a: u8,
    pub decimals_b: u8,
    #[serde(default)]
    pub fee: PoolFee,
    #[serde(default)]
    pub range: RangeSpec,
    #[serde(default)]
    pub initial_price: Option<Price>,
}

impl EthPoolPlan {
    /// Desired amounts in base units, still in `(token_a, token_b)` order.
    pub fn desired_amounts(
        &self,
    ) -> Result<(alloy::primitives::U256, alloy::primitives::U256), ConfigError> {
        let amount_a = parse_units(&self.amount_a, self.decimals_a)
            .map_err(|e| ConfigError::InvalidPlan(format!("amount_a: {e}")))?;
        let amount_b = parse_units(&self.amount_b, self.decimals_b)
            .map_err(|e| ConfigError::InvalidPlan(format!("amount_b: {e}")))?;
        Ok((
            crate::libraries::safe_cast::u256_to_alloy(amount_a),
            crate::libraries::safe_cast::u256_to_alloy(amount_b),
        ))
    }
}

impl Plan for EthPoolPlan {
    fn validate(&self) -> Result<(), ConfigError> {
        self.network.expect_chain(Chain::Ethereum)?;
        if self.token_a == self.token_b {
            return Err(ConfigError::InvalidPlan(format!(
                "token_a and token_b are both {}",
                self.token_a
            )));
        }
        self.fee
            .tick_spacing()
            .map_err(|e| ConfigError::InvalidPlan(e.to_string()))?;
        self.desired_amounts()?;
        Ok(())
    }
}

/// Which of the plan's two mints the base amount is denominated in.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanBase {
    #[default]
    TokenA,
    TokenB,
}

/// Position opened right after the pool. Prices are `mint_b` per `mint_a` in
/// human units; amounts are raw base units.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PositionPlan {
    pub price_lower: Price,
    pub price_upper: Price,
    #[serde(default)]
    pub base: PlanBase,
    pub base_amount: u64,
    pub other_amount_max: u64,
    #[serde(default = "default_use_sol_balance")]
    pub use_sol_balance: bool,
    #[serde(default)]
    pub compute_budget: ComputeBudget,
}

fn default_use_sol_balance() -> bool {
    true
}

/// CLMM pool to create on Solana, optionally with a first position.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClmmPoolPlan {
    pub network: Network,
    pub mint_a: SolanaAddress,
    pub mint_b: SolanaAddress,
    /// `mint_b` per `mint_a`, human units.
    pub initial_price: Price,
    /// Only consulted by the offline preview; live runs read decimals from the chain.
    #[serde(default = "default_decimals")]
    pub decimals_a: u8,
    #[serde(default = "default_decimals")]
    pub decimals_b: u8,
    /// Falls back to the network's well-known config when absent.
    #[serde(default)]
    pub amm_config: Option<AmmConfig>,
    #[serde(default)]
    pub program_id: Option<SolanaAddress>,
    #[serde(default)]
    pub position: Option<PositionPlan>,
}

impl ClmmPoolPlan {
    pub fn amm_config(&self) -> Result<AmmConfig, ConfigError> {
        match &self.amm_config {
            Some(config) => Ok(config.clone()),
            None => self.network.default_amm_config(),
        }
    }

    pub fn program_id(&self) -> Result<SolanaAddress, ConfigError> {
        match self.program_id {
            Some(id) => Ok(id),
            None => self.network.clmm_program_id(),
        }
    }
}

impl Plan for ClmmPoolPlan {
    fn validate(&self) -> Result<(), ConfigError> {
        self.network.expect_chain(Chain::Solana)?;
        if self.mint_a == self.mint_b {
            return Err(ConfigError::InvalidPlan(format!(
                "mint_a and mint_b are both {}",
                self.mint_a
            )));
        }
        if let Some(position) = &self.position {
            if position.price_lower.cmp_value(&position.price_upper) != std::cmp::Ordering::Less {
                return Err(ConfigError::InvalidPlan(format!(
                    "position price_lower {} must be below price_upper {}",
                    position.price_lower, position.price_upper
                )));
            }
        }
        Ok(())
    }
}

fn default_lot_size() -> f64 {
    1.0
}

fn default_tick_size() -> f64 {
    0.01
}

fn default_request_queue_space() -> u64 {
    5120 + 12
}

fn default_event_queue_space() -> u64 {
    262144 + 12
}

fn default_orderbook_queue_space() -> u64 {
    65536 + 12
}

/// OpenBook market for a base/quote pair.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarketPlan {
    pub network: Network,
    pub base_mint: SolanaAddress,
    pub quote_mint: SolanaAddress,
    #[serde(default = "default_decimals")]
    pub base_decimals: u8,
    #[serde(default = "default_decimals")]
    pub quote_decimals: u8,
    #[serde(default = "default_lot_size")]
    pub lot_size: f64,
    #[serde(default = "default_tick_size")]
    pub tick_size: f64,
    #[serde(default = "default_request_queue_space")]
    pub request_queue_space: u64,
    #[serde(default = "default_event_queue_space")]
    pub event_queue_space: u64,
    #[serde(default = "default_orderbook_queue_space")]
    pub orderbook_queue_space: u64,
}

impl Plan for MarketPlan {
    fn validate(&self) -> Result<(), ConfigError> {
        self.network.expect_chain(Chain::Solana)?;
        if self.base_mint == self.quote_mint {
            return Err(ConfigError::InvalidPlan(
                "base_mint and quote_mint must differ".to_string(),
            ));
        }
        for (name, value) in [("lot_size", self.lot_size), ("tick_size", self.tick_size)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidPlan(format!(
                    "{name} must be greater than zero, got {value}"
                )));
            }
        }
        Ok(())
    }
}
