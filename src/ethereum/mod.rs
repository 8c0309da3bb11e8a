use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use serde::Serialize;

use crate::tick_range::PoolFee;

pub mod client;
pub mod provision;

pub use client::AlloyUniswapV3;
pub use provision::{list_positions, provide_liquidity, ProvisionError, ProvisionMode, ProvisionReport};


#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("signer error: {0}")]
    Signer(String),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: B256 },
    #[error("unexpected contract response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

impl Slot0 {
    /// A pool that was created but never given a starting price.
    pub fn is_initialized(&self) -> bool {
        !self.sqrt_price_x96.is_zero()
    }
}

/// Arguments of `NonfungiblePositionManager.mint`, tokens already in pool order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub token0: Address,
    pub token1: Address,
    pub fee: PoolFee,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    pub deadline: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintedPosition {
    pub tx_hash: B256,
    /// Recovered from the `IncreaseLiquidity` log of the receipt, when present.
    pub token_id: Option<U256>,
    pub liquidity: Option<u128>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionSummary {
    pub token_id: U256,
    pub token0: Address,
    pub token1: Address,
    pub fee: PoolFee,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
}

/// The calls the provisioning procedures make against a Uniswap V3 deployment.
/// Every write waits for its receipt before returning.
#[async_trait]
pub trait UniswapV3Api: Send + Sync {
    fn signer_address(&self) -> Address;

    /// Spender that `approve` is given to before minting.
    fn position_manager(&self) -> Address;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ClientError>;

    async fn approve(&self, token: Address, spender: Address, amount: U256)
    -> Result<B256, ClientError>;

    /// Pool address for the ordered pair, `Address::ZERO` when none exists.
    async fn get_pool(
        &self,
        token0: Address,
        token1: Address,
        fee: PoolFee,
    ) -> Result<Address, ClientError>;

    async fn create_pool(
        &self,
        token0: Address,
        token1: Address,
        fee: PoolFee,
    ) -> Result<B256, ClientError>;

    async fn slot0(&self, pool: Address) -> Result<Slot0, ClientError>;

    async fn initialize(&self, pool: Address, sqrt_price_x96: U256) -> Result<B256, ClientError>;

    async fn mint(&self, request: MintRequest) -> Result<MintedPosition, ClientError>;

    async fn position_count(&self, owner: Address) -> Result<U256, ClientError>;

    async fn token_of_owner_by_index(&self, owner: Address, index: U256)
    -> Result<U256, ClientError>;

    async fn position(&self, token_id: U256) -> Result<PositionSummary, ClientError>;
}
