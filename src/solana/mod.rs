use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{libraries::price::Price, tick_range::PoolTickSpacing};

pub mod address;
pub mod client;
pub mod instructions;
pub mod provision;
pub mod wallet;

pub use address::{AddressError, SolanaAddress};
pub use client::RpcClmmClient;
pub use provision::{
    create_clmm_pool, create_lookup_table, create_market, create_pool_and_open_position,
    preview_clmm_plan, ClmmPlanPreview, PoolOutcome, PositionOutcome, SolanaProvisionError,
};
pub use wallet::{load_keypair, WalletError};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdkError {
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("transaction failed: {0}")]
    Transaction(String),
    #[error("account {0} not found")]
    AccountNotFound(SolanaAddress),
    #[error("invalid account data: {0}")]
    Decode(String),
    #[error("wallet holds {available} lamports, {needed} needed")]
    InsufficientFunds { needed: u64, available: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub String);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub mint: SolanaAddress,
    pub decimals: u8,
    /// Token or Token-2022 program that owns the mint.
    pub program_id: SolanaAddress,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Fee and spacing configuration a CLMM pool is created under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmConfig {
    pub id: SolanaAddress,
    pub index: u16,
    pub protocol_fee_rate: u32,
    pub trade_fee_rate: u32,
    pub tick_spacing: PoolTickSpacing,
    pub fund_fee_rate: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClmmPool {
    pub id: SolanaAddress,
    pub mint0: SolanaAddress,
    pub mint1: SolanaAddress,
    pub amm_config: SolanaAddress,
    pub tick_spacing: PoolTickSpacing,
    pub sqrt_price_x64: u128,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePoolRequest {
    pub program_id: SolanaAddress,
    pub mint0: TokenInfo,
    pub mint1: TokenInfo,
    pub amm_config: AmmConfig,
    /// mint1 per mint0, human units.
    pub initial_price: Price,
    pub sqrt_price_x64: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPool {
    pub pool: ClmmPool,
    pub signature: Signature,
}

/// Pool-side name of the mint a position's base amount is given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolSide {
    MintA,
    MintB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeBudget {
    pub units: u32,
    pub micro_lamports: u64,
}

impl Default for ComputeBudget {
    fn default() -> Self {
        Self {
            units: 600_000,
            micro_lamports: 100_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPositionRequest {
    pub pool: ClmmPool,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub base: PoolSide,
    pub base_amount: u64,
    pub other_amount_max: u64,
    pub use_sol_balance: bool,
    pub compute_budget: ComputeBudget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenedPosition {
    pub nft_mint: SolanaAddress,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRequest {
    pub program_id: SolanaAddress,
    pub base_mint: SolanaAddress,
    pub base_decimals: u8,
    pub quote_mint: SolanaAddress,
    pub quote_decimals: u8,
    pub lot_size: f64,
    pub tick_size: f64,
    pub request_queue_space: u64,
    pub event_queue_space: u64,
    pub orderbook_queue_space: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedMarket {
    pub market_id: SolanaAddress,
    /// Sent one after another, each confirmed before the next.
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedLookupTable {
    pub address: SolanaAddress,
    pub signature: Signature,
}

/// Wallet-bound access to a Raydium-style CLMM program, OpenBook and the
/// address lookup table program. Writes return once confirmed.
#[async_trait]
pub trait ClmmSdk: Send + Sync {
    fn owner(&self) -> SolanaAddress;

    async fn token_info(&self, mint: SolanaAddress) -> Result<TokenInfo, SdkError>;

    /// Mints for which the owner has no associated token account yet.
    async fn missing_token_accounts(
        &self,
        mints: &[SolanaAddress],
    ) -> Result<Vec<SolanaAddress>, SdkError>;

    /// Creates the owner's associated token accounts in a single transaction.
    async fn create_token_accounts(&self, mints: &[SolanaAddress])
    -> Result<Signature, SdkError>;

    async fn find_pool(
        &self,
        program_id: SolanaAddress,
        amm_config: &AmmConfig,
        mint0: SolanaAddress,
        mint1: SolanaAddress,
    ) -> Result<Option<ClmmPool>, SdkError>;

    async fn create_pool(&self, request: CreatePoolRequest) -> Result<CreatedPool, SdkError>;

    async fn open_position_from_base(
        &self,
        request: OpenPositionRequest,
    ) -> Result<OpenedPosition, SdkError>;

    async fn create_market(&self, request: MarketRequest) -> Result<CreatedMarket, SdkError>;

    async fn create_lookup_table(&self) -> Result<CreatedLookupTable, SdkError>;
}
