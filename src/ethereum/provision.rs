use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, B256, U256};
use ic_canister_log::log;
use serde::Serialize;

use super::{ClientError, MintRequest, MintedPosition, PositionSummary, UniswapV3Api};
use crate::{
    config::{ConfigError, EthPoolPlan},
    libraries::{
        constants::MINT_DEADLINE_SECS,
        price::Price,
        safe_cast::{alloy_to_u256, u256_to_alloy, u256_to_big_uint},
        sqrt_price::{encode_sqrt_price_x96, SqrtPriceError},
        units::format_units,
    },
    logs::{DEBUG, INFO},
    tick_range::{TickRange, TickRangeError},
    token_pair::{TokenPair, TokenPairError},
};

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    TokenPair(#[from] TokenPairError),
    #[error(transparent)]
    TickRange(#[from] TickRangeError),
    #[error(transparent)]
    SqrtPrice(#[from] SqrtPriceError),
    #[error("insufficient balance of {token}: have {balance}, need {desired}")]
    InsufficientBalance {
        token: Address,
        balance: U256,
        desired: U256,
    },
    #[error("no pool for {token0}/{token1} at fee {fee}")]
    PoolNotFound {
        token0: Address,
        token1: Address,
        fee: u32,
    },
    #[error("pool {0} has no price yet")]
    PoolNotInitialized(Address),
    #[error("cannot derive an initial price: {0}")]
    NoInitialPrice(String),
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// What to do when the pool or its price is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionMode {
    CreateIfMissing,
    ExistingOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub amount0: U256,
    pub amount1: U256,
    pub tick_range: TickRange,
    pub approvals: Vec<B256>,
    pub create_pool_tx: Option<B256>,
    pub initialize_tx: Option<B256>,
    pub position: MintedPosition,
}

impl ProvisionReport {
    pub fn pool_created(&self) -> bool {
        self.create_pool_tx.is_some()
    }

    pub fn pool_initialized(&self) -> bool {
        self.initialize_tx.is_some()
    }
}

fn mint_deadline() -> U256 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    U256::from(now + MINT_DEADLINE_SECS)
}

/// Starting price for a new pool: the plan's, or the ratio of the deposited amounts.
fn initial_sqrt_price(
    plan: &EthPoolPlan,
    amount0: U256,
    amount1: U256,
) -> Result<U256, ProvisionError> {
    let price = match &plan.initial_price {
        Some(price) => price.clone(),
        None => Price::from_ratio(
            u256_to_big_uint(alloy_to_u256(amount1)),
            u256_to_big_uint(alloy_to_u256(amount0)),
        )
        .map_err(|e| ProvisionError::NoInitialPrice(e.to_string()))?,
    };
    let sqrt_price_x96 = encode_sqrt_price_x96(&price)?;
    log!(
        DEBUG,
        "[initial_sqrt_price]: price {price} token1/token0 -> sqrtPriceX96 {sqrt_price_x96}"
    );
    Ok(u256_to_alloy(sqrt_price_x96))
}

/// Adds liquidity for `plan`: checks balances, approves the position manager,
/// finds (or creates and initializes) the pool and mints a position.
///
/// Nothing is sent when a balance is short or, in [`ProvisionMode::ExistingOnly`],
/// when the pool is missing or has no price.
pub async fn provide_liquidity<A: UniswapV3Api + ?Sized>(
    api: &A,
    plan: &EthPoolPlan,
    mode: ProvisionMode,
) -> Result<ProvisionReport, ProvisionError> {
    let owner = api.signer_address();
    let (amount_a, amount_b) = plan.desired_amounts()?;
    let pair = TokenPair::new(plan.token_a, plan.token_b)?;
    let (amount0, amount1) = pair.order_amounts(amount_a, amount_b);
    let (decimals0, decimals1) = pair.order_amounts(plan.decimals_a, plan.decimals_b);
    let (token0, token1) = (pair.token0, pair.token1);
    let tick_spacing = plan.fee.tick_spacing()?;
    let tick_range = plan.range.resolve(tick_spacing)?;

    log!(
        INFO,
        "[provide_liquidity]: {token0}/{token1} fee {} ticks [{}, {}], flipped: {}",
        plan.fee.0,
        tick_range.tick_lower,
        tick_range.tick_upper,
        pair.is_flipped()
    );

    for (token, desired, decimals) in [(token0, amount0, decimals0), (token1, amount1, decimals1)] {
        let balance = api.balance_of(token, owner).await?;
        log!(
            DEBUG,
            "[provide_liquidity]: balance of {token}: {}, need {}",
            format_units(alloy_to_u256(balance), decimals),
            format_units(alloy_to_u256(desired), decimals)
        );
        if balance < desired {
            return Err(ProvisionError::InsufficientBalance {
                token,
                balance,
                desired,
            });
        }
    }

    let mut pool = api.get_pool(token0, token1, plan.fee).await?;
    if pool.is_zero() && mode == ProvisionMode::ExistingOnly {
        return Err(ProvisionError::PoolNotFound {
            token0,
            token1,
            fee: plan.fee.0,
        });
    }

    // an existing pool's price is read before anything is sent
    let mut slot0 = None;
    if !pool.is_zero() {
        let current = api.slot0(pool).await?;
        if !current.is_initialized() && mode == ProvisionMode::ExistingOnly {
            return Err(ProvisionError::PoolNotInitialized(pool));
        }
        slot0 = Some(current);
    }

    let spender = api.position_manager();
    let mut approvals = Vec::with_capacity(2);
    for (token, amount) in [(token0, amount0), (token1, amount1)] {
        let tx_hash = api.approve(token, spender, amount).await?;
        log!(INFO, "[provide_liquidity]: approved {amount} of {token}: {tx_hash}");
        approvals.push(tx_hash);
    }

    let mut create_pool_tx = None;
    let slot0 = match slot0 {
        Some(slot0) => {
            log!(INFO, "[provide_liquidity]: pool {pool} already exists");
            slot0
        }
        None => {
            let tx_hash = api.create_pool(token0, token1, plan.fee).await?;
            pool = api.get_pool(token0, token1, plan.fee).await?;
            if pool.is_zero() {
                return Err(ProvisionError::PoolNotFound {
                    token0,
                    token1,
                    fee: plan.fee.0,
                });
            }
            log!(INFO, "[provide_liquidity]: created pool {pool}: {tx_hash}");
            create_pool_tx = Some(tx_hash);
            api.slot0(pool).await?
        }
    };

    let mut initialize_tx = None;
    if !slot0.is_initialized() {
        let sqrt_price_x96 = initial_sqrt_price(plan, amount0, amount1)?;
        let tx_hash = api.initialize(pool, sqrt_price_x96).await?;
        log!(INFO, "[provide_liquidity]: initialized pool {pool}: {tx_hash}");
        initialize_tx = Some(tx_hash);
    } else {
        log!(
            DEBUG,
            "[provide_liquidity]: pool {pool} at tick {} sqrtPriceX96 {}",
            slot0.tick,
            slot0.sqrt_price_x96
        );
    }

    let position = api
        .mint(MintRequest {
            token0,
            token1,
            fee: plan.fee,
            tick_lower: tick_range.tick_lower,
            tick_upper: tick_range.tick_upper,
            amount0_desired: amount0,
            amount1_desired: amount1,
            amount0_min: U256::ZERO,
            amount1_min: U256::ZERO,
            recipient: owner,
            deadline: mint_deadline(),
        })
        .await?;
    log!(
        INFO,
        "[provide_liquidity]: minted position {:?}: {}",
        position.token_id,
        position.tx_hash
    );

    Ok(ProvisionReport {
        pool,
        token0,
        token1,
        amount0,
        amount1,
        tick_range,
        approvals,
        create_pool_tx,
        initialize_tx,
        position,
    })
}

/// Every position NFT held by the signer.
pub async fn list_positions<A: UniswapV3Api + ?Sized>(
    api: &A,
) -> Result<Vec<PositionSummary>, ProvisionError> {
    let owner = api.signer_address();
    let count = api.position_count(owner).await?;
    log!(INFO, "[list_positions]: {owner} holds {count} positions");

    let mut positions = vec![];
    let mut index = U256::ZERO;
    while index < count {
        let token_id = api.token_of_owner_by_index(owner, index).await?;
        positions.push(api.position(token_id).await?);
        index += U256::from(1);
    }
    Ok(positions)
}
