use ic_canister_log::log;
use serde::Serialize;

use super::{
    AmmConfig, ClmmPool, ClmmSdk, CreatePoolRequest, CreatedLookupTable, CreatedMarket,
    MarketRequest, OpenPositionRequest, OpenedPosition, PoolSide, SdkError, Signature,
    SolanaAddress, TokenInfo,
};
use crate::{
    config::{ClmmPoolPlan, ConfigError, MarketPlan, Plan, PlanBase, PositionPlan},
    libraries::{
        price::Price,
        sqrt_price::{encode_sqrt_price_x64, SqrtPriceError},
    },
    logs::{DEBUG, INFO},
    tick_range::{get_tick_range_with_spacing, PoolTickSpacing, TickRange, TickRangeError},
    token_pair::{TokenPair, TokenPairError},
};

#[derive(Debug, thiserror::Error)]
pub enum SolanaProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    TokenPair(#[from] TokenPairError),
    #[error(transparent)]
    TickRange(#[from] TickRangeError),
    #[error(transparent)]
    SqrtPrice(#[from] SqrtPriceError),
    #[error("the plan has no position to open")]
    MissingPosition,
    #[error(transparent)]
    Sdk(#[from] SdkError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolOutcome {
    pub pool: ClmmPool,
    pub mint0: TokenInfo,
    pub mint1: TokenInfo,
    /// The plan's `mint_a` became the pool's second mint.
    pub flipped: bool,
    /// Set only when this run created the pool.
    pub signature: Option<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionOutcome {
    pub pool: PoolOutcome,
    pub token_accounts: Option<Signature>,
    pub tick_range: TickRange,
    pub base: PoolSide,
    pub position: OpenedPosition,
}

/// Plan mints in pool order, with the starting price flipped to match.
struct OrderedPlan {
    pair: TokenPair<SolanaAddress>,
    /// mint1 per mint0, human units.
    initial_price: Price,
}

fn order_plan(plan: &ClmmPoolPlan) -> Result<OrderedPlan, TokenPairError> {
    let pair = TokenPair::new(plan.mint_a, plan.mint_b)?;
    let initial_price = if pair.is_flipped() {
        plan.initial_price.invert()
    } else {
        plan.initial_price.clone()
    };
    Ok(OrderedPlan {
        pair,
        initial_price,
    })
}

fn pool_side(base: PlanBase, flipped: bool) -> PoolSide {
    match (base, flipped) {
        (PlanBase::TokenA, false) | (PlanBase::TokenB, true) => PoolSide::MintA,
        (PlanBase::TokenA, true) | (PlanBase::TokenB, false) => PoolSide::MintB,
    }
}

/// Ticks for the position's `mint_b per mint_a` human price bounds, aligned
/// outward to `tick_spacing`.
fn position_ticks(
    position: &PositionPlan,
    flipped: bool,
    decimals0: u8,
    decimals1: u8,
    tick_spacing: PoolTickSpacing,
) -> Result<TickRange, TickRangeError> {
    // inverting swaps which bound is the lower one
    let (lower, upper) = if flipped {
        (position.price_upper.invert(), position.price_lower.invert())
    } else {
        (position.price_lower.clone(), position.price_upper.clone())
    };
    get_tick_range_with_spacing(
        &lower.adjust_for_decimals(decimals0, decimals1),
        &upper.adjust_for_decimals(decimals0, decimals1),
        tick_spacing,
    )
}

fn initial_sqrt_price_x64(
    initial_price: &Price,
    decimals0: u8,
    decimals1: u8,
) -> Result<u128, SqrtPriceError> {
    encode_sqrt_price_x64(&initial_price.adjust_for_decimals(decimals0, decimals1))
}

struct PreparedPool {
    program_id: SolanaAddress,
    amm_config: AmmConfig,
    ordered: OrderedPlan,
    mint0: TokenInfo,
    mint1: TokenInfo,
}

async fn prepare_pool<S: ClmmSdk + ?Sized>(
    sdk: &S,
    plan: &ClmmPoolPlan,
) -> Result<PreparedPool, SolanaProvisionError> {
    plan.validate()?;
    let program_id = plan.program_id()?;
    let amm_config = plan.amm_config()?;
    let ordered = order_plan(plan)?;

    let mint0 = sdk.token_info(ordered.pair.token0).await?;
    let mint1 = sdk.token_info(ordered.pair.token1).await?;
    log!(
        DEBUG,
        "[prepare_pool]: mint0 {} ({} decimals), mint1 {} ({} decimals), flipped: {}",
        mint0.mint,
        mint0.decimals,
        mint1.mint,
        mint1.decimals,
        ordered.pair.is_flipped()
    );

    Ok(PreparedPool {
        program_id,
        amm_config,
        ordered,
        mint0,
        mint1,
    })
}

async fn ensure_pool<S: ClmmSdk + ?Sized>(
    sdk: &S,
    prepared: &PreparedPool,
) -> Result<PoolOutcome, SolanaProvisionError> {
    let (token0, token1) = (prepared.ordered.pair.token0, prepared.ordered.pair.token1);
    let flipped = prepared.ordered.pair.is_flipped();

    if let Some(pool) = sdk
        .find_pool(prepared.program_id, &prepared.amm_config, token0, token1)
        .await?
    {
        log!(INFO, "[ensure_pool]: pool {} already exists", pool.id);
        return Ok(PoolOutcome {
            pool,
            mint0: prepared.mint0.clone(),
            mint1: prepared.mint1.clone(),
            flipped,
            signature: None,
        });
    }

    let sqrt_price_x64 = initial_sqrt_price_x64(
        &prepared.ordered.initial_price,
        prepared.mint0.decimals,
        prepared.mint1.decimals,
    )?;
    let created = sdk
        .create_pool(CreatePoolRequest {
            program_id: prepared.program_id,
            mint0: prepared.mint0.clone(),
            mint1: prepared.mint1.clone(),
            amm_config: prepared.amm_config.clone(),
            initial_price: prepared.ordered.initial_price.clone(),
            sqrt_price_x64,
        })
        .await?;
    log!(
        INFO,
        "[ensure_pool]: created pool {} at price {}: {}",
        created.pool.id,
        prepared.ordered.initial_price,
        created.signature
    );

    Ok(PoolOutcome {
        pool: created.pool,
        mint0: prepared.mint0.clone(),
        mint1: prepared.mint1.clone(),
        flipped,
        signature: Some(created.signature),
    })
}

/// Creates the plan's CLMM pool unless it already exists.
pub async fn create_clmm_pool<S: ClmmSdk + ?Sized>(
    sdk: &S,
    plan: &ClmmPoolPlan,
) -> Result<PoolOutcome, SolanaProvisionError> {
    let prepared = prepare_pool(sdk, plan).await?;
    ensure_pool(sdk, &prepared).await
}

/// Creates the pool if needed, makes sure the owner has token accounts for both
/// mints and opens the plan's position from its base amount.
pub async fn create_pool_and_open_position<S: ClmmSdk + ?Sized>(
    sdk: &S,
    plan: &ClmmPoolPlan,
) -> Result<PositionOutcome, SolanaProvisionError> {
    let position = plan
        .position
        .as_ref()
        .ok_or(SolanaProvisionError::MissingPosition)?;
    let prepared = prepare_pool(sdk, plan).await?;
    let flipped = prepared.ordered.pair.is_flipped();
    let tick_range = position_ticks(
        position,
        flipped,
        prepared.mint0.decimals,
        prepared.mint1.decimals,
        prepared.amm_config.tick_spacing,
    )?;

    let pool = ensure_pool(sdk, &prepared).await?;

    let mints = [prepared.ordered.pair.token0, prepared.ordered.pair.token1];
    let missing = sdk.missing_token_accounts(&mints).await?;
    let token_accounts = if missing.is_empty() {
        None
    } else {
        let signature = sdk.create_token_accounts(&missing).await?;
        log!(
            INFO,
            "[create_pool_and_open_position]: created {} token accounts: {signature}",
            missing.len()
        );
        Some(signature)
    };

    let base = pool_side(position.base, flipped);
    let opened = sdk
        .open_position_from_base(OpenPositionRequest {
            pool: pool.pool.clone(),
            tick_lower: tick_range.tick_lower,
            tick_upper: tick_range.tick_upper,
            base,
            base_amount: position.base_amount,
            other_amount_max: position.other_amount_max,
            use_sol_balance: position.use_sol_balance,
            compute_budget: position.compute_budget,
        })
        .await?;
    log!(
        INFO,
        "[create_pool_and_open_position]: position nft {} in [{}, {}]: {}",
        opened.nft_mint,
        tick_range.tick_lower,
        tick_range.tick_upper,
        opened.signature
    );

    Ok(PositionOutcome {
        pool,
        token_accounts,
        tick_range,
        base,
        position: opened,
    })
}

/// Lists an OpenBook market for the plan's base/quote pair.
pub async fn create_market<S: ClmmSdk + ?Sized>(
    sdk: &S,
    plan: &MarketPlan,
) -> Result<CreatedMarket, SolanaProvisionError> {
    plan.validate()?;
    let request = MarketRequest {
        program_id: plan.network.openbook_program_id()?,
        base_mint: plan.base_mint,
        base_decimals: plan.base_decimals,
        quote_mint: plan.quote_mint,
        quote_decimals: plan.quote_decimals,
        lot_size: plan.lot_size,
        tick_size: plan.tick_size,
        request_queue_space: plan.request_queue_space,
        event_queue_space: plan.event_queue_space,
        orderbook_queue_space: plan.orderbook_queue_space,
    };
    let market = sdk.create_market(request).await?;
    log!(
        INFO,
        "[create_market]: market {} in {} transactions",
        market.market_id,
        market.signatures.len()
    );
    Ok(market)
}

pub async fn create_lookup_table<S: ClmmSdk + ?Sized>(
    sdk: &S,
) -> Result<CreatedLookupTable, SolanaProvisionError> {
    let table = sdk.create_lookup_table().await?;
    log!(
        INFO,
        "[create_lookup_table]: {} owned by {}: {}",
        table.address,
        sdk.owner(),
        table.signature
    );
    Ok(table)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionPreview {
    pub tick_range: TickRange,
    pub base: PoolSide,
    pub base_amount: u64,
    pub other_amount_max: u64,
}

/// What a CLMM plan resolves to, computed without touching the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClmmPlanPreview {
    pub mint0: SolanaAddress,
    pub mint1: SolanaAddress,
    pub flipped: bool,
    /// mint1 per mint0, human units.
    pub initial_price: String,
    pub sqrt_price_x64: String,
    pub amm_config: SolanaAddress,
    pub tick_spacing: PoolTickSpacing,
    pub position: Option<PositionPreview>,
}

/// Offline counterpart of [`create_pool_and_open_position`], using the plan's
/// own decimals instead of on-chain mint data.
pub fn preview_clmm_plan(plan: &ClmmPoolPlan) -> Result<ClmmPlanPreview, SolanaProvisionError> {
    plan.validate()?;
    let amm_config = plan.amm_config()?;
    let ordered = order_plan(plan)?;
    let flipped = ordered.pair.is_flipped();
    let (decimals0, decimals1) = ordered.pair.order_amounts(plan.decimals_a, plan.decimals_b);

    let sqrt_price_x64 = initial_sqrt_price_x64(&ordered.initial_price, decimals0, decimals1)?;
    let position = match &plan.position {
        Some(position) => Some(PositionPreview {
            tick_range: position_ticks(
                position,
                flipped,
                decimals0,
                decimals1,
                amm_config.tick_spacing,
            )?,
            base: pool_side(position.base, flipped),
            base_amount: position.base_amount,
            other_amount_max: position.other_amount_max,
        }),
        None => None,
    };

    Ok(ClmmPlanPreview {
        mint0: ordered.pair.token0,
        mint1: ordered.pair.token1,
        flipped,
        initial_price: String::from(ordered.initial_price.clone()),
        sqrt_price_x64: sqrt_price_x64.to_string(),
        amm_config: amm_config.id,
        tick_spacing: amm_config.tick_spacing,
        position,
    })
}
