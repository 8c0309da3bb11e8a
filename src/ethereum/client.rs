use std::fmt;

use alloy::{
    network::EthereumWallet,
    primitives::{
        aliases::{I24, U160, U24},
        Address, B256, U256,
    },
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::{coins_bip39::English, MnemonicBuilder},
    sol,
};
use async_trait::async_trait;
use ic_canister_log::log;

use super::{ClientError, MintRequest, MintedPosition, PositionSummary, Slot0, UniswapV3Api};
use crate::{
    config::{Mnemonic, UniswapV3Deployment},
    logs::DEBUG,
    tick_range::PoolFee,
};

sol! {
    #[sol(rpc)]
    interface IERC20Minimal {
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface IUniswapV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
        function createPool(address tokenA, address tokenB, uint24 fee) external returns (address pool);
    }

    #[sol(rpc)]
    interface IUniswapV3Pool {
        function slot0() external view returns (
            uint160 sqrtPriceX96,
            int24 tick,
            uint16 observationIndex,
            uint16 observationCardinality,
            uint16 observationCardinalityNext,
            uint8 feeProtocol,
            bool unlocked
        );
        function initialize(uint160 sqrtPriceX96) external;
    }

    #[sol(rpc)]
    interface INonfungiblePositionManager {
        struct MintParams {
            address token0;
            address token1;
            uint24 fee;
            int24 tickLower;
            int24 tickUpper;
            uint256 amount0Desired;
            uint256 amount1Desired;
            uint256 amount0Min;
            uint256 amount1Min;
            address recipient;
            uint256 deadline;
        }

        event IncreaseLiquidity(uint256 indexed tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);

        function mint(MintParams calldata params) external payable returns (
            uint256 tokenId,
            uint128 liquidity,
            uint256 amount0,
            uint256 amount1
        );
        function balanceOf(address owner) external view returns (uint256);
        function tokenOfOwnerByIndex(address owner, uint256 index) external view returns (uint256);
        function positions(uint256 tokenId) external view returns (
            uint96 nonce,
            address operator,
            address token0,
            address token1,
            uint24 fee,
            int24 tickLower,
            int24 tickUpper,
            uint128 liquidity,
            uint256 feeGrowthInside0LastX128,
            uint256 feeGrowthInside1LastX128,
            uint128 tokensOwed0,
            uint128 tokensOwed1
        );
    }
}

fn rpc_error(err: impl fmt::Display) -> ClientError {
    ClientError::Rpc(err.to_string())
}

fn decode_error(err: impl fmt::Display) -> ClientError {
    ClientError::Decode(err.to_string())
}

fn to_u24(fee: PoolFee) -> Result<U24, ClientError> {
    U24::try_from(fee.0).map_err(decode_error)
}

fn to_i24(tick: i32) -> Result<I24, ClientError> {
    I24::try_from(tick).map_err(decode_error)
}

fn from_i24(tick: I24) -> Result<i32, ClientError> {
    i32::try_from(tick).map_err(decode_error)
}

fn from_u24(fee: U24) -> Result<PoolFee, ClientError> {
    u32::try_from(fee).map(PoolFee).map_err(decode_error)
}

fn to_u160(value: U256) -> Result<U160, ClientError> {
    U160::checked_from_uint(value)
        .ok_or_else(|| ClientError::Decode(format!("{value} does not fit in uint160")))
}

fn ensure_success(receipt: &TransactionReceipt) -> Result<B256, ClientError> {
    if !receipt.status() {
        return Err(ClientError::Reverted {
            tx_hash: receipt.transaction_hash,
        });
    }
    Ok(receipt.transaction_hash)
}

/// [`UniswapV3Api`] over JSON-RPC, signing with the first account of a mnemonic.
pub struct AlloyUniswapV3 {
    provider: DynProvider,
    signer: Address,
    deployment: UniswapV3Deployment,
}

impl AlloyUniswapV3 {
    pub fn connect(
        rpc_url: &str,
        mnemonic: &Mnemonic,
        deployment: UniswapV3Deployment,
    ) -> Result<Self, ClientError> {
        let signer = MnemonicBuilder::<English>::default()
            .phrase(mnemonic.expose())
            .index(0)
            .map_err(|e| ClientError::Signer(e.to_string()))?
            .build()
            .map_err(|e| ClientError::Signer(e.to_string()))?;
        let signer_address = signer.address();
        let url = rpc_url
            .parse::<alloy::transports::http::reqwest::Url>()
            .map_err(|e| ClientError::Rpc(format!("invalid RPC url: {e}")))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        log!(
            DEBUG,
            "[connect]: signer {signer_address}, factory {}, position manager {}",
            deployment.factory,
            deployment.position_manager
        );

        Ok(Self {
            provider,
            signer: signer_address,
            deployment,
        })
    }
}

#[async_trait]
impl UniswapV3Api for AlloyUniswapV3 {
    fn signer_address(&self) -> Address {
        self.signer
    }

    fn position_manager(&self) -> Address {
        self.deployment.position_manager
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, ClientError> {
        IERC20Minimal::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(rpc_error)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<B256, ClientError> {
        let receipt = IERC20Minimal::new(token, self.provider.clone())
            .approve(spender, amount)
            .send()
            .await
            .map_err(rpc_error)?
            .get_receipt()
            .await
            .map_err(rpc_error)?;
        ensure_success(&receipt)
    }

    async fn get_pool(
        &self,
        token0: Address,
        token1: Address,
        fee: PoolFee,
    ) -> Result<Address, ClientError> {
        IUniswapV3Factory::new(self.deployment.factory, self.provider.clone())
            .getPool(token0, token1, to_u24(fee)?)
            .call()
            .await
            .map_err(rpc_error)
    }

    async fn create_pool(
        &self,
        token0: Address,
        token1: Address,
        fee: PoolFee,
    ) -> Result<B256, ClientError> {
        let receipt = IUniswapV3Factory::new(self.deployment.factory, self.provider.clone())
            .createPool(token0, token1, to_u24(fee)?)
            .send()
            .await
            .map_err(rpc_error)?
            .get_receipt()
            .await
            .map_err(rpc_error)?;
        ensure_success(&receipt)
    }

    async fn slot0(&self, pool: Address) -> Result<Slot0, ClientError> {
        let slot0 = IUniswapV3Pool::new(pool, self.provider.clone())
            .slot0()
            .call()
            .await
            .map_err(rpc_error)?;
        Ok(Slot0 {
            sqrt_price_x96: U256::from(slot0.sqrtPriceX96),
            tick: from_i24(slot0.tick)?,
        })
    }

    async fn initialize(&self, pool: Address, sqrt_price_x96: U256) -> Result<B256, ClientError> {
        let sqrt_price_x96 = to_u160(sqrt_price_x96)?;
        let receipt = IUniswapV3Pool::new(pool, self.provider.clone())
            .initialize(sqrt_price_x96)
            .send()
            .await
            .map_err(rpc_error)?
            .get_receipt()
            .await
            .map_err(rpc_error)?;
        ensure_success(&receipt)
    }

    async fn mint(&self, request: MintRequest) -> Result<MintedPosition, ClientError> {
        let params = INonfungiblePositionManager::MintParams {
            token0: request.token0,
            token1: request.token1,
            fee: to_u24(request.fee)?,
            tickLower: to_i24(request.tick_lower)?,
            tickUpper: to_i24(request.tick_upper)?,
            amount0Desired: request.amount0_desired,
            amount1Desired: request.amount1_desired,
            amount0Min: request.amount0_min,
            amount1Min: request.amount1_min,
            recipient: request.recipient,
            deadline: request.deadline,
        };
        let receipt = INonfungiblePositionManager::new(
            self.deployment.position_manager,
            self.provider.clone(),
        )
        .mint(params)
        .send()
        .await
        .map_err(rpc_error)?
        .get_receipt()
        .await
        .map_err(rpc_error)?;
        let tx_hash = ensure_success(&receipt)?;

        let increase = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.address() == self.deployment.position_manager)
            .find_map(|log| {
                log.log_decode::<INonfungiblePositionManager::IncreaseLiquidity>()
                    .ok()
            });
        if increase.is_none() {
            log!(DEBUG, "[mint]: no IncreaseLiquidity log in receipt {tx_hash}");
        }

        Ok(MintedPosition {
            tx_hash,
            token_id: increase.as_ref().map(|log| log.inner.data.tokenId),
            liquidity: increase.as_ref().map(|log| log.inner.data.liquidity),
        })
    }

    async fn position_count(&self, owner: Address) -> Result<U256, ClientError> {
        INonfungiblePositionManager::new(self.deployment.position_manager, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(rpc_error)
    }

    async fn token_of_owner_by_index(
        &self,
        owner: Address,
        index: U256,
    ) -> Result<U256, ClientError> {
        INonfungiblePositionManager::new(self.deployment.position_manager, self.provider.clone())
            .tokenOfOwnerByIndex(owner, index)
            .call()
            .await
            .map_err(rpc_error)
    }

    async fn position(&self, token_id: U256) -> Result<PositionSummary, ClientError> {
        let position = INonfungiblePositionManager::new(
            self.deployment.position_manager,
            self.provider.clone(),
        )
        .positions(token_id)
        .call()
        .await
        .map_err(rpc_error)?;

        Ok(PositionSummary {
            token_id,
            token0: position.token0,
            token1: position.token1,
            fee: from_u24(position.fee)?,
            tick_lower: from_i24(position.tickLower)?,
            tick_upper: from_i24(position.tickUpper)?,
            liquidity: position.liquidity,
        })
    }
}
