use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::{
    config::{ClmmPoolPlan, MarketPlan, Network, PlanBase, PositionPlan},
    tick_range::TickRange,
};

const OWNER: SolanaAddress = SolanaAddress::new([9; 32]);
const POOL_ID: SolanaAddress = SolanaAddress::new([7; 32]);
const TOKEN_PROGRAM: SolanaAddress = SolanaAddress::new([6; 32]);
// LOW sorts before HIGH
const LOW: SolanaAddress = SolanaAddress::new([1; 32]);
const HIGH: SolanaAddress = SolanaAddress::new([2; 32]);

#[derive(Debug, Clone, PartialEq)]
enum Call {
    CreateTokenAccounts(Vec<SolanaAddress>),
    CreatePool(CreatePoolRequest),
    OpenPosition(OpenPositionRequest),
    CreateMarket(MarketRequest),
    CreateLookupTable,
}

#[derive(Default)]
struct FakeState {
    pool: Option<ClmmPool>,
    missing_accounts: Vec<SolanaAddress>,
    calls: Vec<Call>,
}

struct FakeClmm {
    decimals: [(SolanaAddress, u8); 2],
    state: Mutex<FakeState>,
}

impl FakeClmm {
    fn new() -> Self {
        Self {
            decimals: [(LOW, 9), (HIGH, 9)],
            state: Mutex::new(FakeState::default()),
        }
    }

    fn with_decimals(mut self, low: u8, high: u8) -> Self {
        self.decimals = [(LOW, low), (HIGH, high)];
        self
    }

    fn with_existing_pool(self) -> Self {
        self.state.lock().unwrap().pool = Some(pool(1_u128 << 64));
        self
    }

    fn with_missing_accounts(self, mints: &[SolanaAddress]) -> Self {
        self.state.lock().unwrap().missing_accounts = mints.to_vec();
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn signature(&self, call: Call) -> Signature {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        Signature(format!("sig{}", state.calls.len()))
    }
}

fn pool(sqrt_price_x64: u128) -> ClmmPool {
    ClmmPool {
        id: POOL_ID,
        mint0: LOW,
        mint1: HIGH,
        amm_config: devnet_config().id,
        tick_spacing: PoolTickSpacing(10),
        sqrt_price_x64,
    }
}

fn devnet_config() -> AmmConfig {
    Network::SolanaDevnet.default_amm_config().unwrap()
}

#[async_trait]
impl ClmmSdk for FakeClmm {
    fn owner(&self) -> SolanaAddress {
        OWNER
    }

    async fn token_info(&self, mint: SolanaAddress) -> Result<TokenInfo, SdkError> {
        self.decimals
            .iter()
            .find(|(known, _)| *known == mint)
            .map(|(_, decimals)| TokenInfo {
                mint,
                decimals: *decimals,
                program_id: TOKEN_PROGRAM,
                symbol: None,
            })
            .ok_or(SdkError::AccountNotFound(mint))
    }

    async fn missing_token_accounts(
        &self,
        mints: &[SolanaAddress],
    ) -> Result<Vec<SolanaAddress>, SdkError> {
        let state = self.state.lock().unwrap();
        Ok(mints
            .iter()
            .filter(|mint| state.missing_accounts.contains(mint))
            .copied()
            .collect())
    }

    async fn create_token_accounts(
        &self,
        mints: &[SolanaAddress],
    ) -> Result<Signature, SdkError> {
        Ok(self.signature(Call::CreateTokenAccounts(mints.to_vec())))
    }

    async fn find_pool(
        &self,
        _program_id: SolanaAddress,
        _amm_config: &AmmConfig,
        mint0: SolanaAddress,
        mint1: SolanaAddress,
    ) -> Result<Option<ClmmPool>, SdkError> {
        assert!(mint0 < mint1, "pool lookups must use canonical order");
        Ok(self.state.lock().unwrap().pool.clone())
    }

    async fn create_pool(&self, request: CreatePoolRequest) -> Result<CreatedPool, SdkError> {
        let created = pool(request.sqrt_price_x64);
        let signature = self.signature(Call::CreatePool(request));
        self.state.lock().unwrap().pool = Some(created.clone());
        Ok(CreatedPool {
            pool: created,
            signature,
        })
    }

    async fn open_position_from_base(
        &self,
        request: OpenPositionRequest,
    ) -> Result<OpenedPosition, SdkError> {
        Ok(OpenedPosition {
            nft_mint: SolanaAddress::new([3; 32]),
            signature: self.signature(Call::OpenPosition(request)),
        })
    }

    async fn create_market(&self, request: MarketRequest) -> Result<CreatedMarket, SdkError> {
        let signature = self.signature(Call::CreateMarket(request));
        Ok(CreatedMarket {
            market_id: SolanaAddress::new([4; 32]),
            signatures: vec![signature],
        })
    }

    async fn create_lookup_table(&self) -> Result<CreatedLookupTable, SdkError> {
        Ok(CreatedLookupTable {
            address: SolanaAddress::new([5; 32]),
            signature: self.signature(Call::CreateLookupTable),
        })
    }
}

fn plan(mint_a: SolanaAddress, mint_b: SolanaAddress, initial_price: &str) -> ClmmPoolPlan {
    ClmmPoolPlan {
        network: Network::SolanaDevnet,
        mint_a,
        mint_b,
        initial_price: initial_price.parse().unwrap(),
        decimals_a: 9,
        decimals_b: 9,
        amm_config: None,
        program_id: None,
        position: Some(PositionPlan {
            price_lower: "0.5".parse().unwrap(),
            price_upper: "100".parse().unwrap(),
            base: PlanBase::TokenA,
            base_amount: 2_000_000,
            other_amount_max: 5_000_000,
            use_sol_balance: true,
            compute_budget: ComputeBudget::default(),
        }),
    }
}

mod create_pool {
    use super::*;

    #[tokio::test]
    async fn should_create_missing_pool_at_initial_price() {
        let sdk = FakeClmm::new();
        let outcome = create_clmm_pool(&sdk, &plan(LOW, HIGH, "0.5")).await.unwrap();

        assert_eq!(outcome.signature, Some(Signature("sig1".to_string())));
        assert!(!outcome.flipped);
        let calls = sdk.calls();
        let [Call::CreatePool(request)] = calls.as_slice() else {
            panic!("expected a single create_pool, got {calls:?}");
        };
        assert_eq!(request.mint0.mint, LOW);
        assert_eq!(request.mint1.mint, HIGH);
        assert_eq!(request.amm_config.tick_spacing, PoolTickSpacing(10));
        assert_eq!(
            request.program_id.to_string(),
            "devi51mZmdwUJGU9hjN27vEz64Gps7uUefqxg27EAtH"
        );
        // floor(sqrt(0.5) * 2^64)
        assert_eq!(request.sqrt_price_x64, 13043817825332782212);
    }

    #[tokio::test]
    async fn should_invert_initial_price_when_mints_are_reordered() {
        let sdk = FakeClmm::new();
        let outcome = create_clmm_pool(&sdk, &plan(HIGH, LOW, "0.5")).await.unwrap();

        assert!(outcome.flipped);
        let calls = sdk.calls();
        let [Call::CreatePool(request)] = calls.as_slice() else {
            panic!("expected a single create_pool, got {calls:?}");
        };
        assert_eq!(request.mint0.mint, LOW);
        // 0.5 LOW per HIGH is 2 HIGH per LOW
        assert_eq!(request.initial_price.to_f64(), 2.0);
        assert_eq!(request.sqrt_price_x64, 26087635650665564424);
    }

    #[tokio::test]
    async fn should_scale_initial_price_by_decimals() {
        let sdk = FakeClmm::new().with_decimals(9, 6);
        create_clmm_pool(&sdk, &plan(LOW, HIGH, "2")).await.unwrap();
        let calls = sdk.calls();
        let [Call::CreatePool(request)] = calls.as_slice() else {
            panic!("expected a single create_pool, got {calls:?}");
        };
        // 2 human -> 0.002 in base units
        assert_eq!(request.sqrt_price_x64, 824963474247118971);
    }

    #[tokio::test]
    async fn should_reuse_existing_pool() {
        let sdk = FakeClmm::new().with_existing_pool();
        let outcome = create_clmm_pool(&sdk, &plan(LOW, HIGH, "0.5")).await.unwrap();
        assert_eq!(outcome.signature, None);
        assert_eq!(outcome.pool.id, POOL_ID);
        assert!(sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn should_fail_for_unknown_mint_before_sending() {
        let sdk = FakeClmm::new();
        let unknown = SolanaAddress::new([8; 32]);
        let result = create_clmm_pool(&sdk, &plan(LOW, unknown, "1")).await;
        assert!(matches!(
            result,
            Err(SolanaProvisionError::Sdk(SdkError::AccountNotFound(mint))) if mint == unknown
        ));
        assert!(sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn should_reject_identical_mints() {
        let sdk = FakeClmm::new();
        let result = create_clmm_pool(&sdk, &plan(LOW, LOW, "1")).await;
        assert!(matches!(result, Err(SolanaProvisionError::Config(_))));
    }
}

mod open_position {
    use super::*;

    #[tokio::test]
    async fn should_create_pool_accounts_and_position_in_order() {
        let sdk = FakeClmm::new().with_missing_accounts(&[HIGH]);
        let outcome = create_pool_and_open_position(&sdk, &plan(LOW, HIGH, "0.5"))
            .await
            .unwrap();

        assert_eq!(
            outcome.tick_range,
            TickRange {
                tick_lower: -6940,
                tick_upper: 46060
            }
        );
        assert_eq!(outcome.base, PoolSide::MintA);
        assert_eq!(outcome.token_accounts, Some(Signature("sig2".to_string())));

        let calls = sdk.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(calls[0], Call::CreatePool(_)));
        assert_eq!(calls[1], Call::CreateTokenAccounts(vec![HIGH]));
        let Call::OpenPosition(request) = &calls[2] else {
            panic!("expected open_position, got {:?}", calls[2]);
        };
        assert_eq!(request.base_amount, 2_000_000);
        assert_eq!(request.other_amount_max, 5_000_000);
        assert_eq!(request.compute_budget.units, 600_000);
        assert_eq!(request.compute_budget.micro_lamports, 100_000);
        assert_eq!(request.pool.id, POOL_ID);
    }

    #[tokio::test]
    async fn should_mirror_ticks_and_base_when_mints_are_reordered() {
        let sdk = FakeClmm::new().with_existing_pool();
        let outcome = create_pool_and_open_position(&sdk, &plan(HIGH, LOW, "0.5"))
            .await
            .unwrap();

        assert_eq!(
            outcome.tick_range,
            TickRange {
                tick_lower: -46060,
                tick_upper: 6940
            }
        );
        // the plan's token A is the pool's mint B
        assert_eq!(outcome.base, PoolSide::MintB);
        assert_eq!(outcome.token_accounts, None);
        assert_eq!(sdk.calls().len(), 1);
    }

    #[tokio::test]
    async fn should_require_a_position() {
        let sdk = FakeClmm::new();
        let mut plan = plan(LOW, HIGH, "0.5");
        plan.position = None;
        let result = create_pool_and_open_position(&sdk, &plan).await;
        assert!(matches!(result, Err(SolanaProvisionError::MissingPosition)));
        assert!(sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn should_reject_bad_bounds_before_creating_the_pool() {
        let sdk = FakeClmm::new();
        let mut plan = plan(LOW, HIGH, "0.5");
        if let Some(position) = plan.position.as_mut() {
            position.price_upper = "0.25".parse().unwrap();
        }
        let result = create_pool_and_open_position(&sdk, &plan).await;
        assert!(result.is_err());
        assert!(sdk.calls().is_empty());
    }
}

mod market_and_lookup_table {
    use super::*;

    fn market_plan() -> MarketPlan {
        serde_json::from_value(serde_json::json!({
            "network": "solana-devnet",
            "base_mint": LOW,
            "quote_mint": HIGH,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn should_create_market_on_openbook() {
        let sdk = FakeClmm::new();
        let market = create_market(&sdk, &market_plan()).await.unwrap();
        assert_eq!(market.signatures.len(), 1);

        let calls = sdk.calls();
        let [Call::CreateMarket(request)] = calls.as_slice() else {
            panic!("expected create_market, got {calls:?}");
        };
        assert_eq!(
            request.program_id.to_string(),
            "EoTcMgcDRTJVZDMZWBoU6rhYHZfkNTVEAfz3uUJRcYGj"
        );
        assert_eq!(request.lot_size, 1.0);
        assert_eq!(request.tick_size, 0.01);
        assert_eq!(request.request_queue_space, 5132);
    }

    #[tokio::test]
    async fn should_not_create_market_without_openbook_deployment() {
        let sdk = FakeClmm::new();
        let mut plan = market_plan();
        plan.network = Network::SolanaTestnet;
        assert!(matches!(
            create_market(&sdk, &plan).await,
            Err(SolanaProvisionError::Config(_))
        ));
        assert!(sdk.calls().is_empty());
    }

    #[tokio::test]
    async fn should_create_lookup_table() {
        let sdk = FakeClmm::new();
        let table = create_lookup_table(&sdk).await.unwrap();
        assert_eq!(table.address, SolanaAddress::new([5; 32]));
        assert_eq!(sdk.calls(), vec![Call::CreateLookupTable]);
    }
}

mod preview {
    use super::*;

    #[test]
    fn should_preview_plan_offline() {
        let preview = preview_clmm_plan(&plan(HIGH, LOW, "0.5")).unwrap();
        assert_eq!(preview.mint0, LOW);
        assert!(preview.flipped);
        assert_eq!(preview.initial_price, "2");
        assert_eq!(preview.sqrt_price_x64, "26087635650665564424");
        assert_eq!(preview.tick_spacing, PoolTickSpacing(10));
        let position = preview.position.unwrap();
        assert_eq!(position.base, PoolSide::MintB);
        assert_eq!(
            position.tick_range,
            TickRange {
                tick_lower: -46060,
                tick_upper: 6940
            }
        );

        let json = serde_json::to_value(preview_clmm_plan(&plan(LOW, HIGH, "0.5")).unwrap())
            .unwrap();
        assert_eq!(json["initial_price"], "0.5");
        assert_eq!(json["position"]["base"], "MintA");
    }

    #[test]
    fn should_require_a_known_amm_config() {
        let mut plan = plan(LOW, HIGH, "1");
        plan.network = Network::SolanaMainnet;
        assert!(matches!(
            preview_clmm_plan(&plan),
            Err(SolanaProvisionError::Config(_))
        ));
        plan.amm_config = Some(devnet_config());
        assert!(preview_clmm_plan(&plan).is_ok());
    }
}
