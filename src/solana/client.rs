use std::fmt;

use async_trait::async_trait;
use ic_canister_log::log;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    account::Account,
    address_lookup_table::instruction::create_lookup_table,
    commitment_config::CommitmentConfig,
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    system_instruction,
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token::state::{Account as TokenAccount, Mint};

use super::{
    instructions::{
        create_pool_instruction, decode_pool_state, initialize_market_instruction,
        market_lot_sizes, open_position_v2_instruction, pool_address, tick_array_start_index,
        vault_signer,
        CreatePoolKeys, MarketKeys, OpenPositionArgs, OpenPositionKeys, MARKET_ACCOUNT_SIZE,
    },
    AmmConfig, ClmmPool, ClmmSdk, ComputeBudget, CreatePoolRequest, CreatedLookupTable,
    CreatedMarket, CreatedPool, MarketRequest, OpenPositionRequest, OpenedPosition, PoolSide,
    SdkError, Signature, SolanaAddress, TokenInfo,
};
use crate::{logs::DEBUG, tick_range::PoolTickSpacing};

fn rpc_error(err: impl fmt::Display) -> SdkError {
    SdkError::Rpc(err.to_string())
}

fn decode_error(err: impl fmt::Display) -> SdkError {
    SdkError::Decode(err.to_string())
}

fn build_error(err: impl fmt::Display) -> SdkError {
    SdkError::Transaction(err.to_string())
}

fn compute_budget_instructions(budget: ComputeBudget) -> [Instruction; 2] {
    [
        ComputeBudgetInstruction::set_compute_unit_limit(budget.units),
        ComputeBudgetInstruction::set_compute_unit_price(budget.micro_lamports),
    ]
}

/// [`ClmmSdk`] over a cluster's JSON-RPC API, paying and signing with one keypair.
pub struct RpcClmmClient {
    rpc: RpcClient,
    payer: Keypair,
}

impl RpcClmmClient {
    pub fn connect(rpc_url: &str, payer: Keypair) -> Self {
        let rpc = RpcClient::new_with_commitment(rpc_url.to_string(), CommitmentConfig::confirmed());
        log!(DEBUG, "[connect]: payer {} on {rpc_url}", payer.pubkey());
        Self { rpc, payer }
    }

    async fn account(&self, address: &Pubkey) -> Result<Option<Account>, SdkError> {
        let response = self
            .rpc
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map_err(rpc_error)?;
        Ok(response.value)
    }

    /// Token program owning each mint, in the order given.
    async fn mint_programs(&self, mints: &[Pubkey]) -> Result<Vec<Pubkey>, SdkError> {
        let accounts = self.rpc.get_multiple_accounts(mints).await.map_err(rpc_error)?;
        mints
            .iter()
            .zip(accounts)
            .map(|(mint, account)| {
                account
                    .map(|account| account.owner)
                    .ok_or(SdkError::AccountNotFound(SolanaAddress::from(*mint)))
            })
            .collect()
    }

    fn token_account(&self, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
        get_associated_token_address_with_program_id(&self.payer.pubkey(), mint, token_program)
    }

    async fn rent(&self, space: u64) -> Result<u64, SdkError> {
        self.rpc
            .get_minimum_balance_for_rent_exemption(space as usize)
            .await
            .map_err(rpc_error)
    }

    async fn send(
        &self,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
    ) -> Result<Signature, SdkError> {
        let blockhash = self.rpc.get_latest_blockhash().await.map_err(rpc_error)?;
        let mut signers = vec![&self.payer];
        signers.extend_from_slice(extra_signers);
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            signers.as_slice(),
            blockhash,
        );
        let signature = self
            .rpc
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(|e| SdkError::Transaction(e.to_string()))?;
        log!(
            DEBUG,
            "[send]: {} instructions confirmed: {signature}",
            instructions.len()
        );
        Ok(Signature(signature.to_string()))
    }

    fn create_account(&self, account: &Keypair, lamports: u64, space: u64, owner: &Pubkey) -> Instruction {
        system_instruction::create_account(
            &self.payer.pubkey(),
            &account.pubkey(),
            lamports,
            space,
            owner,
        )
    }

    /// Wraps `lamports` of SOL into the payer's native mint account.
    fn wrap_sol(&self, lamports: u64) -> Result<Vec<Instruction>, SdkError> {
        let payer = self.payer.pubkey();
        let native = spl_token::native_mint::ID;
        let account = self.token_account(&native, &spl_token::ID);
        Ok(vec![
            create_associated_token_account_idempotent(&payer, &payer, &native, &spl_token::ID),
            system_instruction::transfer(&payer, &account, lamports),
            spl_token::instruction::sync_native(&spl_token::ID, &account).map_err(build_error)?,
        ])
    }

    /// The CLMM program that owns `pool`.
    async fn program_of(&self, pool: &ClmmPool) -> Result<Pubkey, SdkError> {
        self.account(&pool.id.into())
            .await?
            .map(|account| account.owner)
            .ok_or(SdkError::AccountNotFound(pool.id))
    }
}

#[async_trait]
impl ClmmSdk for RpcClmmClient {
    fn owner(&self) -> SolanaAddress {
        self.payer.pubkey().into()
    }

    async fn token_info(&self, mint: SolanaAddress) -> Result<TokenInfo, SdkError> {
        let account = self
            .account(&mint.into())
            .await?
            .ok_or(SdkError::AccountNotFound(mint))?;
        if account.data.len() < Mint::LEN {
            return Err(SdkError::Decode(format!("{mint} is not a mint")));
        }
        let state = Mint::unpack_from_slice(&account.data[..Mint::LEN]).map_err(decode_error)?;
        Ok(TokenInfo {
            mint,
            decimals: state.decimals,
            program_id: account.owner.into(),
            symbol: None,
        })
    }

    async fn missing_token_accounts(
        &self,
        mints: &[SolanaAddress],
    ) -> Result<Vec<SolanaAddress>, SdkError> {
        let keys: Vec<Pubkey> = mints.iter().copied().map(Pubkey::from).collect();
        let programs = self.mint_programs(&keys).await?;
        let token_accounts: Vec<Pubkey> = keys
            .iter()
            .zip(&programs)
            .map(|(mint, program)| self.token_account(mint, program))
            .collect();
        let accounts = self
            .rpc
            .get_multiple_accounts(&token_accounts)
            .await
            .map_err(rpc_error)?;
        Ok(mints
            .iter()
            .zip(accounts)
            .filter(|(_, account)| account.is_none())
            .map(|(mint, _)| *mint)
            .collect())
    }

    async fn create_token_accounts(
        &self,
        mints: &[SolanaAddress],
    ) -> Result<Signature, SdkError> {
        let keys: Vec<Pubkey> = mints.iter().copied().map(Pubkey::from).collect();
        let programs = self.mint_programs(&keys).await?;
        let payer = self.payer.pubkey();
        let instructions: Vec<Instruction> = keys
            .iter()
            .zip(&programs)
            .map(|(mint, program)| {
                create_associated_token_account_idempotent(&payer, &payer, mint, program)
            })
            .collect();
        self.send(&instructions, &[]).await
    }

    async fn find_pool(
        &self,
        program_id: SolanaAddress,
        amm_config: &AmmConfig,
        mint0: SolanaAddress,
        mint1: SolanaAddress,
    ) -> Result<Option<ClmmPool>, SdkError> {
        let id = pool_address(
            &program_id.into(),
            &amm_config.id.into(),
            &mint0.into(),
            &mint1.into(),
        );
        let Some(account) = self.account(&id).await? else {
            log!(DEBUG, "[find_pool]: no pool at {id}");
            return Ok(None);
        };
        let state = decode_pool_state(&account.data).map_err(decode_error)?;
        Ok(Some(ClmmPool {
            id: id.into(),
            mint0: state.mint0.into(),
            mint1: state.mint1.into(),
            amm_config: state.amm_config.into(),
            tick_spacing: PoolTickSpacing(i32::from(state.tick_spacing)),
            sqrt_price_x64: state.sqrt_price_x64,
        }))
    }

    async fn create_pool(&self, request: CreatePoolRequest) -> Result<CreatedPool, SdkError> {
        let keys = CreatePoolKeys {
            program_id: request.program_id.into(),
            creator: self.payer.pubkey(),
            amm_config: request.amm_config.id.into(),
            mint0: request.mint0.mint.into(),
            mint1: request.mint1.mint.into(),
            token_program0: request.mint0.program_id.into(),
            token_program1: request.mint1.program_id.into(),
        };
        let instruction = create_pool_instruction(&keys, request.sqrt_price_x64, 0);
        let signature = self.send(&[instruction], &[]).await?;
        Ok(CreatedPool {
            pool: ClmmPool {
                id: keys.pool().into(),
                mint0: request.mint0.mint,
                mint1: request.mint1.mint,
                amm_config: request.amm_config.id,
                tick_spacing: request.amm_config.tick_spacing,
                sqrt_price_x64: request.sqrt_price_x64,
            },
            signature,
        })
    }

    async fn open_position_from_base(
        &self,
        request: OpenPositionRequest,
    ) -> Result<OpenedPosition, SdkError> {
        let pool = &request.pool;
        let spacing = u16::try_from(pool.tick_spacing.0)
            .map_err(|_e| SdkError::Decode(format!("tick spacing {}", pool.tick_spacing.0)))?;
        let (mint0, mint1) = (Pubkey::from(pool.mint0), Pubkey::from(pool.mint1));
        let (program0, program1) = match self.mint_programs(&[mint0, mint1]).await?.as_slice() {
            [program0, program1] => (*program0, *program1),
            _ => return Err(SdkError::Decode("pool mints".to_string())),
        };

        let (amount_0_max, amount_1_max) = match request.base {
            PoolSide::MintA => (request.base_amount, request.other_amount_max),
            PoolSide::MintB => (request.other_amount_max, request.base_amount),
        };
        let args = OpenPositionArgs {
            tick_lower: request.tick_lower,
            tick_upper: request.tick_upper,
            tick_array_lower_start: tick_array_start_index(request.tick_lower, spacing),
            tick_array_upper_start: tick_array_start_index(request.tick_upper, spacing),
            liquidity: 0,
            amount_0_max,
            amount_1_max,
            with_metadata: true,
            base_flag: Some(request.base == PoolSide::MintA),
        };

        let nft_mint = Keypair::new();
        let keys = OpenPositionKeys {
            program_id: self.program_of(pool).await?,
            payer: self.payer.pubkey(),
            nft_mint: nft_mint.pubkey(),
            pool: pool.id.into(),
            mint0,
            mint1,
            token_account0: self.token_account(&mint0, &program0),
            token_account1: self.token_account(&mint1, &program1),
        };

        let mut instructions = compute_budget_instructions(request.compute_budget).to_vec();
        if request.use_sol_balance {
            for (mint, amount) in [(mint0, amount_0_max), (mint1, amount_1_max)] {
                if mint == spl_token::native_mint::ID {
                    instructions.extend(self.wrap_sol(amount)?);
                }
            }
        }
        instructions.push(open_position_v2_instruction(&keys, &args));

        let signature = self.send(&instructions, &[&nft_mint]).await?;
        Ok(OpenedPosition {
            nft_mint: nft_mint.pubkey().into(),
            signature,
        })
    }

    async fn create_market(&self, request: MarketRequest) -> Result<CreatedMarket, SdkError> {
        let dex_program = Pubkey::from(request.program_id);
        let (base_lot, quote_lot) = market_lot_sizes(
            request.lot_size,
            request.tick_size,
            request.base_decimals,
            request.quote_decimals,
        )
        .map_err(decode_error)?;

        let market = Keypair::new();
        let request_queue = Keypair::new();
        let event_queue = Keypair::new();
        let bids = Keypair::new();
        let asks = Keypair::new();
        let base_vault = Keypair::new();
        let quote_vault = Keypair::new();
        let (vault_owner, nonce) = vault_signer(&market.pubkey(), &dex_program).map_err(decode_error)?;

        let vault_space = TokenAccount::LEN as u64;
        let vault_rent = self.rent(vault_space).await?;
        let market_rent = self.rent(MARKET_ACCOUNT_SIZE).await?;
        let request_queue_rent = self.rent(request.request_queue_space).await?;
        let event_queue_rent = self.rent(request.event_queue_space).await?;
        let orderbook_rent = self.rent(request.orderbook_queue_space).await?;

        let needed = 2 * vault_rent + market_rent + request_queue_rent + event_queue_rent + 2 * orderbook_rent;
        let available = self
            .rpc
            .get_balance(&self.payer.pubkey())
            .await
            .map_err(rpc_error)?;
        if available < needed {
            return Err(SdkError::InsufficientFunds { needed, available });
        }

        let base_mint = Pubkey::from(request.base_mint);
        let quote_mint = Pubkey::from(request.quote_mint);
        let mut vault_instructions = vec![
            self.create_account(&base_vault, vault_rent, vault_space, &spl_token::ID),
            self.create_account(&quote_vault, vault_rent, vault_space, &spl_token::ID),
        ];
        for (vault, mint) in [(&base_vault, &base_mint), (&quote_vault, &quote_mint)] {
            vault_instructions.push(
                spl_token::instruction::initialize_account(
                    &spl_token::ID,
                    &vault.pubkey(),
                    mint,
                    &vault_owner,
                )
                .map_err(build_error)?,
            );
        }
        let vaults = self.send(&vault_instructions, &[&base_vault, &quote_vault]).await?;

        let keys = MarketKeys {
            dex_program,
            market: market.pubkey(),
            request_queue: request_queue.pubkey(),
            event_queue: event_queue.pubkey(),
            bids: bids.pubkey(),
            asks: asks.pubkey(),
            base_vault: base_vault.pubkey(),
            quote_vault: quote_vault.pubkey(),
            base_mint,
            quote_mint,
        };
        let market_instructions = vec![
            self.create_account(&market, market_rent, MARKET_ACCOUNT_SIZE, &dex_program),
            self.create_account(
                &request_queue,
                request_queue_rent,
                request.request_queue_space,
                &dex_program,
            ),
            self.create_account(
                &event_queue,
                event_queue_rent,
                request.event_queue_space,
                &dex_program,
            ),
            self.create_account(&bids, orderbook_rent, request.orderbook_queue_space, &dex_program),
            self.create_account(&asks, orderbook_rent, request.orderbook_queue_space, &dex_program),
            initialize_market_instruction(&keys, base_lot, quote_lot, nonce),
        ];
        let initialized = self
            .send(
                &market_instructions,
                &[&market, &request_queue, &event_queue, &bids, &asks],
            )
            .await?;

        Ok(CreatedMarket {
            market_id: market.pubkey().into(),
            signatures: vec![vaults, initialized],
        })
    }

    async fn create_lookup_table(&self) -> Result<CreatedLookupTable, SdkError> {
        let recent_slot = self
            .rpc
            .get_slot_with_commitment(CommitmentConfig::finalized())
            .await
            .map_err(rpc_error)?;
        let payer = self.payer.pubkey();
        let (instruction, address) = create_lookup_table(payer, payer, recent_slot);
        let signature = self.send(&[instruction], &[]).await?;
        Ok(CreatedLookupTable {
            address: address.into(),
            signature,
        })
    }
}
