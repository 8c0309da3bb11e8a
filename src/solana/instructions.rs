//! Account addresses, instruction data and account layouts for the CLMM
//! program and the OpenBook (serum v3) dex. Nothing here talks to a cluster.

use solana_sdk::{
    hash::hashv,
    instruction::{AccountMeta, Instruction},
    pubkey,
    pubkey::Pubkey,
    system_program, sysvar,
};

pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
pub const METADATA_PROGRAM_ID: Pubkey = pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub const POOL_SEED: &[u8] = b"pool";
pub const POOL_VAULT_SEED: &[u8] = b"pool_vault";
pub const OBSERVATION_SEED: &[u8] = b"observation";
pub const TICK_ARRAY_SEED: &[u8] = b"tick_array";
pub const BITMAP_EXTENSION_SEED: &[u8] = b"pool_tick_array_bitmap_extension";
pub const POSITION_SEED: &[u8] = b"position";
pub const METADATA_SEED: &[u8] = b"metadata";

/// Ticks tracked by one tick array account, in units of tick spacing.
pub const TICK_ARRAY_SIZE: i32 = 60;

pub const MARKET_ACCOUNT_SIZE: u64 = 388;
const PC_DUST_THRESHOLD: u64 = 100;
const MAX_VAULT_SIGNER_NONCE: u64 = 255;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("account data is {actual} bytes, expected at least {expected}")]
    TooShort { expected: usize, actual: usize },
    #[error("account is not a {0}")]
    WrongDiscriminator(&'static str),
    #[error("lot size {0} rounds to zero or overflows")]
    BadLotSize(f64),
    #[error("no vault signer nonce for market {0}")]
    NoVaultSignerNonce(Pubkey),
}

/// First eight bytes of `sha256("global:<name>")`.
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    discriminator("global:", name)
}

/// First eight bytes of `sha256("account:<name>")`.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    discriminator("account:", name)
}

fn discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let hash = hashv(&[namespace.as_bytes(), name.as_bytes()]).to_bytes();
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash[..8]);
    out
}

pub fn pool_address(
    program_id: &Pubkey,
    amm_config: &Pubkey,
    mint0: &Pubkey,
    mint1: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[POOL_SEED, amm_config.as_ref(), mint0.as_ref(), mint1.as_ref()],
        program_id,
    )
    .0
}

pub fn pool_vault_address(program_id: &Pubkey, pool: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[POOL_VAULT_SEED, pool.as_ref(), mint.as_ref()], program_id).0
}

pub fn observation_address(program_id: &Pubkey, pool: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[OBSERVATION_SEED, pool.as_ref()], program_id).0
}

pub fn bitmap_extension_address(program_id: &Pubkey, pool: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[BITMAP_EXTENSION_SEED, pool.as_ref()], program_id).0
}

pub fn tick_array_address(program_id: &Pubkey, pool: &Pubkey, start_index: i32) -> Pubkey {
    Pubkey::find_program_address(
        &[TICK_ARRAY_SEED, pool.as_ref(), &start_index.to_be_bytes()],
        program_id,
    )
    .0
}

pub fn personal_position_address(program_id: &Pubkey, nft_mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[POSITION_SEED, nft_mint.as_ref()], program_id).0
}

pub fn protocol_position_address(
    program_id: &Pubkey,
    pool: &Pubkey,
    tick_lower: i32,
    tick_upper: i32,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            POSITION_SEED,
            pool.as_ref(),
            &tick_lower.to_be_bytes(),
            &tick_upper.to_be_bytes(),
        ],
        program_id,
    )
    .0
}

pub fn metadata_address(nft_mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[METADATA_SEED, METADATA_PROGRAM_ID.as_ref(), nft_mint.as_ref()],
        &METADATA_PROGRAM_ID,
    )
    .0
}

/// Start tick of the tick array holding `tick`. Rounds toward negative
/// infinity so that negative ticks land in the array below zero.
pub fn tick_array_start_index(tick: i32, tick_spacing: u16) -> i32 {
    let ticks_in_array = i32::from(tick_spacing) * TICK_ARRAY_SIZE;
    tick.div_euclid(ticks_in_array) * ticks_in_array
}

pub fn create_pool_data(sqrt_price_x64: u128, open_time: u64) -> Vec<u8> {
    let mut data = instruction_discriminator("create_pool").to_vec();
    data.extend_from_slice(&sqrt_price_x64.to_le_bytes());
    data.extend_from_slice(&open_time.to_le_bytes());
    data
}

/// Keys a `create_pool` instruction touches besides the derived ones.
#[derive(Debug, Clone, Copy)]
pub struct CreatePoolKeys {
    pub program_id: Pubkey,
    pub creator: Pubkey,
    pub amm_config: Pubkey,
    pub mint0: Pubkey,
    pub mint1: Pubkey,
    pub token_program0: Pubkey,
    pub token_program1: Pubkey,
}

impl CreatePoolKeys {
    pub fn pool(&self) -> Pubkey {
        pool_address(&self.program_id, &self.amm_config, &self.mint0, &self.mint1)
    }
}

pub fn create_pool_instruction(
    keys: &CreatePoolKeys,
    sqrt_price_x64: u128,
    open_time: u64,
) -> Instruction {
    let program_id = keys.program_id;
    let pool = keys.pool();
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(keys.creator, true),
            AccountMeta::new_readonly(keys.amm_config, false),
            AccountMeta::new(pool, false),
            AccountMeta::new_readonly(keys.mint0, false),
            AccountMeta::new_readonly(keys.mint1, false),
            AccountMeta::new(pool_vault_address(&program_id, &pool, &keys.mint0), false),
            AccountMeta::new(pool_vault_address(&program_id, &pool, &keys.mint1), false),
            AccountMeta::new(observation_address(&program_id, &pool), false),
            AccountMeta::new(bitmap_extension_address(&program_id, &pool), false),
            AccountMeta::new_readonly(keys.token_program0, false),
            AccountMeta::new_readonly(keys.token_program1, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data: create_pool_data(sqrt_price_x64, open_time),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenPositionArgs {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub tick_array_lower_start: i32,
    pub tick_array_upper_start: i32,
    pub liquidity: u128,
    pub amount_0_max: u64,
    pub amount_1_max: u64,
    pub with_metadata: bool,
    /// `Some(true)` when the position is sized from mint0.
    pub base_flag: Option<bool>,
}

pub fn open_position_v2_data(args: &OpenPositionArgs) -> Vec<u8> {
    let mut data = instruction_discriminator("open_position_v2").to_vec();
    data.extend_from_slice(&args.tick_lower.to_le_bytes());
    data.extend_from_slice(&args.tick_upper.to_le_bytes());
    data.extend_from_slice(&args.tick_array_lower_start.to_le_bytes());
    data.extend_from_slice(&args.tick_array_upper_start.to_le_bytes());
    data.extend_from_slice(&args.liquidity.to_le_bytes());
    data.extend_from_slice(&args.amount_0_max.to_le_bytes());
    data.extend_from_slice(&args.amount_1_max.to_le_bytes());
    data.push(u8::from(args.with_metadata));
    match args.base_flag {
        Some(flag) => data.extend_from_slice(&[1, u8::from(flag)]),
        None => data.push(0),
    }
    data
}

#[derive(Debug, Clone, Copy)]
pub struct OpenPositionKeys {
    pub program_id: Pubkey,
    pub payer: Pubkey,
    pub nft_mint: Pubkey,
    pub pool: Pubkey,
    pub mint0: Pubkey,
    pub mint1: Pubkey,
    pub token_account0: Pubkey,
    pub token_account1: Pubkey,
}

pub fn open_position_v2_instruction(keys: &OpenPositionKeys, args: &OpenPositionArgs) -> Instruction {
    let program_id = keys.program_id;
    let pool = keys.pool;
    let nft_account = spl_associated_token_account::get_associated_token_address_with_program_id(
        &keys.payer,
        &keys.nft_mint,
        &spl_token::ID,
    );
    Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(keys.payer, true),
            AccountMeta::new_readonly(keys.payer, false),
            AccountMeta::new(keys.nft_mint, true),
            AccountMeta::new(nft_account, false),
            AccountMeta::new(metadata_address(&keys.nft_mint), false),
            AccountMeta::new(pool, false),
            AccountMeta::new(
                protocol_position_address(&program_id, &pool, args.tick_lower, args.tick_upper),
                false,
            ),
            AccountMeta::new(
                tick_array_address(&program_id, &pool, args.tick_array_lower_start),
                false,
            ),
            AccountMeta::new(
                tick_array_address(&program_id, &pool, args.tick_array_upper_start),
                false,
            ),
            AccountMeta::new(personal_position_address(&program_id, &keys.nft_mint), false),
            AccountMeta::new(keys.token_account0, false),
            AccountMeta::new(keys.token_account1, false),
            AccountMeta::new(pool_vault_address(&program_id, &pool, &keys.mint0), false),
            AccountMeta::new(pool_vault_address(&program_id, &pool, &keys.mint1), false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(spl_token::ID, false),
            AccountMeta::new_readonly(spl_associated_token_account::ID, false),
            AccountMeta::new_readonly(METADATA_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_2022_PROGRAM_ID, false),
            AccountMeta::new_readonly(keys.mint0, false),
            AccountMeta::new_readonly(keys.mint1, false),
            // remaining account, needed once ticks leave the default bitmap
            AccountMeta::new(bitmap_extension_address(&program_id, &pool), false),
        ],
        data: open_position_v2_data(args),
    }
}

/// The fields of an on-chain CLMM `PoolState` this crate reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStateView {
    pub amm_config: Pubkey,
    pub mint0: Pubkey,
    pub mint1: Pubkey,
    pub vault0: Pubkey,
    pub vault1: Pubkey,
    pub observation: Pubkey,
    pub decimals0: u8,
    pub decimals1: u8,
    pub tick_spacing: u16,
    pub liquidity: u128,
    pub sqrt_price_x64: u128,
    pub tick_current: i32,
}

const POOL_STATE_PREFIX_LEN: usize = 273;

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[offset..offset + 32]);
    Pubkey::new_from_array(bytes)
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> [u8; N] {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[offset..offset + N]);
    bytes
}

pub fn decode_pool_state(data: &[u8]) -> Result<PoolStateView, LayoutError> {
    if data.len() < POOL_STATE_PREFIX_LEN {
        return Err(LayoutError::TooShort {
            expected: POOL_STATE_PREFIX_LEN,
            actual: data.len(),
        });
    }
    if data[..8] != account_discriminator("PoolState") {
        return Err(LayoutError::WrongDiscriminator("PoolState"));
    }
    Ok(PoolStateView {
        amm_config: read_pubkey(data, 9),
        mint0: read_pubkey(data, 73),
        mint1: read_pubkey(data, 105),
        vault0: read_pubkey(data, 137),
        vault1: read_pubkey(data, 169),
        observation: read_pubkey(data, 201),
        decimals0: data[233],
        decimals1: data[234],
        tick_spacing: u16::from_le_bytes(read_array(data, 235)),
        liquidity: u128::from_le_bytes(read_array(data, 237)),
        sqrt_price_x64: u128::from_le_bytes(read_array(data, 253)),
        tick_current: i32::from_le_bytes(read_array(data, 269)),
    })
}

/// Market vault owner and the nonce it was derived with.
pub fn vault_signer(market: &Pubkey, dex_program: &Pubkey) -> Result<(Pubkey, u64), LayoutError> {
    (0..=MAX_VAULT_SIGNER_NONCE)
        .find_map(|nonce| {
            Pubkey::create_program_address(&[market.as_ref(), &nonce.to_le_bytes()], dex_program)
                .ok()
                .map(|signer| (signer, nonce))
        })
        .ok_or(LayoutError::NoVaultSignerNonce(*market))
}

fn scaled_lot(value: f64, decimals: u8) -> Result<u64, LayoutError> {
    let scaled = (value * 10f64.powi(i32::from(decimals))).round();
    if !scaled.is_finite() || scaled < 1.0 || scaled > u64::MAX as f64 {
        return Err(LayoutError::BadLotSize(value));
    }
    Ok(scaled as u64)
}

/// Base and quote lot sizes in raw units for a market with the given human
/// `lot_size` (base per order step) and `tick_size` (quote per base).
pub fn market_lot_sizes(
    lot_size: f64,
    tick_size: f64,
    base_decimals: u8,
    quote_decimals: u8,
) -> Result<(u64, u64), LayoutError> {
    let base_lot = scaled_lot(lot_size, base_decimals)?;
    let quote_lot = scaled_lot(lot_size * tick_size, quote_decimals)?;
    Ok((base_lot, quote_lot))
}

pub fn initialize_market_data(coin_lot_size: u64, pc_lot_size: u64, vault_signer_nonce: u64) -> Vec<u8> {
    let mut data = vec![0u8];
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&coin_lot_size.to_le_bytes());
    data.extend_from_slice(&pc_lot_size.to_le_bytes());
    // fee rate bps, unused by v3
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&vault_signer_nonce.to_le_bytes());
    data.extend_from_slice(&PC_DUST_THRESHOLD.to_le_bytes());
    data
}

#[derive(Debug, Clone, Copy)]
pub struct MarketKeys {
    pub dex_program: Pubkey,
    pub market: Pubkey,
    pub request_queue: Pubkey,
    pub event_queue: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
}

pub fn initialize_market_instruction(
    keys: &MarketKeys,
    coin_lot_size: u64,
    pc_lot_size: u64,
    vault_signer_nonce: u64,
) -> Instruction {
    Instruction {
        program_id: keys.dex_program,
        accounts: vec![
            AccountMeta::new(keys.market, false),
            AccountMeta::new(keys.request_queue, false),
            AccountMeta::new(keys.event_queue, false),
            AccountMeta::new(keys.bids, false),
            AccountMeta::new(keys.asks, false),
            AccountMeta::new(keys.base_vault, false),
            AccountMeta::new(keys.quote_vault, false),
            AccountMeta::new_readonly(keys.base_mint, false),
            AccountMeta::new_readonly(keys.quote_mint, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
        ],
        data: initialize_market_data(coin_lot_size, pc_lot_size, vault_signer_nonce),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLMM: Pubkey = pubkey!("devi51mZmdwUJGU9hjN27vEz64Gps7uUefqxg27EAtH");

    fn pool_state_bytes(view: &PoolStateView) -> Vec<u8> {
        let mut data = vec![0u8; 1544];
        data[..8].copy_from_slice(&account_discriminator("PoolState"));
        data[9..41].copy_from_slice(view.amm_config.as_ref());
        data[73..105].copy_from_slice(view.mint0.as_ref());
        data[105..137].copy_from_slice(view.mint1.as_ref());
        data[137..169].copy_from_slice(view.vault0.as_ref());
        data[169..201].copy_from_slice(view.vault1.as_ref());
        data[201..233].copy_from_slice(view.observation.as_ref());
        data[233] = view.decimals0;
        data[234] = view.decimals1;
        data[235..237].copy_from_slice(&view.tick_spacing.to_le_bytes());
        data[237..253].copy_from_slice(&view.liquidity.to_le_bytes());
        data[253..269].copy_from_slice(&view.sqrt_price_x64.to_le_bytes());
        data[269..273].copy_from_slice(&view.tick_current.to_le_bytes());
        data
    }

    #[test]
    fn should_match_anchor_discriminators() {
        // anchor idl values for the raydium clmm program
        assert_eq!(instruction_discriminator("create_pool"), [233, 146, 209, 142, 207, 104, 64, 188]);
        assert_eq!(account_discriminator("PoolState"), [247, 237, 227, 245, 215, 195, 222, 70]);
    }

    #[test]
    fn should_floor_tick_array_start_index() {
        assert_eq!(tick_array_start_index(0, 10), 0);
        assert_eq!(tick_array_start_index(599, 10), 0);
        assert_eq!(tick_array_start_index(600, 10), 600);
        assert_eq!(tick_array_start_index(-1, 10), -600);
        assert_eq!(tick_array_start_index(-600, 10), -600);
        assert_eq!(tick_array_start_index(-601, 60), -3600);
    }

    #[test]
    fn should_encode_create_pool_data() {
        let data = create_pool_data(1_u128 << 64, 0);
        assert_eq!(data.len(), 8 + 16 + 8);
        assert_eq!(&data[..8], &instruction_discriminator("create_pool"));
        assert_eq!(u128::from_le_bytes(data[8..24].try_into().unwrap()), 1_u128 << 64);
        assert_eq!(&data[24..], &[0u8; 8]);
    }

    #[test]
    fn should_encode_base_flag_as_borsh_option() {
        let args = OpenPositionArgs {
            tick_lower: -120,
            tick_upper: 120,
            tick_array_lower_start: -600,
            tick_array_upper_start: 0,
            liquidity: 0,
            amount_0_max: 1_000,
            amount_1_max: 2_000,
            with_metadata: true,
            base_flag: Some(false),
        };
        let data = open_position_v2_data(&args);
        assert_eq!(data.len(), 8 + 4 * 4 + 16 + 8 + 8 + 1 + 2);
        assert_eq!(i32::from_le_bytes(data[8..12].try_into().unwrap()), -120);
        assert_eq!(u64::from_le_bytes(data[40..48].try_into().unwrap()), 1_000);
        assert_eq!(u64::from_le_bytes(data[48..56].try_into().unwrap()), 2_000);
        assert_eq!(&data[56..], &[1, 1, 0]);

        let without_flag = open_position_v2_data(&OpenPositionArgs {
            base_flag: None,
            ..args
        });
        assert_eq!(&without_flag[56..], &[1, 0]);
    }

    #[test]
    fn should_order_create_pool_accounts() {
        let keys = CreatePoolKeys {
            program_id: CLMM,
            creator: Pubkey::new_unique(),
            amm_config: Pubkey::new_unique(),
            mint0: Pubkey::new_unique(),
            mint1: Pubkey::new_unique(),
            token_program0: spl_token::ID,
            token_program1: TOKEN_2022_PROGRAM_ID,
        };
        let ix = create_pool_instruction(&keys, 1_u128 << 64, 0);
        let pool = keys.pool();

        assert_eq!(ix.accounts.len(), 13);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert_eq!(ix.accounts[2].pubkey, pool);
        assert_eq!(ix.accounts[5].pubkey, pool_vault_address(&CLMM, &pool, &keys.mint0));
        assert_eq!(ix.accounts[8].pubkey, bitmap_extension_address(&CLMM, &pool));
        assert_eq!(ix.accounts[10].pubkey, TOKEN_2022_PROGRAM_ID);
        assert_eq!(ix.accounts[12].pubkey, sysvar::rent::ID);
    }

    #[test]
    fn should_derive_position_accounts_from_ticks() {
        let keys = OpenPositionKeys {
            program_id: CLMM,
            payer: Pubkey::new_unique(),
            nft_mint: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            mint0: Pubkey::new_unique(),
            mint1: Pubkey::new_unique(),
            token_account0: Pubkey::new_unique(),
            token_account1: Pubkey::new_unique(),
        };
        let args = OpenPositionArgs {
            tick_lower: -610,
            tick_upper: 20,
            tick_array_lower_start: tick_array_start_index(-610, 10),
            tick_array_upper_start: tick_array_start_index(20, 10),
            liquidity: 0,
            amount_0_max: 1,
            amount_1_max: 1,
            with_metadata: true,
            base_flag: Some(true),
        };
        let ix = open_position_v2_instruction(&keys, &args);

        assert_eq!(ix.accounts.len(), 23);
        assert!(ix.accounts[2].is_signer);
        assert_eq!(
            ix.accounts[6].pubkey,
            protocol_position_address(&CLMM, &keys.pool, -610, 20)
        );
        assert_eq!(ix.accounts[7].pubkey, tick_array_address(&CLMM, &keys.pool, -1200));
        assert_eq!(ix.accounts[8].pubkey, tick_array_address(&CLMM, &keys.pool, 0));
        assert_eq!(
            ix.accounts[9].pubkey,
            personal_position_address(&CLMM, &keys.nft_mint)
        );
    }

    #[test]
    fn should_decode_pool_state_fields() {
        let view = PoolStateView {
            amm_config: Pubkey::new_unique(),
            mint0: Pubkey::new_unique(),
            mint1: Pubkey::new_unique(),
            vault0: Pubkey::new_unique(),
            vault1: Pubkey::new_unique(),
            observation: Pubkey::new_unique(),
            decimals0: 9,
            decimals1: 6,
            tick_spacing: 10,
            liquidity: 42,
            sqrt_price_x64: 1_u128 << 64,
            tick_current: -17,
        };
        let data = pool_state_bytes(&view);
        assert_eq!(decode_pool_state(&data), Ok(view));
    }

    #[test]
    fn should_reject_foreign_pool_accounts() {
        assert_eq!(
            decode_pool_state(&[0u8; 100]),
            Err(LayoutError::TooShort {
                expected: 273,
                actual: 100
            })
        );
        assert_eq!(
            decode_pool_state(&[0u8; 1544]),
            Err(LayoutError::WrongDiscriminator("PoolState"))
        );
    }

    #[test]
    fn should_find_a_valid_vault_signer() {
        let dex = pubkey!("EoTcMgcDRTJVZDMZWBoU6rhYHZfkNTVEAfz3uUJRcYGj");
        let market = Pubkey::new_unique();
        let (signer, nonce) = vault_signer(&market, &dex).unwrap();
        assert_eq!(
            Pubkey::create_program_address(&[market.as_ref(), &nonce.to_le_bytes()], &dex),
            Ok(signer)
        );
    }

    #[test]
    fn should_scale_lot_sizes_by_decimals() {
        assert_eq!(market_lot_sizes(1.0, 0.01, 9, 6), Ok((1_000_000_000, 10_000)));
        assert_eq!(market_lot_sizes(0.1, 0.001, 6, 6), Ok((100_000, 100)));
        assert_eq!(
            market_lot_sizes(1.0, 0.000_000_1, 9, 6),
            Err(LayoutError::BadLotSize(1.0 * 0.000_000_1))
        );
    }

    #[test]
    fn should_lay_out_initialize_market_data() {
        let data = initialize_market_data(1_000, 10, 3);
        assert_eq!(data.len(), 39);
        assert_eq!(&data[..5], &[0, 0, 0, 0, 0]);
        assert_eq!(u64::from_le_bytes(data[5..13].try_into().unwrap()), 1_000);
        assert_eq!(u64::from_le_bytes(data[13..21].try_into().unwrap()), 10);
        assert_eq!(&data[21..23], &[0, 0]);
        assert_eq!(u64::from_le_bytes(data[23..31].try_into().unwrap()), 3);
        assert_eq!(u64::from_le_bytes(data[31..39].try_into().unwrap()), 100);
    }
}
