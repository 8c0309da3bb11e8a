use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use ic_canister_log::log;
use serde::Serialize;

use liquidity_kit::{
    config::{
        load_plan, resolve_rpc_url, Chain, ClmmPoolPlan, EthPoolPlan, MarketPlan, Mnemonic,
        Network, ALCHEMY_API_KEY_ENV, ETH_RPC_URL_ENV, MNEMONIC_ENV, SOL_PRIVATE_KEY_ENV,
        SOL_RPC_URL_ENV,
    },
    ethereum::{list_positions, provide_liquidity, AlloyUniswapV3, ProvisionMode},
    libraries::{
        constants::{DEFAULT_SPREAD, DEFAULT_TICK_SPACING},
        price::Price,
    },
    logs::{self, INFO},
    outcome::{RunOutput, TxReport},
    solana::{
        create_clmm_pool, create_lookup_table, create_market, create_pool_and_open_position,
        load_keypair, preview_clmm_plan, RpcClmmClient,
    },
    tick_range::{get_tick_range, PoolFee, SnapMode, TickRangeRequest},
    token_pair::AnyTokenPair,
};

#[derive(Parser)]
#[command(name = "liquidity_kit", version, about = "Concentrated-liquidity pool and position tooling")]
struct Cli {
    /// Write the run log as JSON to this file when done.
    #[arg(long, global = true)]
    log_json: Option<PathBuf>,

    /// Write the JSON results (one document per line) to this file instead
    /// of stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tick ranges from a price spread or explicit bounds.
    #[command(subcommand)]
    TickRange(TickRangeCommand),
    /// Canonical (token0, token1) order of two addresses or mints.
    TokenOrder { token_a: String, token_b: String },
    /// Uniswap V3 pools and positions.
    #[command(subcommand)]
    Eth(EthCommand),
    /// Raydium-style CLMM pools and positions, OpenBook markets.
    #[command(subcommand)]
    Solana(SolanaCommand),
}

#[derive(Subcommand)]
enum TickRangeCommand {
    Spread {
        #[arg(long)]
        price: f64,
        #[arg(long, default_value_t = DEFAULT_SPREAD)]
        spread: f64,
        #[arg(long, default_value_t = DEFAULT_TICK_SPACING)]
        tick_spacing: i32,
        /// Floor the lower and ceil the upper tick instead of rounding both.
        #[arg(long)]
        outward: bool,
    },
    Bounds {
        #[arg(long)]
        lower: Price,
        #[arg(long)]
        upper: Price,
        #[arg(long, default_value_t = PoolFee::MEDIUM.0)]
        fee: u32,
    },
}

#[derive(Args)]
struct EthConnection {
    #[arg(long, env = MNEMONIC_ENV, hide_env_values = true)]
    mnemonic: String,
    #[arg(long, env = ALCHEMY_API_KEY_ENV, hide_env_values = true)]
    alchemy_api_key: Option<String>,
    #[arg(long, env = ETH_RPC_URL_ENV)]
    rpc_url: Option<String>,
}

impl EthConnection {
    fn client(&self, network: Network) -> anyhow::Result<AlloyUniswapV3> {
        let rpc_url = resolve_rpc_url(
            network,
            self.rpc_url.as_deref(),
            self.alchemy_api_key.as_deref(),
        )?;
        let deployment = network.uniswap_v3()?;
        let client =
            AlloyUniswapV3::connect(&rpc_url, &Mnemonic::new(self.mnemonic.clone()), deployment)?;
        Ok(client)
    }
}

#[derive(Subcommand)]
enum EthCommand {
    /// Create and initialize the pool if needed, then mint a position.
    CreatePool {
        #[arg(long)]
        plan: PathBuf,
        #[command(flatten)]
        connection: EthConnection,
    },
    /// Mint a position in an existing, initialized pool.
    AddLiquidity {
        #[arg(long)]
        plan: PathBuf,
        #[command(flatten)]
        connection: EthConnection,
    },
    /// List the signer's position NFTs.
    Positions {
        #[arg(long, default_value = "sepolia")]
        network: Network,
        #[command(flatten)]
        connection: EthConnection,
    },
}

#[derive(Args)]
struct SolConnection {
    /// Base58 secret key; takes precedence over the mnemonic.
    #[arg(long, env = SOL_PRIVATE_KEY_ENV, hide_env_values = true)]
    private_key: Option<String>,
    #[arg(long, env = MNEMONIC_ENV, hide_env_values = true)]
    mnemonic: Option<String>,
    #[arg(long, env = SOL_RPC_URL_ENV)]
    rpc_url: Option<String>,
}

impl SolConnection {
    fn client(&self, network: Network) -> anyhow::Result<RpcClmmClient> {
        network.expect_chain(Chain::Solana)?;
        let rpc_url = resolve_rpc_url(network, self.rpc_url.as_deref(), None)?;
        let mnemonic = self.mnemonic.clone().map(Mnemonic::new);
        let payer = load_keypair(self.private_key.as_deref(), mnemonic.as_ref())?;
        Ok(RpcClmmClient::connect(&rpc_url, payer))
    }
}

#[derive(Subcommand)]
enum SolanaCommand {
    /// Resolve a CLMM plan offline and print it as JSON.
    Plan {
        #[arg(long)]
        plan: PathBuf,
    },
    /// Create the plan's CLMM pool unless it exists.
    CreatePool {
        #[arg(long)]
        plan: PathBuf,
        #[command(flatten)]
        connection: SolConnection,
    },
    /// Create the pool if needed, then open the plan's position.
    OpenPosition {
        #[arg(long)]
        plan: PathBuf,
        #[command(flatten)]
        connection: SolConnection,
    },
    /// List an OpenBook market for a base/quote pair.
    CreateMarket {
        #[arg(long)]
        plan: PathBuf,
        #[command(flatten)]
        connection: SolConnection,
    },
    /// Create an address lookup table owned by the wallet.
    LookupTable {
        #[arg(long, default_value = "solana-devnet")]
        network: Network,
        #[command(flatten)]
        connection: SolConnection,
    },
}

fn emit(output: &RunOutput, path: Option<&Path>) -> anyhow::Result<()> {
    let text = output.to_lines().context("failed to encode the results")?;
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write the results to {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

/// Records the report and outcome of a procedure, failing the run if it did.
fn finish<T, E>(output: &mut RunOutput, result: Result<T, E>) -> anyhow::Result<()>
where
    T: TxReport + Serialize,
    E: fmt::Display,
{
    let outcome = output.record(result)?;
    if let Some(error) = outcome.error {
        bail!(error);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut output = RunOutput::default();
    let result = run(cli.command, &mut output).await;
    emit(&output, cli.out.as_deref())?;

    if let Some(path) = &cli.log_json {
        let json = logs::records_to_json().context("failed to encode the run log")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write the run log to {}", path.display()))?;
    }
    result
}

async fn run(command: Command, output: &mut RunOutput) -> anyhow::Result<()> {
    match command {
        Command::TickRange(command) => tick_range(command),
        Command::TokenOrder { token_a, token_b } => {
            let (token0, token1, flipped) = AnyTokenPair::parse(&token_a, &token_b)?.to_strings();
            println!("token0: {token0}");
            println!("token1: {token1}");
            println!("flipped: {flipped}");
            Ok(())
        }
        Command::Eth(command) => eth(command, output).await,
        Command::Solana(command) => solana(command, output).await,
    }
}

fn tick_range(command: TickRangeCommand) -> anyhow::Result<()> {
    let range = match command {
        TickRangeCommand::Spread {
            price,
            spread,
            tick_spacing,
            outward,
        } => {
            let snap = if outward {
                SnapMode::Outward
            } else {
                SnapMode::Nearest
            };
            TickRangeRequest::new(price)
                .with_spread(spread)
                .with_tick_spacing(tick_spacing)
                .with_snap(snap)
                .resolve()?
        }
        TickRangeCommand::Bounds { lower, upper, fee } => {
            get_tick_range(&lower, &upper, PoolFee(fee))?
        }
    };
    println!("tickLower: {}", range.tick_lower);
    println!("tickUpper: {}", range.tick_upper);
    Ok(())
}

async fn eth(command: EthCommand, output: &mut RunOutput) -> anyhow::Result<()> {
    match command {
        EthCommand::CreatePool { plan, connection } => {
            provision(&plan, &connection, ProvisionMode::CreateIfMissing, output).await
        }
        EthCommand::AddLiquidity { plan, connection } => {
            provision(&plan, &connection, ProvisionMode::ExistingOnly, output).await
        }
        EthCommand::Positions {
            network,
            connection,
        } => {
            let api = connection.client(network)?;
            let positions = list_positions(&api).await?;
            Ok(output.push(&positions)?)
        }
    }
}

async fn provision(
    path: &Path,
    connection: &EthConnection,
    mode: ProvisionMode,
    output: &mut RunOutput,
) -> anyhow::Result<()> {
    let plan: EthPoolPlan = load_plan(path)?;
    log!(INFO, "[provision]: {} on {} ({mode:?})", path.display(), plan.network);
    let api = connection.client(plan.network)?;

    finish(output, provide_liquidity(&api, &plan, mode).await)
}

async fn solana(command: SolanaCommand, output: &mut RunOutput) -> anyhow::Result<()> {
    match command {
        SolanaCommand::Plan { plan } => {
            let plan: ClmmPoolPlan = load_plan(&plan)?;
            Ok(output.push(&preview_clmm_plan(&plan)?)?)
        }
        SolanaCommand::CreatePool { plan, connection } => {
            let plan: ClmmPoolPlan = load_plan(&plan)?;
            let sdk = connection.client(plan.network)?;
            finish(output, create_clmm_pool(&sdk, &plan).await)
        }
        SolanaCommand::OpenPosition { plan, connection } => {
            let plan: ClmmPoolPlan = load_plan(&plan)?;
            let sdk = connection.client(plan.network)?;
            finish(output, create_pool_and_open_position(&sdk, &plan).await)
        }
        SolanaCommand::CreateMarket { plan, connection } => {
            let plan: MarketPlan = load_plan(&plan)?;
            let sdk = connection.client(plan.network)?;
            finish(output, create_market(&sdk, &plan).await)
        }
        SolanaCommand::LookupTable {
            network,
            connection,
        } => {
            let sdk = connection.client(network)?;
            finish(output, create_lookup_table(&sdk).await)
        }
    }
}
