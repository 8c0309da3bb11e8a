use std::{fmt, str::FromStr};

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::solana::{AmmConfig, SolanaAddress};
use crate::tick_range::PoolTickSpacing;

pub mod plans;

pub use plans::{load_plan, ClmmPoolPlan, EthPoolPlan, MarketPlan, Plan, PlanBase, PositionPlan};

pub const MNEMONIC_ENV: &str = "MNEMONIC";
pub const ALCHEMY_API_KEY_ENV: &str = "ALCHEMY_API_KEY";
pub const ETH_RPC_URL_ENV: &str = "ETH_RPC_URL";
pub const SOL_RPC_URL_ENV: &str = "SOL_RPC_URL";
pub const SOL_PRIVATE_KEY_ENV: &str = "SOL_PRIVATE_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown network `{0}`")]
    UnknownNetwork(String),
    #[error("{network} is a {actual} network, expected {expected}")]
    WrongChain {
        network: Network,
        expected: Chain,
        actual: Chain,
    },
    #[error("no well-known {what} deployment on {network}")]
    NoDeployment { what: &'static str, network: Network },
    #[error("no RPC endpoint for {0}: set {1} or {2}")]
    MissingRpcUrl(Network, &'static str, &'static str),
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("failed to read plan {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse plan {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Ethereum,
    Solana,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Ethereum => f.write_str("ethereum"),
            Chain::Solana => f.write_str("solana"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    EthereumMainnet,
    Sepolia,
    SolanaMainnet,
    SolanaDevnet,
    SolanaTestnet,
}

impl Network {
    pub fn chain(&self) -> Chain {
        match self {
            Network::EthereumMainnet | Network::Sepolia => Chain::Ethereum,
            Network::SolanaMainnet | Network::SolanaDevnet | Network::SolanaTestnet => {
                Chain::Solana
            }
        }
    }

    pub fn expect_chain(&self, expected: Chain) -> Result<(), ConfigError> {
        if self.chain() != expected {
            return Err(ConfigError::WrongChain {
                network: *self,
                expected,
                actual: self.chain(),
            });
        }
        Ok(())
    }

    fn as_str(&self) -> &'static str {
        match self {
            Network::EthereumMainnet => "ethereum-mainnet",
            Network::Sepolia => "sepolia",
            Network::SolanaMainnet => "solana-mainnet",
            Network::SolanaDevnet => "solana-devnet",
            Network::SolanaTestnet => "solana-testnet",
        }
    }

    fn alchemy_url(&self, api_key: &str) -> Option<String> {
        match self {
            Network::EthereumMainnet => Some(format!("https://eth-mainnet.g.alchemy.com/v2/{api_key}")),
            Network::Sepolia => Some(format!("https://eth-sepolia.g.alchemy.com/v2/{api_key}")),
            _ => None,
        }
    }

    fn public_cluster_url(&self) -> Option<&'static str> {
        match self {
            Network::SolanaMainnet => Some("https://api.mainnet-beta.solana.com"),
            Network::SolanaDevnet => Some("https://api.devnet.solana.com"),
            Network::SolanaTestnet => Some("https://api.testnet.solana.com"),
            _ => None,
        }
    }

    /// Uniswap V3 factory and NonfungiblePositionManager of this network.
    pub fn uniswap_v3(&self) -> Result<UniswapV3Deployment, ConfigError> {
        match self {
            Network::EthereumMainnet => Ok(UniswapV3Deployment {
                factory: address!("1F98431c8aD98523631AE4a59f267346ea31F984"),
                position_manager: address!("C36442b4a4522E871399CD717aBDD847Ab11FE88"),
            }),
            Network::Sepolia => Ok(UniswapV3Deployment {
                factory: address!("0227628f3F023bb0B980b67D528571c95c6DaC1c"),
                position_manager: address!("1238536071E1c677A632429e3655c799b22cDA52"),
            }),
            _ => Err(ConfigError::NoDeployment {
                what: "Uniswap V3",
                network: *self,
            }),
        }
    }

    pub fn clmm_program_id(&self) -> Result<SolanaAddress, ConfigError> {
        let id = match self {
            Network::SolanaMainnet => "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK",
            Network::SolanaDevnet => "devi51mZmdwUJGU9hjN27vEz64Gps7uUefqxg27EAtH",
            _ => {
                return Err(ConfigError::NoDeployment {
                    what: "CLMM program",
                    network: *self,
                });
            }
        };
        parse_known_address(id)
    }

    pub fn openbook_program_id(&self) -> Result<SolanaAddress, ConfigError> {
        let id = match self {
            Network::SolanaMainnet => "srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX",
            Network::SolanaDevnet => "EoTcMgcDRTJVZDMZWBoU6rhYHZfkNTVEAfz3uUJRcYGj",
            _ => {
                return Err(ConfigError::NoDeployment {
                    what: "OpenBook program",
                    network: *self,
                });
            }
        };
        parse_known_address(id)
    }

    /// AMM config used when a plan does not name one.
    pub fn default_amm_config(&self) -> Result<AmmConfig, ConfigError> {
        match self {
            Network::SolanaDevnet => Ok(AmmConfig {
                id: parse_known_address("F8aaMZVpXaQHk3Qo9BPDhsa7RgpfrfiRsk8L3iXnq3AT")?,
                index: 0,
                protocol_fee_rate: 120000,
                trade_fee_rate: 100,
                tick_spacing: PoolTickSpacing(10),
                fund_fee_rate: 40000,
                description: String::new(),
            }),
            _ => Err(ConfigError::NoDeployment {
                what: "default AMM config",
                network: *self,
            }),
        }
    }
}

fn parse_known_address(id: &str) -> Result<SolanaAddress, ConfigError> {
    id.parse()
        .map_err(|e| ConfigError::InvalidPlan(format!("bad built-in address {id}: {e}")))
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        [
            Network::EthereumMainnet,
            Network::Sepolia,
            Network::SolanaMainnet,
            Network::SolanaDevnet,
            Network::SolanaTestnet,
        ]
        .into_iter()
        .find(|network| network.as_str() == text)
        .ok_or_else(|| ConfigError::UnknownNetwork(text.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniswapV3Deployment {
    pub factory: Address,
    pub position_manager: Address,
}

/// Picks the RPC endpoint for `network`: an explicit URL wins, then the
/// provider URL built from an API key (Ethereum), then the public cluster (Solana).
pub fn resolve_rpc_url(
    network: Network,
    explicit: Option<&str>,
    alchemy_api_key: Option<&str>,
) -> Result<String, ConfigError> {
    if let Some(url) = explicit.filter(|url| !url.trim().is_empty()) {
        return Ok(url.to_string());
    }
    match network.chain() {
        Chain::Ethereum => alchemy_api_key
            .filter(|key| !key.trim().is_empty())
            .and_then(|key| network.alchemy_url(key))
            .ok_or(ConfigError::MissingRpcUrl(
                network,
                ETH_RPC_URL_ENV,
                ALCHEMY_API_KEY_ENV,
            )),
        Chain::Solana => network
            .public_cluster_url()
            .map(str::to_string)
            .ok_or(ConfigError::MissingRpcUrl(network, SOL_RPC_URL_ENV, SOL_RPC_URL_ENV)),
    }
}

/// Wallet seed phrase. Only ever read from the environment and never printed.
#[derive(Clone)]
pub struct Mnemonic(String);

impl Mnemonic {
    pub fn new(phrase: impl Into<String>) -> Self {
        Self(phrase.into())
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        std::env::var(MNEMONIC_ENV)
            .ok()
            .filter(|phrase| !phrase.trim().is_empty())
            .map(Self)
            .ok_or(ConfigError::MissingEnv(MNEMONIC_ENV))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mnemonic(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_and_print_network_names() {
        for name in [
            "ethereum-mainnet",
            "sepolia",
            "solana-mainnet",
            "solana-devnet",
            "solana-testnet",
        ] {
            let network: Network = name.parse().unwrap();
            assert_eq!(network.to_string(), name);
            assert_eq!(
                serde_json::to_string(&network).unwrap(),
                format!("\"{name}\"")
            );
        }
        assert!(matches!(
            "goerli".parse::<Network>(),
            Err(ConfigError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn should_prefer_explicit_rpc_url() {
        let url = resolve_rpc_url(Network::Sepolia, Some("http://localhost:8545"), Some("key"))
            .unwrap();
        assert_eq!(url, "http://localhost:8545");
    }

    #[test]
    fn should_build_provider_url_from_api_key() {
        let url = resolve_rpc_url(Network::Sepolia, None, Some("abc")).unwrap();
        assert_eq!(url, "https://eth-sepolia.g.alchemy.com/v2/abc");
        assert!(matches!(
            resolve_rpc_url(Network::EthereumMainnet, Some(" "), None),
            Err(ConfigError::MissingRpcUrl(Network::EthereumMainnet, _, _))
        ));
    }

    #[test]
    fn should_fall_back_to_public_solana_cluster() {
        assert_eq!(
            resolve_rpc_url(Network::SolanaDevnet, None, None).unwrap(),
            "https://api.devnet.solana.com"
        );
    }

    #[test]
    fn should_know_deployments_per_network() {
        let sepolia = Network::Sepolia.uniswap_v3().unwrap();
        assert_eq!(
            sepolia.position_manager,
            address!("1238536071E1c677A632429e3655c799b22cDA52")
        );
        assert!(Network::SolanaDevnet.uniswap_v3().is_err());
        assert!(Network::SolanaTestnet.clmm_program_id().is_err());
        assert_eq!(
            Network::SolanaDevnet.default_amm_config().unwrap().tick_spacing,
            PoolTickSpacing(10)
        );
        assert!(Network::Sepolia.expect_chain(Chain::Solana).is_err());
    }

    #[test]
    fn should_redact_mnemonic() {
        let mnemonic = Mnemonic::new("test test test test test test test test test test test junk");
        assert_eq!(format!("{mnemonic:?}"), "Mnemonic(<redacted>)");
    }
}
