use std::fmt;

use alloy::primitives::Address;
use serde::Serialize;

use crate::solana::SolanaAddress;


#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenPairError {
    #[error("a pool needs two different tokens, got {0} twice")]
    IdenticalTokens(String),
    #[error("`{0}` is neither an EVM address nor a Solana key")]
    InvalidAddress(String),
    #[error("cannot pair EVM address {0} with Solana key {1}")]
    MixedChains(String, String),
}

/// A pair parsed from user text: `0x`-prefixed EVM addresses or base58 Solana keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyTokenPair {
    Evm(TokenPair<Address>),
    Solana(TokenPair<SolanaAddress>),
}

impl AnyTokenPair {
    pub fn parse(token_a: &str, token_b: &str) -> Result<Self, TokenPairError> {
        let is_evm = |text: &str| text.starts_with("0x") || text.starts_with("0X");
        match (is_evm(token_a), is_evm(token_b)) {
            (true, true) => {
                let parse = |text: &str| {
                    text.parse::<Address>()
                        .map_err(|_e| TokenPairError::InvalidAddress(text.to_string()))
                };
                Ok(Self::Evm(TokenPair::new(parse(token_a)?, parse(token_b)?)?))
            }
            (false, false) => {
                let parse = |text: &str| {
                    text.parse::<SolanaAddress>()
                        .map_err(|_e| TokenPairError::InvalidAddress(text.to_string()))
                };
                Ok(Self::Solana(TokenPair::new(parse(token_a)?, parse(token_b)?)?))
            }
            (true, false) => Err(TokenPairError::MixedChains(
                token_a.to_string(),
                token_b.to_string(),
            )),
            (false, true) => Err(TokenPairError::MixedChains(
                token_b.to_string(),
                token_a.to_string(),
            )),
        }
    }

    /// `(token0, token1, flipped)` as display text.
    pub fn to_strings(&self) -> (String, String, bool) {
        match self {
            Self::Evm(pair) => (
                pair.token0.to_string(),
                pair.token1.to_string(),
                pair.is_flipped(),
            ),
            Self::Solana(pair) => (
                pair.token0.to_string(),
                pair.token1.to_string(),
                pair.is_flipped(),
            ),
        }
    }
}

/// Two tokens in the order an AMM keys its pools by: `token0 < token1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair<T> {
    pub token0: T,
    pub token1: T,
    #[serde(skip)]
    flipped: bool,
}

impl<T: Ord + fmt::Display> TokenPair<T> {
    // sort token_a and b, token 0 is always the smaller token
    pub fn new(token_a: T, token_b: T) -> Result<Self, TokenPairError> {
        if token_a == token_b {
            return Err(TokenPairError::IdenticalTokens(token_a.to_string()));
        }
        Ok(if token_a < token_b {
            TokenPair {
                token0: token_a,
                token1: token_b,
                flipped: false,
            }
        } else {
            TokenPair {
                token0: token_b,
                token1: token_a,
                flipped: true,
            }
        })
    }
}

impl<T> TokenPair<T> {
    /// True when the caller's `(a, b)` order was reversed to become `(token0, token1)`.
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Puts values given in the caller's `(a, b)` order into `(token0, token1)` order.
    pub fn order_amounts<A>(&self, amount_a: A, amount_b: A) -> (A, A) {
        if self.flipped {
            (amount_b, amount_a)
        } else {
            (amount_a, amount_b)
        }
    }
}
