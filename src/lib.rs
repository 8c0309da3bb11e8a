pub mod config;
pub mod ethereum;
pub mod libraries;
pub mod logs;
pub mod outcome;
pub mod solana;
pub mod tick_range;
pub mod token_pair;
