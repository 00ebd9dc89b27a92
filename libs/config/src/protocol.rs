//! Pool protocol constants
//!
//! Values every pool shares. Fee limits come from the math layer so the
//! engine and configuration validation agree on them.

pub use amm::{BPS_DENOMINATOR, MAX_FEE_BPS};

/// Decimals of every LP share mint
pub const LP_DECIMALS: u8 = 6;

/// Largest per-asset residue accepted after the last share is burned
pub const MAX_ROUNDING_DUST: u64 = 1;

/// Default swap fee for new pools (0.3%)
pub const DEFAULT_FEE_BPS: u16 = 30;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "AMM";
