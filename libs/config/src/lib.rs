//! # Pool Engine Configuration
//!
//! This crate provides centralized configuration management and constants
//! for the pool engine and its CLI.
//!
//! ## Features
//!
//! - **Protocol Constants**: fee denominator, LP decimals, rounding dust bound
//! - **Engine Configuration**: defaults, TOML file, `AMM_*` environment overrides
//!
//! ## Usage
//!
//! ```rust
//! use pool_config::{protocol, EngineConfig};
//!
//! let config = EngineConfig::default();
//! assert!(config.pools.default_fee_bps <= protocol::MAX_FEE_BPS);
//! assert_eq!(protocol::LP_DECIMALS, 6);
//! ```

pub mod engine_config;
pub mod protocol;

// Re-export commonly used types
pub use engine_config::{load_config, EngineConfig, FeatureFlags, GlobalConfig, PoolDefaults};
pub use protocol::*;
