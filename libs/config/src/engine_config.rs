//! Engine Configuration Module
//!
//! Provides configuration loading for the pool engine.
//! Supports an optional TOML file layered over built-in defaults, with
//! `AMM_`-prefixed environment overrides on top.

use crate::protocol::{DEFAULT_FEE_BPS, ENV_PREFIX, LP_DECIMALS, MAX_FEE_BPS};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main engine configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Global settings
    pub global: GlobalConfig,

    /// Defaults applied to new pools
    pub pools: PoolDefaults,

    /// Feature flags
    pub features: FeatureFlags,
}

/// Global configuration settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
    /// Where the CLI persists pools and balances between runs
    pub state_file: Option<PathBuf>,
}

/// Pool creation defaults
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PoolDefaults {
    pub default_fee_bps: u16,
    pub lp_decimals: u8,
}

/// Feature flags
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FeatureFlags {
    /// Re-check reserve and `k` invariants before every commit
    pub verify_invariants: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            state_file: None,
        }
    }
}

impl Default for PoolDefaults {
    fn default() -> Self {
        Self {
            default_fee_bps: DEFAULT_FEE_BPS,
            lp_decimals: LP_DECIMALS,
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            verify_invariants: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional file with environment overrides
    ///
    /// Precedence, lowest first: built-in defaults, the file, `AMM_*`
    /// variables (`AMM_POOLS__DEFAULT_FEE_BPS=25`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to encode default configuration")?;
        let mut builder = Config::builder().add_source(defaults);

        if let Some(path) = path {
            info!("Loading engine config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!("Effective engine config: {:?}", config);
        Ok(config)
    }

    /// Reject values the engine would refuse at pool creation
    pub fn validate(&self) -> Result<()> {
        if self.pools.default_fee_bps > MAX_FEE_BPS {
            bail!(
                "default_fee_bps {} exceeds {}",
                self.pools.default_fee_bps,
                MAX_FEE_BPS
            );
        }
        if self.pools.lp_decimals > 18 {
            bail!("lp_decimals {} exceeds 18", self.pools.lp_decimals);
        }
        Ok(())
    }

    /// Expand environment variables in path values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        if let Some(state_file) = &self.global.state_file {
            let raw = state_file.to_string_lossy();
            let expanded =
                shellexpand::full(raw.as_ref()).context("Failed to expand state file path")?;
            self.global.state_file = Some(PathBuf::from(expanded.as_ref()));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }
}

/// Convenience function to load configuration and expand paths
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(path)?;
    config.expand_env_vars()?;
    Ok(config)
}
