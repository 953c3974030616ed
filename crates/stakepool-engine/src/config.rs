//! Pool configuration.
//!
//! [`PoolConfig`] is layered from (lowest to highest precedence): built-in
//! defaults, an optional TOML file, and `STAKEPOOL_*` environment variables.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use stakepool_core::constants::{DEFAULT_PREMINT, DEFAULT_REWARD_RATE, ENV_PREFIX};
use stakepool_core::types::Amount;

use crate::error::ConfigError;

/// Configuration for one pool deployment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PoolConfig {
    /// Reward units accrued per second by the whole pool.
    pub reward_rate: u64,
    /// Stake-asset supply credited to the deployer at deployment.
    pub premint: u64,
    /// Log level filter string (e.g. "info", "stakepool_engine=debug").
    pub log_level: String,
    /// `text` or `json`.
    pub log_format: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            reward_rate: DEFAULT_REWARD_RATE as u64,
            premint: DEFAULT_PREMINT as u64,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl PoolConfig {
    /// `<config_dir>/stakepool/pool.toml`, falling back to the working
    /// directory when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stakepool")
            .join("pool.toml")
    }

    /// Load from `path` (or [`default_path`](Self::default_path)) and the
    /// environment, then validate. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        let cfg: Self = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reward_rate == 0 {
            return Err(ConfigError::ZeroRewardRate);
        }
        if self.premint == 0 {
            return Err(ConfigError::ZeroPremint);
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(ConfigError::UnknownLogFormat(self.log_format.clone()));
        }
        Ok(())
    }

    pub fn reward_rate(&self) -> Amount {
        Amount::from(self.reward_rate)
    }

    pub fn premint(&self) -> Amount {
        Amount::from(self.premint)
    }
}
